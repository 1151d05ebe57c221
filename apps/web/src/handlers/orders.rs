//! # Order Handlers
//!
//! Form and JSON entry points into the [`OrderProcessor`](stockroom_db::OrderProcessor),
//! plus order history.
//!
//! ## Form Wire Format
//! ```text
//! id1=10&quantity1=2&id2=11&quantity2=1&id3=&quantity3=
//!   │
//!   ▼  line_items_from_numbered_fields (stops at the first blank/zero quantity)
//! [LineItem(10, 2), LineItem(11, 1)]
//!   │
//!   ▼  OrderProcessor::place_order(role, &lines)
//! completed ──► 303 /home
//! rejected ───► orders page with "You cannot order this product"
//! ```

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use stockroom_core::validation::{line_items_from_numbered_fields, parse_order_id};
use stockroom_core::{order_total, LineItem, Money, OrderId, OrderLineDetail};
use stockroom_db::OrderOutcome;

use super::{rerender, IdForm, PageResult};
use crate::auth::{AdminUser, ApiAdmin, ApiUser, CurrentUser};
use crate::error::ApiError;
use crate::pages;
use crate::AppState;

fn log_outcome(username: &str, outcome: &OrderOutcome) {
    info!(
        username = %username,
        order_id = %outcome.order_id,
        completed = outcome.is_completed(),
        committed = outcome.committed.len(),
        low_stock = ?outcome.low_stock,
        "Order submitted"
    );
}

// =============================================================================
// Place order (form)
// =============================================================================

pub async fn orders_form(AdminUser(user): AdminUser) -> impl IntoResponse {
    pages::orders_page(&user, "")
}

pub async fn place(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> PageResult {
    let render = |message: &str| pages::orders_page(&user, message);

    let items = match line_items_from_numbered_fields(&fields) {
        Ok(items) => items,
        Err(e) => return rerender(e, render),
    };

    let outcome = match state.db.order_processor().place_order(user.role, &items).await {
        Ok(outcome) => outcome,
        Err(e) => return rerender(e, render),
    };
    log_outcome(&user.username, &outcome);

    match outcome.rejection_message() {
        Some(message) => Ok(render(message)?.into_response()),
        None => Ok(Redirect::to("/home").into_response()),
    }
}

// =============================================================================
// Show order (form)
// =============================================================================

pub async fn show_form(user: CurrentUser) -> impl IntoResponse {
    pages::show_page(&user, None, "")
}

pub async fn show(
    user: CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> PageResult {
    let order_id = match parse_order_id("id", &form.id) {
        Ok(id) => id,
        Err(e) => return rerender(e, |message| pages::show_page(&user, None, message)),
    };

    let lines = state.db.orders().lines_for_order(order_id).await?;
    Ok(pages::show_page(&user, Some((order_id, lines.as_slice())), "")?.into_response())
}

// =============================================================================
// JSON API
// =============================================================================

/// `POST /api/orders` body.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub lines: Vec<LineItem>,
}

/// `GET /api/orders/{id}` body.
#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub order_id: OrderId,
    pub lines: Vec<OrderLineDetail>,
    /// Sum of line totals in cents, skipping removed products. `null` when
    /// the sum does not fit in 64 bits.
    pub total_cents: Option<Money>,
}

impl OrderHistory {
    pub fn new(order_id: OrderId, lines: Vec<OrderLineDetail>) -> Self {
        let total_cents = order_total(&lines);
        OrderHistory {
            order_id,
            lines,
            total_cents,
        }
    }
}

/// Places an order from an explicit line list.
///
/// `201` when completed, `422` when rejected; the body is the outcome
/// either way. Non-admins get `403` whatever the body holds.
pub async fn api_place(
    ApiAdmin(user): ApiAdmin,
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderOutcome>), ApiError> {
    let outcome = state
        .db
        .order_processor()
        .place_order(user.role, &request.lines)
        .await?;
    log_outcome(&user.username, &outcome);

    let status = if outcome.is_completed() {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(outcome)))
}

pub async fn api_show(
    ApiUser(_user): ApiUser,
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderHistory>, ApiError> {
    let lines = state.db.orders().lines_for_order(order_id).await?;
    Ok(Json(OrderHistory::new(order_id, lines)))
}
