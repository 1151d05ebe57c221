//! # Stock Handlers
//!
//! Add, delete and check quantity. Open to every signed-in user.
//!
//! ## Delete Flow
//! ```text
//! POST /delete { id: 10, quantity: 4 }
//!      │
//!      ▼
//! StockLedger::withdraw(10, 4)   (conditional decrement)
//!      │
//!      ├── applied ──────────────► render low-stock warning (may be empty)
//!      └── InsufficientStock ────► ApiError ─► re-render with
//!                                  "You are trying to delete too many products"
//! ```

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use tracing::info;

use stockroom_core::validation::{parse_positive_quantity, parse_product_id};
use stockroom_core::ValidationError;

use super::{rerender, IdForm, PageResult, QuantityForm};
use crate::auth::CurrentUser;
use crate::pages;
use crate::AppState;

fn parse_quantity_form(form: &QuantityForm) -> Result<(i64, i64), ValidationError> {
    let id = parse_product_id("id", &form.id)?;
    let quantity = parse_positive_quantity("quantity", &form.quantity)?;
    Ok((id, quantity))
}

/// Message rendered by a successful check.
pub fn current_quantity_message(id: i64, quantity: i64) -> String {
    format!("The current quantity of product with id {id} is {quantity}")
}

// =============================================================================
// Add
// =============================================================================

pub async fn add_form(user: CurrentUser) -> impl IntoResponse {
    pages::add_page(&user, "")
}

pub async fn add(
    user: CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<QuantityForm>,
) -> PageResult {
    let render = |message: &str| pages::add_page(&user, message);

    let (id, quantity) = match parse_quantity_form(&form) {
        Ok(parsed) => parsed,
        Err(e) => return rerender(e, render),
    };

    match state.db.ledger().apply_delta(id, quantity).await {
        Ok(new_quantity) => {
            info!(username = %user.username, product_id = %id, added = %quantity, quantity = %new_quantity, "Quantity added");
            Ok(Redirect::to("/home").into_response())
        }
        Err(e) => rerender(e, render),
    }
}

// =============================================================================
// Delete
// =============================================================================

pub async fn delete_form(user: CurrentUser) -> impl IntoResponse {
    pages::delete_page(&user, "")
}

pub async fn delete(
    user: CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<QuantityForm>,
) -> PageResult {
    let render = |message: &str| pages::delete_page(&user, message);

    let (id, quantity) = match parse_quantity_form(&form) {
        Ok(parsed) => parsed,
        Err(e) => return rerender(e, render),
    };

    let check = match state.db.ledger().withdraw(id, quantity).await {
        Ok(check) => check,
        Err(e) => return rerender(e, render),
    };

    info!(username = %user.username, product_id = %id, deleted = %quantity, quantity = %check.remaining(), "Quantity deleted");
    Ok(render(check.warning_text())?.into_response())
}

// =============================================================================
// Check
// =============================================================================

pub async fn check_form(user: CurrentUser) -> impl IntoResponse {
    pages::check_page(&user, "")
}

pub async fn check(
    user: CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> PageResult {
    let render = |message: &str| pages::check_page(&user, message);

    let id = match parse_product_id("id", &form.id) {
        Ok(id) => id,
        Err(e) => return rerender(e, render),
    };

    match state.db.ledger().current_quantity(id).await {
        Ok(quantity) => Ok(render(&current_quantity_message(id, quantity))?.into_response()),
        Err(e) => rerender(e, render),
    }
}
