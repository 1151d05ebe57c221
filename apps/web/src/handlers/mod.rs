//! # HTTP Handlers
//!
//! Form handlers follow one shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  ──► render the empty form                                        │
//! │  POST ──► parse strings (stockroom_core::validation)                   │
//! │             │                                                           │
//! │             ├── invalid ────────► re-render form with the message      │
//! │             ▼                                                           │
//! │           stockroom-db call                                            │
//! │             │                                                           │
//! │             ├── expected failure ► re-render form with the message     │
//! │             ├── storage failure ─► ApiError (500, logged)              │
//! │             ▼                                                           │
//! │           redirect /home or render the result message                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod orders;
pub mod session;
pub mod stock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::ApiError;
use crate::pages::Page;
use crate::AppState;

/// Handler result for HTML routes.
pub type PageResult = Result<Response, ApiError>;

/// `{ id }` form.
#[derive(Debug, Default, Deserialize)]
pub struct IdForm {
    #[serde(default)]
    pub id: String,
}

/// `{ id, quantity }` form.
#[derive(Debug, Default, Deserialize)]
pub struct QuantityForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub quantity: String,
}

/// Re-renders a form for errors the user can act on; anything else
/// propagates as a 500.
pub(crate) fn rerender(err: impl Into<ApiError>, page: impl FnOnce(&str) -> Page) -> PageResult {
    let err = err.into();
    if err.is_user_facing() {
        tracing::debug!(code = ?err.code, message = %err.message, "Form rejected");
        Ok(page(&err.message)?.into_response())
    } else {
        Err(err)
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        tracing::error!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}
