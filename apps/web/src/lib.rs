//! # Stockroom Web
//!
//! axum server for the Stockroom inventory workflow.
//!
//! ## Module Organization
//! ```text
//! stockroom_web/
//! ├── lib.rs          ◄─── You are here (state, router, tracing)
//! ├── config.rs       ◄─── AppConfig: defaults, TOML, environment
//! ├── auth.rs         ◄─── Session tokens and user extractors
//! ├── error.rs        ◄─── ApiError and status mapping
//! ├── pages.rs        ◄─── HTML rendering
//! └── handlers/
//!     ├── mod.rs      ◄─── Health, shared form helpers
//!     ├── session.rs  ◄─── Login, logout, home
//!     ├── stock.rs    ◄─── Add, delete, check quantity
//!     ├── catalog.rs  ◄─── Insert, remove product
//!     └── orders.rs   ◄─── Place order, show order, JSON API
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request ──► Router ──► extractor (CurrentUser, AdminUser, ApiUser,    │
//! │                                     ApiAdmin); role read from users    │
//! │                              │                                          │
//! │                 no session ──┼──► 303 /login (pages) or 401 (API)      │
//! │                 not admin ───┼──► 303 /home (pages) or 403 (API)       │
//! │                              ▼                                          │
//! │                          handler ──► stockroom-db ──► page / redirect  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use stockroom_db::Database;

use crate::auth::SessionManager;
use crate::config::AppConfig;

/// Shared state handed to every handler.
///
/// Holds no per-user data; the signed-in user is resolved per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(db: Database, sessions: SessionManager) -> Self {
        AppState {
            db,
            sessions: Arc::new(sessions),
        }
    }

    pub fn from_config(db: Database, config: &AppConfig) -> Self {
        AppState::new(db, SessionManager::from_settings(&config.session))
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    use handlers::{catalog, orders, session, stock};

    Router::new()
        .route("/", get(session::index))
        .route("/login", get(session::login_form).post(session::login))
        .route("/logout", get(session::logout))
        .route("/home", get(session::home))
        .route("/add", get(stock::add_form).post(stock::add))
        .route("/delete", get(stock::delete_form).post(stock::delete))
        .route("/check", get(stock::check_form).post(stock::check))
        .route("/show", get(orders::show_form).post(orders::show))
        .route("/insert", get(catalog::insert_form).post(catalog::insert))
        .route("/remove", get(catalog::remove_form).post(catalog::remove))
        .route("/orders", get(orders::orders_form).post(orders::place))
        .route("/api/orders", post(orders::api_place))
        .route("/api/orders/{id}", get(orders::api_show))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom_db=trace` - Trace the database layer only
/// - Default: `info,stockroom=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
