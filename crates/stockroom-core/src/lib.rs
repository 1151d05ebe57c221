//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! Everything the inventory workflow decides without touching storage:
//! stock sufficiency, low-stock warnings, money parsing, form validation and
//! role checks.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/web (axum)                              │   │
//! │  │    /add  /delete  /check  /insert  /remove  /orders  /show     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stock   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │StockCheck │  │   forms   │  │   │
//! │  │   │ OrderLine │  │  parsing  │  │ low stock │  │ line items│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockroom-db (Database Layer)                     │   │
//! │  │        SQLite, catalog, stock ledger, order processor           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, OrderLine, Role, User)
//! - [`money`] - Integer money with decimal parsing for prices
//! - [`stock`] - Sufficiency checks and low-stock warnings
//! - [`error`] - Domain error types
//! - [`validation`] - Form field validation
//!
//! ## Example
//!
//! ```rust
//! use stockroom_core::stock::StockCheck;
//!
//! let check = StockCheck::evaluate(5, 3);
//! assert!(check.sufficient);
//! assert_eq!(check.remaining(), 2);
//! assert!(check.low_stock_warning.is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use stock::StockCheck;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Post-deduction quantity below which the low-stock warning is raised.
pub const LOW_STOCK_THRESHOLD: i64 = 2;

/// Advisory shown when an operation would leave fewer than
/// [`LOW_STOCK_THRESHOLD`] pieces in stock.
pub const LOW_STOCK_WARNING: &str = "The stock is low, you may want to add more products";

/// Shown when a delete-quantity request exceeds the available stock.
pub const TOO_MANY_PRODUCTS_MESSAGE: &str = "You are trying to delete too many products";

/// Shown when an order line cannot be fulfilled.
pub const ORDER_REJECTED_MESSAGE: &str = "You cannot order this product";

/// Maximum number of lines in one order.
pub const MAX_ORDER_LINES: usize = 100;
