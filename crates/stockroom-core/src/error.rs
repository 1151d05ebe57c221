//! # Error Types
//!
//! ```text
//! ValidationError ─► CoreError ─┐
//!                               ├─► InventoryError (stockroom-db) ─► ApiError (web)
//!        DbError (stockroom-db) ┘
//! ```

use thiserror::Error;

use crate::types::{ProductId, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Inventory rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A delete or order line asks for more pieces than are in stock.
    ///
    /// ```text
    /// delete (id 10, qty 4) with 2 in stock
    ///   └─► InsufficientStock { product_id: 10, available: 2, requested: 4 }
    ///         └─► "You are trying to delete too many products"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The signed-in role may not run this operation.
    #[error("{role} is not allowed to {action}")]
    Unauthorized { role: Role, action: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A form field that cannot become a typed argument. Nothing is written
/// when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Too many order lines.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative quantity where at least one piece is needed.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Non-integer id or quantity, malformed price, whitespace in a barcode.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Unknown role name.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
