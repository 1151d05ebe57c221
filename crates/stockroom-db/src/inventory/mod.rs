//! # Inventory Workflow
//!
//! Stock ledger and order processor: the two components that combine
//! core rules ([`stockroom_core::stock`], roles, validation) with storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderProcessor ──► StockLedger statements ──► products.quantity        │
//! │        │                                                                │
//! │        └──────────► order_lines (sole writer, sole id allocator)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod ledger;
pub mod orders;

use thiserror::Error;

use crate::error::DbError;
use stockroom_core::{CoreError, ValidationError};

/// Errors from the ledger and the order processor.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Business rule violation (insufficient stock, role, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure, unknown product, duplicate id.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for InventoryError {
    fn from(err: ValidationError) -> Self {
        InventoryError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        InventoryError::Db(DbError::from(err))
    }
}

impl InventoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::Db(err) if err.is_not_found())
    }
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;
