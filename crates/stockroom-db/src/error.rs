//! # Storage Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► InventoryError (ledger, orders) ──► ApiError (web)
//! ```
//!
//! `NotFound` and `UniqueViolation` are expected outcomes the user can act
//! on; every other variant is a storage failure.

use thiserror::Error;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the given key: unknown product id in a lookup or a
    /// quantity change.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Insert collided with an existing key (product id on insert).
    #[error("{field} '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database file could not be opened or the pool is closed.
    #[error("Cannot open database: {0}")]
    Connect(String),

    #[error("Schema migration failed: {0}")]
    Migrate(String),

    /// Statement rejected by SQLite.
    #[error("Statement failed: {0}")]
    Query(String),

    /// No pooled connection became free within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    Busy,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl ToString) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Column named in a SQLite `UNIQUE constraint failed: table.column` message.
fn violated_column(message: &str) -> &str {
    message
        .split_once("constraint failed: ")
        .map(|(_, column)| column.trim())
        .unwrap_or("key")
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::duplicate(violated_column(db_err.message()), "?")
            }
            sqlx::Error::Database(db_err) => DbError::Query(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::Busy,
            sqlx::Error::PoolClosed => DbError::Connect("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::Connect(e.to_string()),
            sqlx::Error::Migrate(e) => DbError::Migrate(e.to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migrate(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;
