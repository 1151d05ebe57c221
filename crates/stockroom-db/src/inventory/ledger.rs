//! # Stock Ledger
//!
//! Quantity arithmetic over one product row.
//!
//! ## Delta Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ Read, compute, write back the absolute value                    │
//! │     SELECT quantity ...; UPDATE products SET quantity = 7           │
//! │     (two clerks deleting at once lose one of the updates)           │
//! │                                                                     │
//! │  ✅ One relative statement, guarded against i64 overflow           │
//! │     UPDATE products SET quantity = quantity + ?                     │
//! │     WHERE id = ? AND quantity BETWEEN ? AND ?                       │
//! │                                                                     │
//! │  ✅ Withdrawal: relative and conditional                            │
//! │     UPDATE products SET quantity = quantity - ?                     │
//! │     WHERE id = ? AND quantity >= ?                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use stockroom_core::stock::{delta_headroom, StockCheck};
use stockroom_core::{ProductId, ValidationError};

use super::InventoryResult;
use crate::error::{DbError, DbResult};

/// Stock ledger over the products table.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Current quantity of a product.
    ///
    /// ## Returns
    /// * `Err(NotFound)` - No product with this id
    pub async fn current_quantity(&self, product_id: ProductId) -> InventoryResult<i64> {
        let quantity = quantity_of(&self.pool, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        Ok(quantity)
    }

    /// Checks `requested` against the stored quantity without writing.
    pub async fn is_sufficient(
        &self,
        product_id: ProductId,
        requested: i64,
    ) -> InventoryResult<StockCheck> {
        let available = self.current_quantity(product_id).await?;
        Ok(StockCheck::evaluate(available, requested))
    }

    /// Adds `delta` to the stored quantity and returns the new quantity.
    ///
    /// No clamping: a negative result is written as is. Callers that
    /// consume stock use [`withdraw`](Self::withdraw).
    ///
    /// ## Returns
    /// * `Err(NotFound)` - No product with this id
    /// * `Err(Validation(OutOfRange))` - The sum does not fit; nothing written
    pub async fn apply_delta(&self, product_id: ProductId, delta: i64) -> InventoryResult<i64> {
        debug!(product_id = %product_id, delta = %delta, "Applying stock delta");

        let headroom = delta_headroom(delta);
        let quantity: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET quantity = quantity + ?2
            WHERE id = ?1 AND quantity BETWEEN ?3 AND ?4
            RETURNING quantity
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(*headroom.start())
        .bind(*headroom.end())
        .fetch_optional(&self.pool)
        .await?;

        let Some(quantity) = quantity else {
            let current = self.current_quantity(product_id).await?;
            warn!(
                product_id = %product_id,
                delta = %delta,
                quantity = %current,
                "Stock delta refused: quantity out of range"
            );
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: i64::MIN.saturating_sub(current),
                max: i64::MAX.saturating_sub(current),
            }
            .into());
        };

        info!(product_id = %product_id, delta = %delta, quantity = %quantity, "Stock updated");
        Ok(quantity)
    }

    /// Takes `requested` pieces out of stock if enough are available.
    ///
    /// ## Returns
    /// * `Ok(check)` - Applied; `check` carries the low-stock warning
    /// * `Err(Core(InsufficientStock))` - Fewer pieces than requested;
    ///   nothing written
    /// * `Err(NotFound)` - No product with this id
    pub async fn withdraw(
        &self,
        product_id: ProductId,
        requested: i64,
    ) -> InventoryResult<StockCheck> {
        if requested <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        loop {
            if let Some(remaining) = try_withdraw(&self.pool, product_id, requested).await? {
                let check = StockCheck::evaluate(remaining + requested, requested);
                info!(
                    product_id = %product_id,
                    requested = %requested,
                    remaining = %remaining,
                    low_stock = check.low_stock_warning.is_some(),
                    "Stock withdrawn"
                );
                return Ok(check);
            }

            let available = self.current_quantity(product_id).await?;
            if let Err(e) = StockCheck::evaluate(available, requested).require_sufficient(product_id) {
                warn!(
                    product_id = %product_id,
                    requested = %requested,
                    available = %available,
                    "Withdrawal refused: insufficient stock"
                );
                return Err(e.into());
            }
            // restocked between the two statements
        }
    }
}

// =============================================================================
// Statements shared with the order processor
// =============================================================================

pub(crate) async fn quantity_of<'e, E>(executor: E, product_id: ProductId) -> DbResult<Option<i64>>
where
    E: SqliteExecutor<'e>,
{
    let quantity: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(executor)
        .await?;

    Ok(quantity)
}

/// Conditional decrement. `Some(remaining)` when applied, `None` when the
/// product is missing or holds fewer than `requested` pieces.
pub(crate) async fn try_withdraw<'e, E>(
    executor: E,
    product_id: ProductId,
    requested: i64,
) -> DbResult<Option<i64>>
where
    E: SqliteExecutor<'e>,
{
    let remaining: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET quantity = quantity - ?2
        WHERE id = ?1 AND quantity >= ?2
        RETURNING quantity
        "#,
    )
    .bind(product_id)
    .bind(requested)
    .fetch_optional(executor)
    .await?;

    Ok(remaining)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryError;
    use crate::{Database, DbConfig};
    use stockroom_core::{CoreError, Product, LOW_STOCK_WARNING};

    async fn db_with(products: &[(ProductId, i64)]) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for &(id, quantity) in products {
            db.products()
                .insert(&Product {
                    id,
                    barcode: format!("B{id}"),
                    price_cents: 1000,
                    quantity,
                    product_type: "shirt".to_string(),
                })
                .await
                .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_current_quantity() {
        let db = db_with(&[(10, 5)]).await;
        let ledger = db.ledger();

        assert_eq!(ledger.current_quantity(10).await.unwrap(), 5);
        assert!(ledger.current_quantity(11).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_apply_delta_restores_quantity() {
        let db = db_with(&[(10, 5)]).await;
        let ledger = db.ledger();

        assert_eq!(ledger.apply_delta(10, 4).await.unwrap(), 9);
        assert_eq!(ledger.apply_delta(10, -4).await.unwrap(), 5);
        assert_eq!(ledger.current_quantity(10).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_apply_delta_overflow_leaves_row_intact() {
        let db = db_with(&[(10, 5)]).await;
        let ledger = db.ledger();

        let err = ledger.apply_delta(10, i64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let stored_type: String = sqlx::query_scalar("SELECT typeof(quantity) FROM products WHERE id = 10")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stored_type, "integer");
        assert_eq!(ledger.current_quantity(10).await.unwrap(), 5);
        assert!(ledger.withdraw(10, 1).await.unwrap().sufficient);
        assert_eq!(db.products().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_delta_up_to_i64_max() {
        let db = db_with(&[(10, 5)]).await;
        let ledger = db.ledger();

        assert_eq!(ledger.apply_delta(10, i64::MAX - 5).await.unwrap(), i64::MAX);
        assert!(ledger.apply_delta(10, 1).await.is_err());
        assert_eq!(ledger.current_quantity(10).await.unwrap(), i64::MAX);
    }

    #[tokio::test]
    async fn test_apply_delta_unknown_product() {
        let db = db_with(&[]).await;
        let err = db.ledger().apply_delta(77, 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_is_sufficient_matches_quantity() {
        let db = db_with(&[(10, 5)]).await;
        let ledger = db.ledger();

        for requested in 1..=7 {
            let check = ledger.is_sufficient(10, requested).await.unwrap();
            assert_eq!(check.sufficient, requested <= 5);
            assert_eq!(check.low_stock_warning.is_some(), 5 - requested < 2);
        }
        // advisory only
        assert_eq!(ledger.current_quantity(10).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_withdraw_three_then_four() {
        let db = db_with(&[(10, 5)]).await;
        let ledger = db.ledger();

        let first = ledger.withdraw(10, 3).await.unwrap();
        assert!(first.sufficient);
        assert!(first.low_stock_warning.is_none());
        assert_eq!(ledger.current_quantity(10).await.unwrap(), 2);

        let err = ledger.withdraw(10, 4).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Core(CoreError::InsufficientStock {
                product_id: 10,
                available: 2,
                requested: 4
            })
        ));
        assert_eq!(ledger.current_quantity(10).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_withdraw_to_low_stock_warns() {
        let db = db_with(&[(10, 5)]).await;

        let check = db.ledger().withdraw(10, 4).await.unwrap();
        assert!(check.sufficient);
        assert_eq!(check.low_stock_warning, Some(LOW_STOCK_WARNING));
        assert_eq!(check.remaining(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_rejects_non_positive() {
        let db = db_with(&[(10, 5)]).await;
        assert!(db.ledger().withdraw(10, 0).await.is_err());
        assert_eq!(db.ledger().current_quantity(10).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_withdrawals_never_oversell() {
        let db = db_with(&[(10, 5)]).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = db.ledger();
            handles.push(tokio::spawn(async move { ledger.withdraw(10, 1).await }));
        }

        let mut applied = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(check) => {
                    assert!(check.sufficient);
                    applied += 1;
                }
                Err(err) => assert!(matches!(
                    err,
                    InventoryError::Core(CoreError::InsufficientStock { .. })
                )),
            }
        }

        assert_eq!(applied, 5);
        assert_eq!(db.ledger().current_quantity(10).await.unwrap(), 0);
    }
}
