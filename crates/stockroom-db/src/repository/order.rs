//! # Order Line Repository
//!
//! Read access to order history and the single write path used by the
//! order processor.
//!
//! ## History Join
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order_lines (order_id = 7)          products                          │
//! │  ─────────────────────────           ────────                          │
//! │  product 10, qty 2   ──LEFT JOIN──►  10 | 590... | 19.99 | shirt       │
//! │  product 42, qty 1   ──LEFT JOIN──►  (removed: NULL columns)           │
//! │                                                                         │
//! │  → OrderLineDetail per line, in insertion order                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::{LineItem, OrderId, OrderLine, OrderLineDetail};

/// Repository for order line reads.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Highest order id across all stored lines, 0 if there are none.
    pub async fn last_order_id(&self) -> DbResult<OrderId> {
        let last: OrderId = sqlx::query_scalar("SELECT COALESCE(MAX(order_id), 0) FROM order_lines")
            .fetch_one(&self.pool)
            .await?;

        Ok(last)
    }

    /// Lines of one order joined with their products.
    ///
    /// An unknown order id yields an empty list.
    pub async fn lines_for_order(&self, order_id: OrderId) -> DbResult<Vec<OrderLineDetail>> {
        debug!(order_id = %order_id, "Loading order history");

        let lines = sqlx::query_as::<_, OrderLineDetail>(
            r#"
            SELECT
                ol.order_id,
                ol.product_id,
                ol.quantity,
                p.barcode,
                p.price_cents,
                p.product_type
            FROM order_lines ol
            LEFT JOIN products p ON p.id = ol.product_id
            WHERE ol.order_id = ?1
            ORDER BY ol.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Total number of stored order lines.
    pub async fn count_lines(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Writes one order line. Runs on whatever executor the caller holds,
/// normally the per-line transaction of the order processor.
pub(crate) async fn insert_line<'e, E>(
    executor: E,
    order_id: OrderId,
    item: LineItem,
    created_at: DateTime<Utc>,
) -> DbResult<OrderLine>
where
    E: SqliteExecutor<'e>,
{
    let line = sqlx::query_as::<_, OrderLine>(
        r#"
        INSERT INTO order_lines (order_id, product_id, quantity, created_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, order_id, product_id, quantity, created_at
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(created_at)
    .fetch_one(executor)
    .await?;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_empty_history() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let orders = db.orders();

        assert_eq!(orders.last_order_id().await.unwrap(), 0);
        assert!(orders.lines_for_order(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_line_and_last_order_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        insert_line(db.pool(), 4, LineItem::new(10, 2), Utc::now())
            .await
            .unwrap();
        let line = insert_line(db.pool(), 9, LineItem::new(11, 1), Utc::now())
            .await
            .unwrap();

        assert_eq!(line.order_id, 9);
        assert_eq!(line.quantity, 1);
        assert_eq!(db.orders().last_order_id().await.unwrap(), 9);
        assert_eq!(db.orders().lines_for_order(4).await.unwrap().len(), 1);
        assert_eq!(db.orders().count_lines().await.unwrap(), 2);
    }
}
