//! # Order Processor
//!
//! Multi-line order intake.
//!
//! ## Processing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place_order(role, [(1,5), (2,3), (0,0), (3,99)])                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  role.require_admin ──✗──► Unauthorized (nothing allocated or written)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock allocator; order_id = max(stored max, last handed out) + 1        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each line until the first quantity 0:                              │
//! │     BEGIN                                                               │
//! │       conditional decrement ──✗──► ROLLBACK, order Rejected             │
//! │       INSERT order line            (earlier lines stay committed)       │
//! │     COMMIT                                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Completed { lines (1,5) and (2,3) }; (3,99) never looked at            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use stockroom_core::stock::low_stock_warning;
use stockroom_core::validation::validate_line_items;
use stockroom_core::{LineItem, OrderId, OrderLine, ProductId, Role, ORDER_REJECTED_MESSAGE};

use super::ledger::{quantity_of, try_withdraw};
use super::InventoryResult;
use crate::repository::order::{insert_line, OrderRepository};

/// Why a line stopped the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    InsufficientStock { available: i64, requested: i64 },
    UnknownProduct,
}

/// Final state of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderStatus {
    Completed,
    Rejected {
        line: LineItem,
        reason: RejectionReason,
    },
}

/// What happened to one order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderOutcome {
    pub order_id: OrderId,
    /// Lines written, in submission order. On rejection these stay
    /// committed.
    pub committed: Vec<OrderLine>,
    #[serde(flatten)]
    pub status: OrderStatus,
    /// Products left below the low-stock threshold by this order.
    pub low_stock: Vec<ProductId>,
}

impl OrderOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, OrderStatus::Completed)
    }

    /// User-facing rejection text, if the order was rejected.
    pub fn rejection_message(&self) -> Option<&'static str> {
        match self.status {
            OrderStatus::Completed => None,
            OrderStatus::Rejected { .. } => Some(ORDER_REJECTED_MESSAGE),
        }
    }
}

enum LineResult {
    Committed { line: OrderLine, remaining: i64 },
    Rejected(RejectionReason),
}

/// Sole writer of order lines and sole allocator of order ids.
#[derive(Debug, Clone)]
pub struct OrderProcessor {
    pool: SqlitePool,
    last_allocated: Arc<Mutex<OrderId>>,
}

impl OrderProcessor {
    /// Processors built from the same `Database` share `last_allocated`.
    pub fn new(pool: SqlitePool, last_allocated: Arc<Mutex<OrderId>>) -> Self {
        OrderProcessor {
            pool,
            last_allocated,
        }
    }

    /// Places one order on behalf of a user with `role`.
    ///
    /// ## Returns
    /// * `Ok(outcome)` - Completed, or rejected at the first line that could
    ///   not be fulfilled
    /// * `Err(Core(Unauthorized))` - Caller is not an administrator
    /// * `Err(Core(Validation))` - Negative quantity or too many lines
    /// * `Err(Db(_))` - Storage failure
    pub async fn place_order(&self, role: Role, items: &[LineItem]) -> InventoryResult<OrderOutcome> {
        role.require_admin("place orders")?;
        validate_line_items(items)?;

        // Held for the whole submission: orders are serialized.
        let mut last_allocated = self.last_allocated.lock().await;
        let stored = OrderRepository::new(self.pool.clone()).last_order_id().await?;
        let order_id = stored.max(*last_allocated) + 1;
        *last_allocated = order_id;

        info!(order_id = %order_id, lines = items.len(), "Processing order");

        let mut committed = Vec::new();
        let mut low_stock = Vec::new();

        for item in items.iter().copied().take_while(|item| item.quantity > 0) {
            match self.commit_line(order_id, item).await? {
                LineResult::Committed { line, remaining } => {
                    if low_stock_warning(remaining + item.quantity, item.quantity).is_some() {
                        low_stock.push(item.product_id);
                    }
                    committed.push(line);
                }
                LineResult::Rejected(reason) => {
                    warn!(
                        order_id = %order_id,
                        product_id = %item.product_id,
                        quantity = %item.quantity,
                        committed = committed.len(),
                        ?reason,
                        "Order rejected"
                    );
                    return Ok(OrderOutcome {
                        order_id,
                        committed,
                        status: OrderStatus::Rejected { line: item, reason },
                        low_stock,
                    });
                }
            }
        }

        info!(order_id = %order_id, lines = committed.len(), "Order completed");

        Ok(OrderOutcome {
            order_id,
            committed,
            status: OrderStatus::Completed,
            low_stock,
        })
    }

    /// Decrement and line insert for one item, in one transaction.
    async fn commit_line(&self, order_id: OrderId, item: LineItem) -> InventoryResult<LineResult> {
        let mut tx = self.pool.begin().await?;

        let remaining = match try_withdraw(&mut *tx, item.product_id, item.quantity).await? {
            Some(remaining) => remaining,
            None => {
                let reason = match quantity_of(&mut *tx, item.product_id).await? {
                    Some(available) => RejectionReason::InsufficientStock {
                        available,
                        requested: item.quantity,
                    },
                    None => RejectionReason::UnknownProduct,
                };
                tx.rollback().await?;
                return Ok(LineResult::Rejected(reason));
            }
        };

        let line = insert_line(&mut *tx, order_id, item, Utc::now()).await?;
        tx.commit().await?;

        debug!(
            order_id = %order_id,
            product_id = %item.product_id,
            quantity = %item.quantity,
            remaining = %remaining,
            "Order line committed"
        );

        Ok(LineResult::Committed { line, remaining })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryError;
    use crate::{Database, DbConfig};
    use stockroom_core::{CoreError, Product};

    async fn db_with(products: &[(ProductId, i64)]) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for &(id, quantity) in products {
            db.products()
                .insert(&Product {
                    id,
                    barcode: format!("B{id}"),
                    price_cents: 500,
                    quantity,
                    product_type: "socks".to_string(),
                })
                .await
                .unwrap();
        }
        db
    }

    fn lines(pairs: &[(ProductId, i64)]) -> Vec<LineItem> {
        pairs.iter().map(|&(id, qty)| LineItem::new(id, qty)).collect()
    }

    #[tokio::test]
    async fn test_stops_at_zero_quantity() {
        let db = db_with(&[(1, 10), (2, 10), (3, 10)]).await;

        let outcome = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(1, 5), (2, 3), (0, 0), (3, 99)]))
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.order_id, 1);
        assert_eq!(outcome.committed.len(), 2);
        assert_eq!(db.ledger().current_quantity(1).await.unwrap(), 5);
        assert_eq!(db.ledger().current_quantity(2).await.unwrap(), 7);
        assert_eq!(db.ledger().current_quantity(3).await.unwrap(), 10);
        assert_eq!(db.orders().count_lines().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_lines_after_zero_quantity_are_not_validated() {
        let db = db_with(&[(10, 5)]).await;

        let outcome = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(10, 1), (0, 0), (3, -1)]))
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(db.ledger().current_quantity(10).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sequential_ids_are_contiguous() {
        let db = db_with(&[(1, 100)]).await;

        // pre-existing history up to order 41
        insert_line(db.pool(), 41, LineItem::new(1, 1), Utc::now())
            .await
            .unwrap();

        let processor = db.order_processor();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let outcome = processor
                .place_order(Role::Administrator, &lines(&[(1, 1)]))
                .await
                .unwrap();
            ids.push(outcome.order_id);
        }

        assert_eq!(ids, vec![42, 43, 44]);
    }

    #[tokio::test]
    async fn test_empty_order_consumes_id() {
        let db = db_with(&[(1, 10)]).await;
        let processor = db.order_processor();

        let empty = processor.place_order(Role::Administrator, &[]).await.unwrap();
        assert_eq!(empty.order_id, 1);
        assert!(empty.committed.is_empty());

        // a second processor from the same Database shares the allocator
        let next = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(1, 1)]))
            .await
            .unwrap();
        assert_eq!(next.order_id, 2);
    }

    #[tokio::test]
    async fn test_insufficient_line_keeps_earlier_lines() {
        let db = db_with(&[(1, 10), (2, 1), (3, 10)]).await;

        let outcome = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(1, 4), (2, 3), (3, 1)]))
            .await
            .unwrap();

        assert_eq!(outcome.rejection_message(), Some(ORDER_REJECTED_MESSAGE));
        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(
            outcome.status,
            OrderStatus::Rejected {
                line: LineItem::new(2, 3),
                reason: RejectionReason::InsufficientStock {
                    available: 1,
                    requested: 3
                },
            }
        );

        assert_eq!(db.ledger().current_quantity(1).await.unwrap(), 6);
        assert_eq!(db.ledger().current_quantity(2).await.unwrap(), 1);
        assert_eq!(db.ledger().current_quantity(3).await.unwrap(), 10);
        assert_eq!(db.orders().lines_for_order(outcome.order_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_rejects() {
        let db = db_with(&[]).await;

        let outcome = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(404, 1)]))
            .await
            .unwrap();

        assert!(matches!(
            outcome.status,
            OrderStatus::Rejected {
                reason: RejectionReason::UnknownProduct,
                ..
            }
        ));
        assert_eq!(db.orders().count_lines().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_employee_cannot_order() {
        let db = db_with(&[(1, 10)]).await;

        let err = db
            .order_processor()
            .place_order(Role::NormalEmployee, &lines(&[(1, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InventoryError::Core(CoreError::Unauthorized { .. })
        ));
        assert_eq!(db.orders().count_lines().await.unwrap(), 0);
        assert_eq!(db.ledger().current_quantity(1).await.unwrap(), 10);

        // no id was consumed
        let outcome = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(1, 1)]))
            .await
            .unwrap();
        assert_eq!(outcome.order_id, 1);
    }

    #[tokio::test]
    async fn test_low_stock_reported() {
        let db = db_with(&[(1, 5), (2, 10)]).await;

        let outcome = db
            .order_processor()
            .place_order(Role::Administrator, &lines(&[(1, 4), (2, 1)]))
            .await
            .unwrap();

        assert_eq!(outcome.low_stock, vec![1]);
    }

    #[tokio::test]
    async fn test_concurrent_orders_get_distinct_ids() {
        let db = db_with(&[(1, 100)]).await;

        let mut handles = Vec::new();
        for _ in 0..5 {
            let processor = db.order_processor();
            handles.push(tokio::spawn(async move {
                processor
                    .place_order(Role::Administrator, &[LineItem::new(1, 1)])
                    .await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().order_id);
        }
        ids.sort_unstable();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(db.ledger().current_quantity(1).await.unwrap(), 95);
    }

    #[test]
    fn test_outcome_serializes_status() {
        let outcome = OrderOutcome {
            order_id: 3,
            committed: Vec::new(),
            status: OrderStatus::Rejected {
                line: LineItem::new(9, 2),
                reason: RejectionReason::UnknownProduct,
            },
            low_stock: Vec::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"]["kind"], "unknown_product");
        assert_eq!(json["line"]["product_id"], 9);
    }
}
