//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   OrderLine     │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (integer)   │◄──│  product_id     │   │  username       │       │
//! │  │  barcode        │   │  order_id       │   │  password_hash  │       │
//! │  │  price_cents    │   │  quantity       │   │  role ──────────┼──┐    │
//! │  │  quantity       │   └─────────────────┘   └─────────────────┘  │    │
//! │  │  product_type   │                                              │    │
//! │  └─────────────────┘   An Order is every OrderLine that shares    │    │
//! │                        one order_id; it has no row of its own.    ▼    │
//! │                                              ┌─────────────────────┐   │
//! │                                              │ Role                │   │
//! │                                              │  Administrator      │   │
//! │                                              │  NormalEmployee     │   │
//! │                                              └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Product primary key.
pub type ProductId = i64;

/// Identifier shared by every line of one order.
pub type OrderId = i64;

// =============================================================================
// Product
// =============================================================================

/// A clothing product held in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Primary key, chosen by the administrator on insert.
    pub id: ProductId,

    /// Barcode printed on the label.
    pub barcode: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Pieces currently in stock. Never negative.
    pub quantity: i64,

    /// Kind of garment ("shirt", "jeans", ...).
    #[serde(rename = "type")]
    pub product_type: String,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One requested line of an order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        LineItem {
            product_id,
            quantity,
        }
    }
}

/// A committed order line. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    /// Internal auto-increment row id.
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// An order line joined with the product it refers to.
///
/// Product columns are `None` when the product was removed after the order
/// was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLineDetail {
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Ordered quantity (not the current stock).
    pub quantity: i64,
    pub barcode: Option<String>,
    pub price_cents: Option<i64>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
}

impl OrderLineDetail {
    /// Unit price × ordered quantity.
    ///
    /// `None` when the product was removed or the result does not fit in
    /// an `i64`; [`is_removed`](Self::is_removed) tells the two apart.
    pub fn line_total(&self) -> Option<Money> {
        self.price_cents
            .and_then(|cents| Money::from_cents(cents).checked_mul(self.quantity))
    }

    /// Whether the product row no longer exists.
    pub fn is_removed(&self) -> bool {
        self.barcode.is_none()
    }
}

/// Sum of line totals, skipping removed products. `None` on overflow.
pub fn order_total(lines: &[OrderLineDetail]) -> Option<Money> {
    lines
        .iter()
        .filter(|line| !line.is_removed())
        .try_fold(Money::zero(), |total, line| total.checked_add(line.line_total()?))
}

// =============================================================================
// Role
// =============================================================================

/// Position of a user, gating admin-only operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May insert and remove products and place orders.
    Administrator,
    /// May adjust and inspect stock only.
    NormalEmployee,
}

impl Role {
    /// Returns true for roles allowed to run admin-only operations.
    pub fn is_admin(&self) -> bool {
        match self {
            Role::Administrator => true,
            Role::NormalEmployee => false,
        }
    }

    /// Fails with [`CoreError::Unauthorized`] unless this role is an
    /// administrator.
    pub fn require_admin(&self, action: &str) -> CoreResult<()> {
        match self {
            Role::Administrator => Ok(()),
            Role::NormalEmployee => Err(CoreError::Unauthorized {
                role: *self,
                action: action.to_string(),
            }),
        }
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::NormalEmployee => "normal_employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Administrator => write!(f, "Administrator"),
            Role::NormalEmployee => write!(f, "Normal Employee"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "normal_employee" | "employee" => Ok(Role::NormalEmployee),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["administrator".to_string(), "normal_employee".to_string()],
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A user account as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detail(price_cents: Option<i64>) -> OrderLineDetail {
        OrderLineDetail {
            order_id: 1,
            product_id: 10,
            quantity: 3,
            barcode: price_cents.map(|_| "5901234123457".to_string()),
            price_cents,
            product_type: price_cents.map(|_| "shirt".to_string()),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Administrator".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("Normal Employee".parse::<Role>().unwrap(), Role::NormalEmployee);
        assert_eq!("normal_employee".parse::<Role>().unwrap(), Role::NormalEmployee);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_require_admin() {
        assert!(Role::Administrator.require_admin("insert products").is_ok());
        let err = Role::NormalEmployee.require_admin("insert products").unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized { role: Role::NormalEmployee, .. }));
    }

    #[test]
    fn test_role_display_round_trips() {
        for role in [Role::Administrator, Role::NormalEmployee] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_product_serializes_type_field() {
        let product = Product {
            id: 10,
            barcode: "5901234123457".to_string(),
            price_cents: 1999,
            quantity: 5,
            product_type: "shirt".to_string(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "shirt");
        assert_eq!(product.price().to_string(), "19.99");
    }

    #[test]
    fn test_order_line_detail_totals() {
        let detail = sample_detail(Some(1250));
        assert_eq!(detail.line_total(), Some(Money::from_cents(3750)));
        assert!(!detail.is_removed());

        let removed = sample_detail(None);
        assert_eq!(removed.line_total(), None);
        assert!(removed.is_removed());

        assert_eq!(order_total(&[detail, removed]), Some(Money::from_cents(3750)));
        assert_eq!(order_total(&[]), Some(Money::zero()));
    }

    #[test]
    fn test_order_totals_never_overflow() {
        let huge = OrderLineDetail {
            quantity: 2,
            ..sample_detail(Some(i64::MAX))
        };
        assert_eq!(huge.line_total(), None);
        assert!(!huge.is_removed());
        assert_eq!(order_total(&[huge]), None);

        let half = OrderLineDetail {
            quantity: 1,
            ..sample_detail(Some(i64::MAX / 2 + 1))
        };
        assert!(half.line_total().is_some());
        assert_eq!(order_total(&[half.clone(), half]), None);
    }
}
