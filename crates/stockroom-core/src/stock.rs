//! # Stock Arithmetic
//!
//! The pure half of the stock ledger. `stockroom-db` reads the current
//! quantity and asks this module what it means. [`delta_headroom`] bounds
//! the rows a relative update may touch.
//!
//! ## Sufficiency and Warning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   available = 5                                                         │
//! │                                                                         │
//! │   requested   sufficient   remaining   low-stock warning                │
//! │   ─────────   ──────────   ─────────   ─────────────────                │
//! │       3          yes           2        no                              │
//! │       4          yes           1        yes  (remaining < 2)            │
//! │       6          no           -1        yes  (advisory only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::ops::RangeInclusive;

use crate::error::{CoreError, CoreResult};
use crate::types::ProductId;
use crate::{LOW_STOCK_THRESHOLD, LOW_STOCK_WARNING};

/// Result of checking a requested quantity against available stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockCheck {
    /// `available >= requested`.
    pub sufficient: bool,
    pub available: i64,
    pub requested: i64,
    /// Set exactly when `available - requested` is below the threshold.
    pub low_stock_warning: Option<&'static str>,
}

impl StockCheck {
    pub fn evaluate(available: i64, requested: i64) -> Self {
        StockCheck {
            sufficient: available >= requested,
            available,
            requested,
            low_stock_warning: low_stock_warning(available, requested),
        }
    }

    /// Quantity left if the request were applied.
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.available.saturating_sub(self.requested)
    }

    /// Converts an insufficient check into [`CoreError::InsufficientStock`].
    pub fn require_sufficient(&self, product_id: ProductId) -> CoreResult<()> {
        if self.sufficient {
            Ok(())
        } else {
            Err(CoreError::InsufficientStock {
                product_id,
                available: self.available,
                requested: self.requested,
            })
        }
    }

    /// Warning text, or an empty string when stock stays comfortable.
    pub fn warning_text(&self) -> &'static str {
        self.low_stock_warning.unwrap_or("")
    }
}

/// Low-stock advisory for taking `requested` pieces out of `available`.
pub fn low_stock_warning(available: i64, requested: i64) -> Option<&'static str> {
    if available.saturating_sub(requested) < LOW_STOCK_THRESHOLD {
        Some(LOW_STOCK_WARNING)
    } else {
        None
    }
}

/// Stored quantities that `delta` can be added to without leaving the
/// `i64` range. Negative results are allowed.
///
/// ```rust
/// use stockroom_core::stock::delta_headroom;
///
/// assert!(delta_headroom(10).contains(&(i64::MAX - 10)));
/// assert!(!delta_headroom(10).contains(&(i64::MAX - 9)));
/// ```
pub fn delta_headroom(delta: i64) -> RangeInclusive<i64> {
    if delta >= 0 {
        i64::MIN..=i64::MAX - delta
    } else {
        i64::MIN - delta..=i64::MAX
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sufficient_iff_requested_within_available() {
        for requested in 0..=8 {
            let check = StockCheck::evaluate(5, requested);
            assert_eq!(check.sufficient, requested <= 5, "requested {requested}");
        }
    }

    #[test]
    fn test_warning_iff_remaining_below_two() {
        for requested in 0..=8 {
            let check = StockCheck::evaluate(5, requested);
            assert_eq!(
                check.low_stock_warning.is_some(),
                5 - requested < 2,
                "requested {requested}"
            );
        }
    }

    #[test]
    fn test_delete_three_of_five_has_no_warning() {
        let check = StockCheck::evaluate(5, 3);
        assert!(check.sufficient);
        assert_eq!(check.remaining(), 2);
        assert_eq!(check.warning_text(), "");
    }

    #[test]
    fn test_delete_four_of_two_is_insufficient() {
        let check = StockCheck::evaluate(2, 4);
        assert!(!check.sufficient);
        assert_eq!(check.low_stock_warning, Some(LOW_STOCK_WARNING));

        let err = check.require_sufficient(10).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product_id: 10,
                available: 2,
                requested: 4
            }
        );
    }

    #[test]
    fn test_delta_headroom_matches_checked_add() {
        for delta in [0, 1, 7, -1, -7, i64::MAX, i64::MIN] {
            let headroom = delta_headroom(delta);
            for current in [i64::MIN, i64::MIN + 7, -1, 0, 5, i64::MAX - 7, i64::MAX] {
                assert_eq!(
                    headroom.contains(&current),
                    current.checked_add(delta).is_some(),
                    "current {current}, delta {delta}"
                );
            }
        }
    }
}
