//! # Money Module
//!
//! Prices are stored as integer cents. Floating point never touches a price.
//!
//! ## Form Input Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Price Field Handling                              │
//! │                                                                         │
//! │   Form field "price"        Money::parse           products.price_cents│
//! │   ──────────────────        ────────────           ────────────────────│
//! │   "12.5"           ───────►  Money(1250)  ───────►  1250               │
//! │   "12"             ───────►  Money(1200)  ───────►  1200               │
//! │   ""               ───────►  Required                                  │
//! │   "12.505"         ───────►  InvalidFormat (more than 2 decimals)      │
//! │   "-3"             ───────►  MustNotBeNegative                         │
//! │   "2000000"        ───────►  InvalidFormat (above Money::MAX_PRICE)    │
//! │                                                                         │
//! │   Display: Money(1250) ──► "12.50"                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Highest unit price a form may set: 1 000 000.00.
    pub const MAX_PRICE: Money = Money(100_000_000);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Cents within the unit, always 0..=99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// `self * qty`, or `None` on overflow.
    #[inline]
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Parses a price as typed into a form: digits, optionally followed by a
    /// dot and at most two fractional digits.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::parse("price", "12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse("price", " 7 ").unwrap().cents(), 700);
    /// assert!(Money::parse("price", "").is_err());
    /// assert!(Money::parse("price", "1.999").is_err());
    /// assert!(Money::parse("price", "1000000.01").is_err());
    /// ```
    pub fn parse(field: &str, input: &str) -> Result<Money, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::required(field));
        }
        if input.starts_with('-') {
            return Err(ValidationError::MustNotBeNegative {
                field: field.to_string(),
            });
        }

        let (whole, fraction) = match input.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (input, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(ValidationError::invalid_format(field, "not a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(field, "not a number"));
        }
        if fraction.len() > 2 {
            return Err(ValidationError::invalid_format(
                field,
                "at most 2 decimal places",
            ));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ValidationError::invalid_format(field, "too large"))?
        };
        // "5" means 50 cents, "05" means 5 cents
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Money)
            .filter(|price| *price <= Money::MAX_PRICE)
            .ok_or_else(|| {
                ValidationError::invalid_format(field, format!("at most {}", Money::MAX_PRICE))
            })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimal places, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
