//! # Validation Module
//!
//! Turns raw form strings into typed arguments before any storage call.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/web)                                     │
//! │  ├── Form / JSON deserialization into strings and numbers              │
//! │  └── THIS MODULE: required fields, integer parsing, price format       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Stock ledger / order processor (stockroom-db)                │
//! │  └── Sufficiency against the stored quantity                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── PRIMARY KEY (duplicate product id)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{parse_product_id, parse_positive_quantity};
//!
//! assert_eq!(parse_product_id("id", "10").unwrap(), 10);
//! assert!(parse_positive_quantity("quantity", "0").is_err());
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{LineItem, OrderId, Product, ProductId};
use crate::MAX_ORDER_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_BARCODE_LEN: usize = 64;
const MAX_PRODUCT_TYPE_LEN: usize = 50;

// =============================================================================
// Field Parsers
// =============================================================================

/// Trims `input` and fails with `Required` when nothing is left.
pub fn require<'a>(field: &str, input: &'a str) -> ValidationResult<&'a str> {
    let input = input.trim();
    if input.is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(input)
    }
}

fn parse_integer(field: &str, input: &str) -> ValidationResult<i64> {
    require(field, input)?
        .parse::<i64>()
        .map_err(|_| ValidationError::invalid_format(field, "must be an integer"))
}

/// Parses a product id (any integer).
pub fn parse_product_id(field: &str, input: &str) -> ValidationResult<ProductId> {
    parse_integer(field, input)
}

/// Parses an order id for the history lookup.
pub fn parse_order_id(field: &str, input: &str) -> ValidationResult<OrderId> {
    parse_integer(field, input)
}

/// Parses a quantity that must be greater than zero (add, delete).
pub fn parse_positive_quantity(field: &str, input: &str) -> ValidationResult<i64> {
    let qty = parse_integer(field, input)?;
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(qty)
}

/// Parses a quantity that may be zero (initial stock on insert).
pub fn parse_non_negative_quantity(field: &str, input: &str) -> ValidationResult<i64> {
    let qty = parse_integer(field, input)?;
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(qty)
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be blank
/// - At most 64 characters
/// - No whitespace inside
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = require("barcode", barcode)?;

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }
    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            "barcode",
            "must not contain spaces",
        ));
    }

    Ok(barcode.to_string())
}

/// Validates the garment type label.
pub fn validate_product_type(product_type: &str) -> ValidationResult<String> {
    let product_type = require("type", product_type)?;

    if product_type.chars().count() > MAX_PRODUCT_TYPE_LEN {
        return Err(ValidationError::TooLong {
            field: "type".to_string(),
            max: MAX_PRODUCT_TYPE_LEN,
        });
    }

    Ok(product_type.to_string())
}

// =============================================================================
// Insert-Product Form
// =============================================================================

/// Raw insert-product form. Every field is mandatory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default, rename = "type")]
    pub product_type: String,
}

impl ProductForm {
    /// Validates every field, reporting the first failure in form order.
    pub fn validate(&self) -> ValidationResult<Product> {
        let id = parse_product_id("id", &self.id)?;
        let barcode = validate_barcode(&self.barcode)?;
        let price = Money::parse("price", &self.price)?;
        let quantity = parse_non_negative_quantity("quantity", &self.quantity)?;
        let product_type = validate_product_type(&self.product_type)?;

        Ok(Product {
            id,
            barcode,
            price_cents: price.cents(),
            quantity,
            product_type,
        })
    }
}

// =============================================================================
// Order Lines
// =============================================================================

/// Reads `id1`/`quantity1`, `id2`/`quantity2`, ... into an explicit list.
///
/// Reading stops at the first absent, blank or zero quantity. Fields past
/// the stop are ignored even when malformed. A line beyond
/// [`MAX_ORDER_LINES`] fails the whole form with `OutOfRange`.
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use stockroom_core::validation::line_items_from_numbered_fields;
///
/// let fields: HashMap<String, String> = [
///     ("id1", "10"), ("quantity1", "2"),
///     ("id2", ""), ("quantity2", ""),
/// ]
/// .into_iter()
/// .map(|(k, v)| (k.to_string(), v.to_string()))
/// .collect();
///
/// let lines = line_items_from_numbered_fields(&fields).unwrap();
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].product_id, 10);
/// ```
pub fn line_items_from_numbered_fields(
    fields: &HashMap<String, String>,
) -> ValidationResult<Vec<LineItem>> {
    let mut lines = Vec::new();

    for n in 1..=MAX_ORDER_LINES + 1 {
        let quantity_field = format!("quantity{n}");
        let raw_quantity = match fields.get(&quantity_field).map(|q| q.trim()) {
            Some(q) if !q.is_empty() => q,
            _ => break,
        };
        let quantity = raw_quantity
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid_format(&quantity_field, "must be an integer"))?;
        if quantity == 0 {
            break;
        }
        if n > MAX_ORDER_LINES {
            return Err(too_many_lines());
        }
        if quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: quantity_field,
            });
        }

        let id_field = format!("id{n}");
        let raw_id = fields.get(&id_field).map(String::as_str).unwrap_or("");
        let product_id = parse_product_id(&id_field, raw_id)?;

        lines.push(LineItem::new(product_id, quantity));
    }

    Ok(lines)
}

fn too_many_lines() -> ValidationError {
    ValidationError::OutOfRange {
        field: "lines".to_string(),
        min: 0,
        max: MAX_ORDER_LINES as i64,
    }
}

/// Checks an order submitted as an explicit list (JSON API).
///
/// Only lines before the first zero quantity count: the zero ends the
/// order and whatever follows it is never looked at. Within that prefix,
/// negative quantities and more than [`MAX_ORDER_LINES`] lines are
/// rejected.
pub fn validate_line_items(lines: &[LineItem]) -> ValidationResult<()> {
    let considered = lines.iter().take_while(|line| line.quantity != 0);

    for (position, line) in considered.enumerate() {
        if position >= MAX_ORDER_LINES {
            return Err(too_many_lines());
        }
        if line.quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("lines[{position}].quantity"),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_form() -> ProductForm {
        ProductForm {
            id: "20".to_string(),
            barcode: "5901234123457".to_string(),
            price: "24.90".to_string(),
            quantity: "8".to_string(),
            product_type: "jeans".to_string(),
        }
    }

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("id", " 42 ").unwrap(), 42);
        assert_eq!(
            parse_product_id("id", "").unwrap_err(),
            ValidationError::required("id")
        );
        assert!(matches!(
            parse_product_id("id", "ten"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(parse_positive_quantity("quantity", "3").unwrap(), 3);
        assert!(parse_positive_quantity("quantity", "0").is_err());
        assert!(parse_positive_quantity("quantity", "-1").is_err());

        assert_eq!(parse_non_negative_quantity("quantity", "0").unwrap(), 0);
        assert!(parse_non_negative_quantity("quantity", "-1").is_err());
    }

    #[test]
    fn test_barcode_rules() {
        assert_eq!(validate_barcode(" 12345 ").unwrap(), "12345");
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("12 345").is_err());
        assert!(validate_barcode(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_product_form_valid() {
        let product = valid_form().validate().unwrap();
        assert_eq!(product.id, 20);
        assert_eq!(product.price_cents, 2490);
        assert_eq!(product.quantity, 8);
        assert_eq!(product.product_type, "jeans");
    }

    #[test]
    fn test_product_form_blank_price_rejected() {
        let form = ProductForm {
            price: String::new(),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::required("price"));
    }

    #[test]
    fn test_product_form_blank_type_rejected() {
        let form = ProductForm {
            product_type: "  ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::required("type"));
    }

    #[test]
    fn test_numbered_fields_stop_at_zero_quantity() {
        let form = fields(&[
            ("id1", "1"),
            ("quantity1", "5"),
            ("id2", "2"),
            ("quantity2", "3"),
            ("id3", "0"),
            ("quantity3", "0"),
            ("id4", "3"),
            ("quantity4", "99"),
        ]);
        let lines = line_items_from_numbered_fields(&form).unwrap();
        assert_eq!(lines, vec![LineItem::new(1, 5), LineItem::new(2, 3)]);
    }

    #[test]
    fn test_numbered_fields_stop_at_blank_and_ignore_rest() {
        let form = fields(&[
            ("id1", "7"),
            ("quantity1", "1"),
            ("quantity2", ""),
            ("id3", "junk"),
            ("quantity3", "junk"),
        ]);
        let lines = line_items_from_numbered_fields(&form).unwrap();
        assert_eq!(lines, vec![LineItem::new(7, 1)]);
    }

    #[test]
    fn test_numbered_fields_errors() {
        let missing_id = fields(&[("quantity1", "2")]);
        assert_eq!(
            line_items_from_numbered_fields(&missing_id).unwrap_err(),
            ValidationError::required("id1")
        );

        let negative = fields(&[("id1", "1"), ("quantity1", "-2")]);
        assert!(matches!(
            line_items_from_numbered_fields(&negative),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    fn numbered_form(count: usize) -> HashMap<String, String> {
        let mut form = HashMap::new();
        for n in 1..=count {
            form.insert(format!("id{n}"), n.to_string());
            form.insert(format!("quantity{n}"), "1".to_string());
        }
        form
    }

    #[test]
    fn test_numbered_fields_accept_max_lines() {
        let lines = line_items_from_numbered_fields(&numbered_form(MAX_ORDER_LINES)).unwrap();
        assert_eq!(lines.len(), MAX_ORDER_LINES);
    }

    #[test]
    fn test_numbered_fields_reject_line_past_max() {
        let form = numbered_form(MAX_ORDER_LINES + 1);
        assert_eq!(
            line_items_from_numbered_fields(&form).unwrap_err(),
            too_many_lines()
        );

        // a zero quantity in the first slot past the cap just ends the order
        let mut form = numbered_form(MAX_ORDER_LINES);
        form.insert(format!("quantity{}", MAX_ORDER_LINES + 1), "0".to_string());
        assert_eq!(
            line_items_from_numbered_fields(&form).unwrap().len(),
            MAX_ORDER_LINES
        );
    }

    #[test]
    fn test_validate_line_items() {
        assert!(validate_line_items(&[LineItem::new(1, 2), LineItem::new(2, 0)]).is_ok());
        assert!(validate_line_items(&[LineItem::new(1, -2)]).is_err());

        let too_many = vec![LineItem::new(1, 1); MAX_ORDER_LINES + 1];
        assert_eq!(validate_line_items(&too_many).unwrap_err(), too_many_lines());
    }

    #[test]
    fn test_validate_line_items_ignores_lines_after_zero() {
        let items = [LineItem::new(10, 1), LineItem::new(0, 0), LineItem::new(3, -1)];
        assert!(validate_line_items(&items).is_ok());

        let mut long_tail = vec![LineItem::new(1, 1), LineItem::new(2, 0)];
        long_tail.extend(vec![LineItem::new(3, 1); MAX_ORDER_LINES + 1]);
        assert!(validate_line_items(&long_tail).is_ok());

        let negative_first = [LineItem::new(3, -1), LineItem::new(0, 0)];
        assert_eq!(
            validate_line_items(&negative_first).unwrap_err(),
            ValidationError::MustBePositive {
                field: "lines[0].quantity".to_string()
            }
        );
    }
}
