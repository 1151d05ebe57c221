//! Server-rendered pages.
//!
//! askama templates under `templates/`, all extending `base.html`. Values
//! are HTML-escaped by the template engine; only compile-time paths are
//! marked `safe`.

use askama::Template;
use axum::response::Html;

use stockroom_core::{order_total, Money, OrderId, OrderLineDetail, Product, Role};

use crate::auth::CurrentUser;
use crate::error::ApiError;

/// Number of numbered line rows on the order form.
pub const ORDER_FORM_ROWS: usize = 5;

/// A rendered page, or the template failure.
pub type Page = Result<Html<String>, ApiError>;

fn render(template: &impl Template) -> Page {
    Ok(Html(template.render()?))
}

/// One labelled form input.
struct Field {
    name: &'static str,
    label: &'static str,
    kind: &'static str,
}

const fn field(name: &'static str, label: &'static str, kind: &'static str) -> Field {
    Field { name, label, kind }
}

const ID_FIELD: Field = field("id", "Product id", "number");
const QUANTITY_FIELD: Field = field("quantity", "Quantity", "number");

struct MenuLink {
    href: &'static str,
    label: &'static str,
}

const fn link(href: &'static str, label: &'static str) -> MenuLink {
    MenuLink { href, label }
}

fn menu(role: Role) -> &'static [MenuLink] {
    const EMPLOYEE: &[MenuLink] = &[
        link("/add", "Add quantity"),
        link("/delete", "Delete quantity"),
        link("/check", "Check quantity"),
        link("/show", "Show order"),
    ];
    const ADMIN: &[MenuLink] = &[
        link("/add", "Add quantity"),
        link("/delete", "Delete quantity"),
        link("/check", "Check quantity"),
        link("/show", "Show order"),
        link("/insert", "Insert product"),
        link("/remove", "Remove product"),
        link("/orders", "Place order"),
    ];
    match role {
        Role::Administrator => ADMIN,
        Role::NormalEmployee => EMPLOYEE,
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "form.html")]
struct FormPage<'a> {
    title: &'a str,
    user: Option<&'a CurrentUser>,
    message: &'a str,
    action: &'static str,
    fields: &'a [Field],
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    title: &'a str,
    user: Option<&'a CurrentUser>,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomePage<'a> {
    title: &'a str,
    user: Option<&'a CurrentUser>,
    message: &'a str,
    menu: &'static [MenuLink],
    products: &'a [Product],
}

#[derive(Template)]
#[template(path = "orders.html")]
struct OrdersPage<'a> {
    title: &'a str,
    user: Option<&'a CurrentUser>,
    message: &'a str,
    rows: Vec<usize>,
}

#[derive(Template)]
#[template(path = "show.html")]
struct ShowPage<'a> {
    title: &'a str,
    user: Option<&'a CurrentUser>,
    message: &'a str,
    order: Option<OrderView>,
}

struct OrderView {
    order_id: OrderId,
    rows: Vec<OrderRow>,
    total: String,
}

/// One history row, formatted for display.
struct OrderRow {
    product_id: i64,
    barcode: String,
    price: String,
    quantity: i64,
    product_type: String,
    total: String,
}

/// Shown instead of a total that does not fit in 64 bits.
const TOTAL_OUT_OF_RANGE: &str = "out of range";

impl OrderRow {
    fn new(line: &OrderLineDetail) -> Self {
        if line.is_removed() {
            return OrderRow {
                product_id: line.product_id,
                barcode: "(removed)".to_string(),
                price: String::new(),
                quantity: line.quantity,
                product_type: String::new(),
                total: String::new(),
            };
        }

        OrderRow {
            product_id: line.product_id,
            barcode: line.barcode.clone().unwrap_or_default(),
            price: line
                .price_cents
                .map(|cents| Money::from_cents(cents).to_string())
                .unwrap_or_default(),
            quantity: line.quantity,
            product_type: line.product_type.clone().unwrap_or_default(),
            total: line
                .line_total()
                .map_or_else(|| TOTAL_OUT_OF_RANGE.to_string(), |total| total.to_string()),
        }
    }
}

fn form_page(
    user: &CurrentUser,
    title: &str,
    action: &'static str,
    fields: &[Field],
    message: &str,
) -> Page {
    render(&FormPage {
        title,
        user: Some(user),
        message,
        action,
        fields,
    })
}

// =============================================================================
// Session pages
// =============================================================================

pub fn login_page(message: &str) -> Page {
    render(&LoginPage {
        title: "Log in",
        user: None,
        message,
    })
}

pub fn home_page(user: &CurrentUser, products: &[Product]) -> Page {
    render(&HomePage {
        title: "Home",
        user: Some(user),
        message: "",
        menu: menu(user.role),
        products,
    })
}

// =============================================================================
// Stock pages
// =============================================================================

pub fn add_page(user: &CurrentUser, message: &str) -> Page {
    form_page(user, "Add quantity", "/add", &[ID_FIELD, QUANTITY_FIELD], message)
}

pub fn delete_page(user: &CurrentUser, message: &str) -> Page {
    form_page(user, "Delete quantity", "/delete", &[ID_FIELD, QUANTITY_FIELD], message)
}

pub fn check_page(user: &CurrentUser, message: &str) -> Page {
    form_page(user, "Check quantity", "/check", &[ID_FIELD], message)
}

// =============================================================================
// Catalog pages
// =============================================================================

pub fn insert_page(user: &CurrentUser, message: &str) -> Page {
    form_page(
        user,
        "Insert product",
        "/insert",
        &[
            ID_FIELD,
            field("barcode", "Barcode", "text"),
            field("price", "Price", "text"),
            QUANTITY_FIELD,
            field("type", "Type", "text"),
        ],
        message,
    )
}

pub fn remove_page(user: &CurrentUser, message: &str) -> Page {
    form_page(user, "Remove product", "/remove", &[ID_FIELD], message)
}

// =============================================================================
// Order pages
// =============================================================================

pub fn orders_page(user: &CurrentUser, message: &str) -> Page {
    render(&OrdersPage {
        title: "Place order",
        user: Some(user),
        message,
        rows: (1..=ORDER_FORM_ROWS).collect(),
    })
}

/// Order lookup form, plus the order's lines when one was requested.
pub fn show_page(
    user: &CurrentUser,
    order: Option<(OrderId, &[OrderLineDetail])>,
    message: &str,
) -> Page {
    let order = order.map(|(order_id, lines)| OrderView {
        order_id,
        rows: lines.iter().map(OrderRow::new).collect(),
        total: order_total(lines)
            .map_or_else(|| TOTAL_OUT_OF_RANGE.to_string(), |total| total.to_string()),
    });

    render(&ShowPage {
        title: "Show order",
        user: Some(user),
        message,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> CurrentUser {
        CurrentUser {
            username: "admin".to_string(),
            role: Role::Administrator,
        }
    }

    fn detail(product_id: i64, quantity: i64, price_cents: Option<i64>) -> OrderLineDetail {
        OrderLineDetail {
            order_id: 7,
            product_id,
            quantity,
            barcode: price_cents.map(|_| format!("B{product_id}")),
            price_cents,
            product_type: price_cents.map(|_| "shirt".to_string()),
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let user = CurrentUser {
            username: "<script>".to_string(),
            role: Role::NormalEmployee,
        };
        let page = check_page(&user, "Tom & \"Jerry\"").unwrap().0;

        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("Tom &amp; &quot;Jerry&quot;"));
        assert!(page.contains(r#"action="/check""#));
    }

    #[test]
    fn test_home_menu_by_role() {
        let products = vec![Product {
            id: 1,
            barcode: "<b>".to_string(),
            price_cents: 1250,
            quantity: 3,
            product_type: "shirt".to_string(),
        }];

        let admin_page = home_page(&admin(), &products).unwrap().0;
        assert!(admin_page.contains(r#"href="/orders""#));
        assert!(admin_page.contains("12.50"));
        assert!(admin_page.contains("&lt;b&gt;"));

        let employee = CurrentUser {
            username: "employee".to_string(),
            role: Role::NormalEmployee,
        };
        let employee_page = home_page(&employee, &products).unwrap().0;
        assert!(!employee_page.contains(r#"href="/orders""#));
        assert!(employee_page.contains(r#"href="/check""#));
    }

    #[test]
    fn test_login_page_has_no_nav() {
        let page = login_page("Logged Out").unwrap().0;
        assert!(page.contains(r#"name="password""#));
        assert!(page.contains("Logged Out"));
        assert!(!page.contains("Log out"));
    }

    #[test]
    fn test_show_page_totals_and_removed_products() {
        let lines = vec![detail(10, 2, Some(1999)), detail(42, 1, None)];

        let page = show_page(&admin(), Some((7, lines.as_slice())), "").unwrap().0;
        assert!(page.contains("Order 7"));
        assert!(page.contains("39.98"));
        assert!(page.contains("(removed)"));
        assert!(page.contains("Order total: 39.98"));
    }

    #[test]
    fn test_show_page_total_out_of_range() {
        let lines = vec![detail(10, 2, Some(i64::MAX))];

        let page = show_page(&admin(), Some((7, lines.as_slice())), "").unwrap().0;
        assert!(page.contains(&format!("Order total: {TOTAL_OUT_OF_RANGE}")));
    }

    #[test]
    fn test_show_page_empty_order() {
        let lines: Vec<OrderLineDetail> = Vec::new();
        let page = show_page(&admin(), Some((3, lines.as_slice())), "").unwrap().0;
        assert!(page.contains("No lines for this order."));
        assert!(!page.contains("Order total"));
    }

    #[test]
    fn test_orders_form_has_numbered_fields() {
        let page = orders_page(&admin(), "").unwrap().0;
        assert!(page.contains(r#"name="id1""#));
        assert!(page.contains(&format!(r#"name="quantity{ORDER_FORM_ROWS}""#)));
    }
}
