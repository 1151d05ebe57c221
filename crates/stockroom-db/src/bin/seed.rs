//! # Seed Data Generator
//!
//! Provisions login accounts and sample clothing products for development.
//!
//! ## Usage
//! ```bash
//! # Users plus 50 products (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom amount and passwords
//! cargo run -p stockroom-db --bin seed -- --count 200 --admin-password s3cret
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! ## Generated Data
//! - `admin` (Administrator) and `employee` (Normal Employee)
//! - Products with ids 1..=count: `{type}` garments, prices 4.99 - 81.99,
//!   stock 0 - 30. Skipped when the table already has rows.

use anyhow::Context;
use std::env;
use stockroom_core::{Product, Role, User};
use stockroom_db::{hash_password, Database, DbConfig};

/// Garment types and base prices in cents
const PRODUCT_TYPES: &[(&str, i64)] = &[
    ("t-shirt", 499),
    ("shirt", 1999),
    ("jeans", 3999),
    ("chinos", 3499),
    ("hoodie", 2999),
    ("jacket", 5999),
    ("coat", 7999),
    ("dress", 3999),
    ("skirt", 2499),
    ("socks", 499),
    ("scarf", 1299),
    ("cap", 999),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: i64 = 50;
    let mut db_path = String::from("./stockroom_dev.db");
    let mut admin_password = String::from("admin");
    let mut employee_password = String::from("employee");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--employee-password" => {
                if i + 1 < args.len() {
                    employee_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>                Number of products (default: 50)");
                println!("  -d, --db <PATH>                Database file (default: ./stockroom_dev.db)");
                println!("      --admin-password <PW>      Password for user 'admin' (default: admin)");
                println!("      --employee-password <PW>   Password for user 'employee' (default: employee)");
                println!("  -h, --help                     Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    for (username, password, role) in [
        ("admin", admin_password.as_str(), Role::Administrator),
        ("employee", employee_password.as_str(), Role::NormalEmployee),
    ] {
        let user = User {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role,
        };
        db.users().upsert(&user).await?;
        println!("✓ User '{}' ({})", username, role);
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping product seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for id in 1..=count {
        let product = generate_product(id);
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.id, e);
            continue;
        }
        generated += 1;
    }

    println!("✓ Generated {} products", generated);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates one product with deterministic pseudo-random data.
fn generate_product(id: i64) -> Product {
    let (product_type, base_price) = PRODUCT_TYPES[(id as usize) % PRODUCT_TYPES.len()];

    // EAN-13 shaped barcode (checksum not valid)
    let barcode = format!("590{:010}", id);

    // 0 - 30 pieces, a few items start low
    let quantity = (id * 7) % 31;

    // Up to +2.00 in steps of 0.50 on top of the base price
    let price_cents = base_price + (id % 5) * 50;

    Product {
        id,
        barcode,
        price_cents,
        quantity,
        product_type: product_type.to_string(),
    }
}
