//! # Repository Module
//!
//! Row-level access to the three Stockroom tables.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                                │
//! │       │  db.products().lookup(10)                                       │
//! │       ▼                                                                 │
//! │  ProductRepository ── products                                          │
//! │  OrderRepository   ── order_lines (reads; writes via OrderProcessor)    │
//! │  UserRepository    ── users                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalog
//! - [`OrderRepository`](order::OrderRepository) - Order history
//! - [`UserRepository`](user::UserRepository) - Login accounts

pub mod order;
pub mod product;
pub mod user;
