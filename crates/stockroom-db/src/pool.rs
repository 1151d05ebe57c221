//! # Database Handle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database (Clone)                                                       │
//! │   ├── SqlitePool ─────────────┬── products()        ProductRepository  │
//! │   │   WAL, busy timeout       ├── orders()          OrderRepository    │
//! │   │                           ├── users()           UserRepository     │
//! │   │                           └── ledger()          StockLedger        │
//! │   └── Arc<Mutex<OrderId>> ────── order_processor()  OrderProcessor     │
//! │       last id handed out                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories are created per call and hold a pool clone. Every
//! processor built from one `Database` shares the same allocator, so the
//! web app must build all of them from a single handle.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use stockroom_core::OrderId;

use crate::error::{DbError, DbResult};
use crate::inventory::ledger::StockLedger;
use crate::inventory::orders::OrderProcessor;
use crate::migrations;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// SQLite file, created on first connect.
    File(PathBuf),
    /// Private in-memory database, gone when the pool closes.
    Memory,
}

/// Connection settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/stockroom/stockroom.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: Location,

    /// Default: 5
    pub max_connections: u32,

    /// How long a request waits for a free connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// How long a statement waits on a locked database. Default: 5 seconds
    pub busy_timeout: Duration,

    /// Apply pending migrations on connect. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: Location::File(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Isolated in-memory database on a single connection, for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            location: Location::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new("")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            Location::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::Connect(e.to_string()))?,
        };

        Ok(options.busy_timeout(self.busy_timeout))
    }

    fn describe(&self) -> String {
        match &self.location {
            Location::File(path) => path.display().to_string(),
            Location::Memory => ":memory:".to_string(),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared database handle. Cloning shares the pool and the order id
/// allocator.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,

    /// Last order id handed out by this process (0 before the first order).
    order_ids: Arc<Mutex<OrderId>>,
}

impl Database {
    /// Opens the pool and, unless disabled, migrates the schema.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(database = %config.describe(), "Opening database");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        if config.location == Location::Memory {
            // the data lives only as long as the connection
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::Connect(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool ready");

        let db = Database {
            pool,
            order_ids: Arc::new(Mutex::new(0)),
        };

        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Order history reads. Lines are written only by the processor.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn ledger(&self) -> StockLedger {
        StockLedger::new(self.pool.clone())
    }

    /// Order processor sharing this handle's id allocator.
    pub fn order_processor(&self) -> OrderProcessor {
        OrderProcessor::new(self.pool.clone(), Arc::clone(&self.order_ids))
    }

    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// Whether a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
