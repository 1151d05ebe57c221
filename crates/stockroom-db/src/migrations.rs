//! Schema migrations, embedded at compile time from `migrations/sqlite/`.
//!
//! Files are `NNN_description.sql` and are append-only: a change to an
//! applied file fails its checksum on the next start.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(
        embedded = MIGRATOR.migrations.len(),
        "Schema up to date"
    );
    Ok(())
}

/// Versions recorded as applied, oldest first.
pub async fn applied_versions(pool: &SqlitePool) -> DbResult<Vec<i64>> {
    let versions: Vec<i64> = sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success = 1 ORDER BY version",
    )
    .fetch_all(pool)
    .await?;

    Ok(versions)
}

/// Versions embedded in this build that are not yet applied.
pub async fn pending_versions(pool: &SqlitePool) -> DbResult<Vec<i64>> {
    let applied = applied_versions(pool).await?;
    Ok(MIGRATOR
        .iter()
        .map(|m| m.version)
        .filter(|v| !applied.contains(v))
        .collect())
}
