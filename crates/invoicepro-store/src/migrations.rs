//! # Store Migrations
//!
//! Embedded SQL migrations for the local key/value table.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Embedded migrations from the workspace `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{LocalStore, StoreConfig};

    #[tokio::test]
    async fn test_status_after_migrations() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        let (total, applied) = migration_status(store.pool()).await.unwrap();
        assert!(total > 0);
        assert_eq!(applied, total);
    }

    #[tokio::test]
    async fn test_status_without_history_table_is_an_error() {
        let store = LocalStore::open(StoreConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        assert!(migration_status(store.pool()).await.is_err());

        run_migrations(store.pool()).await.unwrap();
        let (total, applied) = migration_status(store.pool()).await.unwrap();
        assert_eq!(applied, total);
    }
}
