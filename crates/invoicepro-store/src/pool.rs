//! # Local Store Handle
//!
//! Connection pool setup and the raw namespaced key/value operations.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Local Store                                     │
//! │                                                                         │
//! │  StoreConfig::new(path).namespace("invoicepro_")                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LocalStore::open(config).await ← pool + migrations                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ local_storage                            │                           │
//! │  │ ─────────────────────────────────────── │                           │
//! │  │ invoicepro_clients   │ [{…},{…}]         │                           │
//! │  │ invoicepro_products  │ [{…}]             │                           │
//! │  │ invoicepro_invoices  │ [{…},{…},{…}]     │                           │
//! │  │ invoicepro_payments  │ []                │                           │
//! │  │ invoicepro_settings  │ {…}               │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  Writes: read whole value → modify → write whole value, holding        │
//! │  `write_lock` for the full cycle so two saves in this process can      │
//! │  never lose each other's record.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use invoicepro_core::DEFAULT_NAMESPACE;

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::settings::SettingsStore;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Local store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("./invoicepro.db")
///     .namespace("invoicepro_")
///     .max_connections(4);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Prefix of every storage key.
    /// Default: `invoicepro_`
    pub namespace: String,

    /// Maximum number of pooled connections.
    /// Default: 4
    pub max_connections: u32,

    /// Connection timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations on open.
    /// Default: true
    pub run_migrations: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_connections: 4,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Creates an in-memory store configuration (for testing).
    ///
    /// The database lives as long as the pool's single connection.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            ..StoreConfig::new(IN_MEMORY)
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

// =============================================================================
// LocalStore
// =============================================================================

/// Handle to the persisted key/value store.
///
/// Cheap to clone; clones share the pool and the write lock.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    namespace: String,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Opens (creating if needed) the store and applies migrations.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        if config.namespace.is_empty() {
            return Err(StoreError::ConnectionFailed(
                "namespace must not be empty".to_string(),
            ));
        }

        info!(
            path = %config.database_path.display(),
            namespace = %config.namespace,
            "Opening local store"
        );

        let (connect_options, pool_options) = if config.is_in_memory() {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
            // The in-memory database is dropped with its last connection.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool)
        } else {
            let options = SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(1);
            (options, pool)
        };

        let pool = pool_options
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Store pool created");

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        Ok(LocalStore {
            pool,
            namespace: config.namespace,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Full storage key for a logical name, e.g. `clients` → `invoicepro_clients`.
    pub fn storage_key(&self, name: &str) -> String {
        format!("{}{}", self.namespace, name)
    }

    /// Settings document accessor.
    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(self.clone())
    }

    /// Raw JSON text stored under `name`, if any.
    pub async fn get_item(&self, name: &str) -> StoreResult<Option<String>> {
        let key = self.storage_key(name);
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?")
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Replaces the value under `name`.
    pub async fn set_item(&self, name: &str, value: &str) -> StoreResult<()> {
        let key = self.storage_key(name);
        debug!(key = %key, bytes = value.len(), "Writing store item");
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the value under `name`. Returns whether a value existed.
    pub async fn remove_item(&self, name: &str) -> StoreResult<bool> {
        let key = self.storage_key(name);
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(&key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Logical names present under this store's namespace, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|key| key.strip_prefix(&self.namespace).map(str::to_string))
            .collect())
    }

    /// Takes the process-wide write lock for a read-modify-write cycle.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        info!("Closing local store");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);
        assert_eq!(store.storage_key("clients"), "invoicepro_clients");
    }

    #[tokio::test]
    async fn test_item_round_trip_and_remove() {
        let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();

        assert_eq!(store.get_item("clients").await.unwrap(), None);
        store.set_item("clients", "[]").await.unwrap();
        store.set_item("clients", "[1]").await.unwrap();
        assert_eq!(store.get_item("clients").await.unwrap().as_deref(), Some("[1]"));

        assert!(store.remove_item("clients").await.unwrap());
        assert!(!store.remove_item("clients").await.unwrap());
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let a = LocalStore::open(StoreConfig::new(&path).namespace("a_")).await.unwrap();
        let b = LocalStore::open(StoreConfig::new(&path).namespace("b_")).await.unwrap();

        a.set_item("clients", "[\"a\"]").await.unwrap();
        assert_eq!(b.get_item("clients").await.unwrap(), None);
        assert_eq!(a.keys().await.unwrap(), vec!["clients".to_string()]);
        assert!(b.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.db");

        let store = LocalStore::open(StoreConfig::new(&path)).await.unwrap();
        store.set_item("settings", "{}").await.unwrap();
        store.close().await;

        let reopened = LocalStore::open(StoreConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.get_item("settings").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_empty_namespace_rejected() {
        let result = LocalStore::open(StoreConfig::in_memory().namespace("")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/test.db").max_connections(8).namespace("x_");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.namespace, "x_");
        assert!(StoreConfig::in_memory().is_in_memory());
    }
}
