//! # InvoicePro API Server
//!
//! REST backend for the remote mode of `invoicepro-data`.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Server                                      │
//! │                                                                         │
//! │  invoicepro-data ──► HTTP (3001) ──► routes ──► LocalStore (SQLite)    │
//! │  (ApiClient)                            │                               │
//! │                                         ▼                               │
//! │                              invoicepro-core::stats                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response uses the same envelope as the client expects:
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 3001)
//! - `INVOICEPRO_SERVER_DB` - SQLite file (default: invoicepro-server.db)
//! - `DB_NAME` - Database name reported to clients (default: invoicepro)
//! - `INVOICEPRO_SERVER_NAMESPACE` - Key namespace (default: invoicepro_)
//! - `INVOICEPRO_SERVER_SEED` - Seed sample collections on start (default: false)

pub mod config;
pub mod error;
pub mod routes;

use invoicepro_store::{seed_sample_data, LocalStore, StoreConfig, StoreResult};
use tracing::info;

// Re-exports
pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: LocalStore,
    pub database_name: String,
}

impl AppState {
    pub fn new(store: LocalStore, database_name: impl Into<String>) -> Self {
        AppState {
            store,
            database_name: database_name.into(),
        }
    }

    /// Opens the server database described by `config`.
    pub async fn open(config: &ServerConfig) -> StoreResult<Self> {
        let store = LocalStore::open(
            StoreConfig::new(&config.database_path).namespace(&config.namespace),
        )
        .await?;

        if config.seed_sample_data {
            let report = seed_sample_data(&store).await?;
            if !report.is_empty() {
                info!(collections = ?report.seeded, "Seeded sample data");
            }
        }

        Ok(AppState::new(store, &config.database_name))
    }
}
