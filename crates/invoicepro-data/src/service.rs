//! # Database Service
//!
//! Composition root: one connectivity manager and one local store, shared
//! by every repository it hands out.
//!
//! ## Startup
//! ```text
//! DataConfig::load(None)
//!      │
//!      ▼
//! DatabaseService::open(config)
//!      ├── validate config
//!      ├── open LocalStore (+ migrations)
//!      ├── seed sample data (if enabled)
//!      ├── build ApiClient
//!      └── mode = auto?    ──► connect()  (remote or local)
//!          mode = offline? ──► stay local, no request
//! ```

use tracing::info;

use invoicepro_store::{seed_sample_data, LocalStore, SettingsStore, StoreConfig};

use crate::api::ApiClient;
use crate::config::DataConfig;
use crate::connectivity::{ConnectivityManager, StorageMode};
use crate::dashboard::DashboardAggregator;
use crate::error::{DataError, DataResult};
use crate::repository::{ClientRepository, InvoiceRepository, PaymentRepository, ProductRepository};

/// Handle bundling every data-layer component.
#[derive(Debug, Clone)]
pub struct DatabaseService {
    connectivity: ConnectivityManager,
    store: LocalStore,
    clients: ClientRepository,
    products: ProductRepository,
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    dashboard: DashboardAggregator,
}

impl DatabaseService {
    /// Opens the local store, then performs the initial handshake unless
    /// the configuration forces offline mode.
    pub async fn open(config: DataConfig) -> DataResult<Self> {
        config.validate()?;

        let path = &config.storage.database_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataError::InvalidConfig(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let store = LocalStore::open(StoreConfig::new(path).namespace(&config.storage.namespace)).await?;
        if config.storage.seed_sample_data {
            seed_sample_data(&store).await?;
        }

        let api = ApiClient::new(&config.api)?;
        let initial = if config.mode.is_offline() {
            StorageMode::Local
        } else {
            StorageMode::Remote
        };
        let service = Self::from_parts(ConnectivityManager::new(api, initial), store);

        if !config.mode.is_offline() {
            service.connectivity.connect().await;
        }
        info!(mode = %service.connectivity.storage_mode(), "Data layer ready");

        Ok(service)
    }

    /// Wires repositories around an existing manager and store. No I/O.
    pub fn from_parts(connectivity: ConnectivityManager, store: LocalStore) -> Self {
        DatabaseService {
            clients: ClientRepository::new(connectivity.clone(), store.clone()),
            products: ProductRepository::new(connectivity.clone(), store.clone()),
            invoices: InvoiceRepository::new(connectivity.clone(), store.clone()),
            payments: PaymentRepository::new(connectivity.clone(), store.clone()),
            dashboard: DashboardAggregator::new(connectivity.clone(), store.clone()),
            connectivity,
            store,
        }
    }

    pub fn connectivity(&self) -> &ConnectivityManager {
        &self.connectivity
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn clients(&self) -> &ClientRepository {
        &self.clients
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn invoices(&self) -> &InvoiceRepository {
        &self.invoices
    }

    pub fn payments(&self) -> &PaymentRepository {
        &self.payments
    }

    pub fn dashboard(&self) -> &DashboardAggregator {
        &self.dashboard
    }

    /// Settings live in the local store regardless of mode.
    pub fn settings(&self) -> SettingsStore {
        self.store.settings()
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartupMode;
    use std::path::PathBuf;

    fn offline_config() -> DataConfig {
        let mut config = DataConfig {
            mode: StartupMode::Offline,
            ..Default::default()
        };
        config.storage.database_path = PathBuf::from(":memory:");
        config
    }

    #[tokio::test]
    async fn test_offline_open_seeds_and_stays_local() {
        let service = DatabaseService::open(offline_config()).await.unwrap();
        assert!(!service.is_connected());
        assert_eq!(service.clients().get_all().await.len(), 2);
        assert_eq!(service.invoices().get_all().await.len(), 2);
        assert!(service.payments().get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let mut config = offline_config();
        config.storage.seed_sample_data = false;
        let service = DatabaseService::open(config).await.unwrap();
        assert!(service.products().get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = offline_config();
        config.api.base_url = "ftp://files".into();
        let err = DatabaseService::open(config).await.unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_file_store_in_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config();
        config.storage.database_path = dir.path().join("nested/data/local.db");

        let service = DatabaseService::open(config).await.unwrap();
        assert!(service.store().health_check().await);
    }
}
