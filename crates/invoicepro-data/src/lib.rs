//! # invoicepro-data: Remote/Local Routing Layer for InvoicePro
//!
//! Every read and write goes either to the REST API or to the local store.
//! When the API stops answering, the whole session moves to local storage
//! until an explicit reconnect.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        invoicepro-data                                  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     DatabaseService                              │  │
//! │  │                                                                  │  │
//! │  │  clients() products() invoices() payments()   dashboard()        │  │
//! │  │       │        │          │          │             │             │  │
//! │  │       └────────┴────┬─────┴──────────┘             │             │  │
//! │  │                     ▼                              ▼             │  │
//! │  │              Repository<R>                DashboardAggregator     │  │
//! │  │                     │                              │             │  │
//! │  │          ┌──────────┴───────────┐                  │             │  │
//! │  │          ▼                      ▼                  │             │  │
//! │  │   ConnectivityManager ◄─────────┼──────────────────┘             │  │
//! │  │   (mode: remote|local)          │                                │  │
//! │  │          │                      │                                │  │
//! │  │          ▼                      ▼                                │  │
//! │  │     ApiClient              LocalStore                            │  │
//! │  │  (reqwest, retries)     (invoicepro-store)                       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`api`] - HTTP request helper: envelope unwrapping, retry with backoff
//! - [`connectivity`] - Storage mode, handshake, connection info
//! - [`repository`] - Generic entity repository and invoice updates
//! - [`dashboard`] - Stats and the dashboard snapshot
//! - [`service`] - `DatabaseService` composition root
//! - [`config`] - `DataConfig` (TOML + environment)
//! - [`error`] - `DataError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use invoicepro_data::{DataConfig, DatabaseService};
//!
//! let service = DatabaseService::open(DataConfig::load(None)?).await?;
//! let invoices = service.invoices().get_all().await;
//! if !service.is_connected() {
//!     // show the "working offline" banner
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod connectivity;
pub mod dashboard;
pub mod error;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{ApiClient, ApiResponse, RetryPolicy};
pub use config::{ApiSettings, DataConfig, StartupMode, StorageSettings};
pub use connectivity::{ConnectionInfo, ConnectivityManager, StorageMode};
pub use dashboard::{DashboardAggregator, DashboardSnapshot};
pub use error::{DataError, DataResult};
pub use repository::{ClientRepository, InvoiceRepository, PaymentRepository, ProductRepository, Repository};
pub use service::DatabaseService;
