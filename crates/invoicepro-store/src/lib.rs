//! # invoicepro-store: Persisted Local Store for InvoicePro
//!
//! The local backend of the data layer. Every entity kind is one JSON array
//! under a namespaced key; settings are one JSON object.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      InvoicePro Data Flow                               │
//! │                                                                         │
//! │  invoicepro-data repository (local mode or fallback)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 invoicepro-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  LocalStore   │    │  Collections  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ read_all      │    │  (embedded)  │  │   │
//! │  │   │ get/set/remove│    │ upsert/modify │    │ 001_local_   │  │   │
//! │  │   │ write lock    │    │ remove        │    │  storage.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           ▲                                                     │   │
//! │  │   ┌───────┴───────┐    ┌───────────────┐                       │   │
//! │  │   │ SettingsStore │    │  seed (demo)  │                       │   │
//! │  │   └───────────────┘    └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file: local_storage(key, value, updated_at)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use invoicepro_store::{LocalStore, StoreConfig};
//!
//! let store = LocalStore::open(StoreConfig::new("invoicepro.db")).await?;
//! let clients: Vec<Client> = store.read_all().await;
//! let saved = store.upsert(new_client.materialize(timestamp_now())).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod seed;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{LocalStore, StoreConfig};
pub use seed::{seed_sample_data, SeedReport};
pub use settings::SettingsStore;
