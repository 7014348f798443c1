//! # Entity Repositories
//!
//! One generic repository handles all four list-shaped entity kinds.
//!
//! ## Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repository Call Routing                           │
//! │                                                                         │
//! │  call ──► connectivity.is_connected()?                                 │
//! │              │ no                         │ yes                         │
//! │              ▼                            ▼                             │
//! │         LocalStore                  ApiClient (retries)                 │
//! │                                           │                             │
//! │                  ┌────────────────────────┼──────────────────────┐      │
//! │                  ▼                        ▼                      ▼      │
//! │               success            backend unavailable     application    │
//! │               return             (network, timeout,      error (4xx,    │
//! │                                   5xx, malformed)        success:false) │
//! │                                        │                      │         │
//! │                                        ▼                      ▼         │
//! │                               switch to local mode     propagate        │
//! │                               re-serve from store      (reads: fall     │
//! │                                                         back anyway)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let clients = ClientRepository::new(connectivity.clone(), store.clone());
//! let saved = clients.save(NewClient::new("John Smith", "john@techcorp.com")).await?;
//! assert!(clients.delete(&saved.id).await?);
//! ```

pub mod invoice;

use std::marker::PhantomData;
use tracing::debug;

use invoicepro_core::{timestamp_now, Client, Draft, Invoice, Payment, Product, Record};
use invoicepro_store::LocalStore;

use crate::connectivity::ConnectivityManager;
use crate::error::DataResult;

/// Repository over the records of kind `R`.
#[derive(Debug, Clone)]
pub struct Repository<R: Record> {
    connectivity: ConnectivityManager,
    store: LocalStore,
    _kind: PhantomData<fn() -> R>,
}

pub type ClientRepository = Repository<Client>;
pub type ProductRepository = Repository<Product>;
pub type InvoiceRepository = Repository<Invoice>;
pub type PaymentRepository = Repository<Payment>;

impl<R: Record> Repository<R> {
    pub fn new(connectivity: ConnectivityManager, store: LocalStore) -> Self {
        Repository {
            connectivity,
            store,
            _kind: PhantomData,
        }
    }

    fn collection_path() -> String {
        format!("/api/{}", R::KIND.collection())
    }

    fn record_path(id: &str) -> String {
        format!("/api/{}/{}", R::KIND.collection(), id)
    }

    /// Every record of this kind. Never fails.
    ///
    /// In remote mode any error, including an application error, moves
    /// the session to local mode and the list is served from the store.
    pub async fn get_all(&self) -> Vec<R> {
        if self.connectivity.is_connected() {
            match self.connectivity.api().get::<Vec<R>>(&Self::collection_path()).await {
                Ok(records) => return records,
                Err(e) => self.connectivity.record_failure("get_all", &e),
            }
        }

        let records = self.store.read_all::<R>().await;
        debug!(collection = R::KIND.collection(), count = records.len(), "Served from local store");
        records
    }

    /// The record with `id`, if any.
    pub async fn get(&self, id: &str) -> Option<R> {
        self.get_all().await.into_iter().find(|r| r.id() == id)
    }

    /// Inserts or replaces a record and returns the persisted version.
    ///
    /// A draft without an id gets a generated one. Saving an existing id
    /// keeps its original `createdAt`.
    pub async fn save<D>(&self, draft: D) -> DataResult<R>
    where
        D: Draft<Record = R>,
    {
        let record = draft.materialize(timestamp_now());

        if self.connectivity.is_connected() {
            match self.connectivity.api().post::<R, R>(&Self::collection_path(), &record).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_backend_unavailable() => self.connectivity.record_failure("save", &e),
                Err(e) => return Err(e),
            }
        }

        Ok(self.store.upsert(record).await?)
    }

    /// Deletes the record with `id`. Returns false when it did not exist.
    pub async fn delete(&self, id: &str) -> DataResult<bool> {
        if self.connectivity.is_connected() {
            match self.connectivity.api().delete::<bool>(&Self::record_path(id)).await {
                Ok(deleted) => return Ok(deleted),
                Err(e) if e.is_not_found() => return Ok(false),
                Err(e) if e.is_backend_unavailable() => self.connectivity.record_failure("delete", &e),
                Err(e) => return Err(e),
            }
        }

        Ok(self.store.remove::<R>(id).await?)
    }
}
