//! Shared helpers for data-layer integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use invoicepro_core::{timestamp_now, Client, Draft, NewClient};
use invoicepro_data::{ApiClient, ApiSettings, ConnectivityManager, DatabaseService, StorageMode};
use invoicepro_store::{LocalStore, StoreConfig};

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A URL nothing is listening on.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// API settings with millisecond backoff so retries do not slow tests down.
pub fn fast_settings(base_url: &str) -> ApiSettings {
    ApiSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        max_attempts: 3,
        initial_backoff_ms: 1,
    }
}

pub async fn service(base_url: &str, mode: StorageMode) -> DatabaseService {
    let store = LocalStore::open(StoreConfig::in_memory()).await.unwrap();
    let api = ApiClient::new(&fast_settings(base_url)).unwrap();
    DatabaseService::from_parts(ConnectivityManager::new(api, mode), store)
}

/// Request counter shared with stub handlers.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn sample_client(name: &str) -> Client {
    NewClient::new(name, "owner@example.com").materialize(timestamp_now())
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}
