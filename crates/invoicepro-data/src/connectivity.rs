//! # Connectivity Manager
//!
//! Owns the session-wide storage mode and the API handshake.
//!
//! ## Mode Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storage Mode                                    │
//! │                                                                         │
//! │        ┌────────────┐   connect() ok      ┌────────────┐                │
//! │  start │  Remote    │◄────────────────────│   Local    │                │
//! │  ─────►│ (attempt)  │   reconnect() ok    │            │                │
//! │        └─────┬──────┘                     └─────▲──────┘                │
//! │              │                                  │                       │
//! │              │ connect() fails                  │                       │
//! │              │ any repository call fails        │                       │
//! │              │ switch_to_local()                │                       │
//! │              └──────────────────────────────────┘                       │
//! │                                                                         │
//! │  One manager is shared by every repository: a failure seen by one      │
//! │  of them moves all of them to local mode until reconnect().            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use invoicepro_core::LOCAL_COLLECTIONS;

use crate::api::ApiClient;
use crate::error::DataError;

/// Database name reported while in local mode.
pub const LOCAL_DATABASE_NAME: &str = "localStorage";

// =============================================================================
// Storage Mode
// =============================================================================

/// Which backend repositories talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Remote,
    Local,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Remote => write!(f, "remote"),
            StorageMode::Local => write!(f, "local"),
        }
    }
}

// =============================================================================
// Connection Info
// =============================================================================

/// Snapshot of the connection for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub mode: StorageMode,
    pub connected: bool,
    pub database: String,
    pub collections: Vec<String>,
}

impl ConnectionInfo {
    /// The fixed description of local mode.
    pub fn local() -> Self {
        ConnectionInfo {
            mode: StorageMode::Local,
            connected: false,
            database: LOCAL_DATABASE_NAME.to_string(),
            collections: LOCAL_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Payload of `GET /api/test`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakePayload {
    #[serde(default)]
    pub database: Option<String>,
    pub collections: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of `GET /api/connection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConnection {
    pub is_connected: bool,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub collections: Vec<String>,
}

// =============================================================================
// Connectivity Manager
// =============================================================================

#[derive(Debug)]
struct ConnectionState {
    mode: StorageMode,
    database: Option<String>,
    collections: Vec<String>,
}

/// Shared mode flag plus the API client used to probe the backend.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct ConnectivityManager {
    api: ApiClient,
    state: Arc<RwLock<ConnectionState>>,
}

impl ConnectivityManager {
    /// Creates a manager starting in `initial` mode. No I/O.
    pub fn new(api: ApiClient, initial: StorageMode) -> Self {
        ConnectivityManager {
            api,
            state: Arc::new(RwLock::new(ConnectionState {
                mode: initial,
                database: None,
                collections: Vec::new(),
            })),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Current mode. Synchronous, no I/O.
    pub fn storage_mode(&self) -> StorageMode {
        self.state.read().unwrap_or_else(PoisonError::into_inner).mode
    }

    /// True while in remote mode. Synchronous, no I/O.
    pub fn is_connected(&self) -> bool {
        self.storage_mode() == StorageMode::Remote
    }

    /// Handshake with `GET /api/test`. Never fails: any problem leaves the
    /// manager in local mode and returns false.
    pub async fn connect(&self) -> bool {
        match self.api.get::<HandshakePayload>("/api/test").await {
            Ok(payload) => {
                info!(
                    database = ?payload.database,
                    collections = payload.collections.len(),
                    "Connected to remote API"
                );
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                state.mode = StorageMode::Remote;
                state.database = payload.database;
                state.collections = payload.collections;
                true
            }
            Err(e) => {
                warn!(error = %e, "Remote API unavailable, using local storage");
                self.set_mode(StorageMode::Local);
                false
            }
        }
    }

    /// Goes back to remote mode and retries the handshake.
    pub async fn reconnect(&self) -> bool {
        info!("Reconnecting to remote API");
        self.set_mode(StorageMode::Remote);
        self.connect().await
    }

    /// Downgrades to local mode until the next reconnect.
    pub fn switch_to_local(&self) {
        if self.set_mode(StorageMode::Local) == StorageMode::Remote {
            info!("Switched to local storage");
        }
    }

    /// Describes the current connection.
    ///
    /// In remote mode this asks `GET /api/connection`; if that fails the
    /// local description is returned, but the stored mode is not changed.
    pub async fn connection_info(&self) -> ConnectionInfo {
        if !self.is_connected() {
            return ConnectionInfo::local();
        }

        match self.api.get::<RemoteConnection>("/api/connection").await {
            Ok(remote) => ConnectionInfo {
                mode: StorageMode::Remote,
                connected: remote.is_connected,
                database: remote.database.unwrap_or_default(),
                collections: remote.collections,
            },
            Err(e) => {
                warn!(error = %e, "Connection status unavailable");
                ConnectionInfo::local()
            }
        }
    }

    /// Database name and collections reported by the last handshake.
    pub fn remote_details(&self) -> (Option<String>, Vec<String>) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (state.database.clone(), state.collections.clone())
    }

    /// Records a failed remote call: moves the whole session to local mode.
    pub(crate) fn record_failure(&self, operation: &str, error: &DataError) {
        if self.set_mode(StorageMode::Local) == StorageMode::Remote {
            warn!(operation, error = %error, "Remote call failed, switching to local storage");
        }
    }

    /// Sets the mode and returns the previous one.
    fn set_mode(&self, mode: StorageMode) -> StorageMode {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut state.mode, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiSettings;

    fn manager(initial: StorageMode) -> ConnectivityManager {
        let api = ApiClient::new(&ApiSettings::default()).unwrap();
        ConnectivityManager::new(api, initial)
    }

    #[test]
    fn test_initial_mode() {
        assert!(manager(StorageMode::Remote).is_connected());
        assert!(!manager(StorageMode::Local).is_connected());
    }

    #[test]
    fn test_switch_to_local_is_shared_by_clones() {
        let a = manager(StorageMode::Remote);
        let b = a.clone();
        a.switch_to_local();
        assert!(!b.is_connected());
        assert_eq!(b.storage_mode(), StorageMode::Local);
    }

    #[tokio::test]
    async fn test_local_info_without_io() {
        let info = manager(StorageMode::Local).connection_info().await;
        assert_eq!(info, ConnectionInfo::local());
        assert_eq!(info.database, "localStorage");
        assert_eq!(
            info.collections,
            vec!["clients", "products", "invoices", "payments", "settings"]
        );
    }

    #[test]
    fn test_connection_info_wire_format() {
        let value = serde_json::to_value(ConnectionInfo::local()).unwrap();
        assert_eq!(value["mode"], "local");
        assert_eq!(value["connected"], false);
    }
}
