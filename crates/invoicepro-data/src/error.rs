//! # Data Layer Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Data Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transient     │  │     Application         │ │
//! │  │                 │  │  (retried)      │  │  (propagated as-is)     │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Rejected (4xx,         │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │    success:false)       │ │
//! │  │  ConfigLoad..   │  │  Server (5xx)   │  │  NotFound               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │   Malformed     │  │     Store       │                              │
//! │  │  (not retried,  │  │  local store    │                              │
//! │  │   backend down) │  │  failure        │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! │                                                                         │
//! │  Transient + Malformed = "backend unavailable" → switch to local mode  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use invoicepro_store::StoreError;
use thiserror::Error;

/// Result type alias for data layer operations.
pub type DataResult<T> = Result<T, DataError>;

/// Data layer error type.
#[derive(Debug, Error)]
pub enum DataError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// API base URL does not parse or has the wrong scheme.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Request Errors
    // =========================================================================
    /// Request body could not be encoded as JSON. Nothing was sent.
    #[error("Failed to serialize request body: {0}")]
    Serialization(String),

    // =========================================================================
    // Transient Remote Errors
    // =========================================================================
    /// Connection refused, reset, DNS failure, ...
    #[error("Network error: {0}")]
    Transport(String),

    /// The request did not complete within the client timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// HTTP 5xx.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),

    // =========================================================================
    // Application Errors
    // =========================================================================
    /// HTTP 4xx, or a 2xx envelope with `success: false`.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The addressed record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// The local store failed.
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
}

impl DataError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DataError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for failures worth another attempt: network errors, timeouts
    /// and HTTP 5xx.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::Transport(_) | DataError::Timeout(_) | DataError::Server { .. }
        )
    }

    /// True when the remote backend should be treated as down.
    pub fn is_backend_unavailable(&self) -> bool {
        self.is_retryable() || matches!(self, DataError::Malformed(_))
    }

    /// True for a missing record, locally or as a remote 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataError::NotFound { .. } | DataError::Rejected { status: 404, .. }
        )
    }

    /// True for configuration problems.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DataError::InvalidConfig(_) | DataError::InvalidUrl(_) | DataError::ConfigLoadFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

/// ```text
/// timeout      → DataError::Timeout
/// decode       → DataError::Malformed
/// other        → DataError::Transport
/// ```
impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::Malformed(err.to_string())
        } else {
            DataError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for DataError {
    fn from(err: url::ParseError) -> Self {
        DataError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for DataError {
    fn from(err: toml::de::Error) -> Self {
        DataError::ConfigLoadFailed(err.to_string())
    }
}
