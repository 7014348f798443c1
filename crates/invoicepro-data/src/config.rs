//! # Data Layer Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     INVOICEPRO_API_URL=http://localhost:3001                           │
//! │     INVOICEPRO_MODE=offline                                            │
//! │     INVOICEPRO_DB_PATH, INVOICEPRO_NAMESPACE,                          │
//! │     INVOICEPRO_MAX_ATTEMPTS, INVOICEPRO_SEED                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/invoicepro/data.toml (Linux)                             │
//! │     ~/Library/Application Support/com.invoicepro.invoicepro/data.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # data.toml
//! mode = "auto"  # auto | offline
//!
//! [api]
//! base_url = "http://localhost:3001"
//! timeout_secs = 10
//! max_attempts = 3
//! initial_backoff_ms = 1000
//!
//! [storage]
//! database_path = "/var/lib/invoicepro/local.db"
//! namespace = "invoicepro_"
//! seed_sample_data = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use invoicepro_core::DEFAULT_NAMESPACE;

use crate::error::{DataError, DataResult};

// =============================================================================
// Startup Mode
// =============================================================================

/// How the data layer starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupMode {
    /// Handshake with the API and fall back to local storage if it fails.
    #[default]
    Auto,

    /// Local storage only; no request is made until an explicit reconnect.
    Offline,
}

impl StartupMode {
    pub fn is_offline(&self) -> bool {
        matches!(self, StartupMode::Offline)
    }
}

impl std::fmt::Display for StartupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupMode::Auto => write!(f, "auto"),
            StartupMode::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for StartupMode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "remote" => Ok(StartupMode::Auto),
            "offline" | "local" => Ok(StartupMode::Offline),
            other => Err(DataError::InvalidConfig(format!(
                "Unknown mode: '{}'. Valid options: auto, offline",
                other
            ))),
        }
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; request paths (`/api/...`) are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per logical request, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles for each further attempt.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    1000
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

impl ApiSettings {
    /// Settings pointing at `base_url`, defaults otherwise.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ApiSettings {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file backing the local store, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Prefix of every storage key.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Write the demo clients/products/invoices into empty collections.
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "invoicepro", "invoicepro")
        .map(|dirs| dirs.data_dir().join("invoicepro.db"))
        .unwrap_or_else(|| PathBuf::from("invoicepro.db"))
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: default_database_path(),
            namespace: default_namespace(),
            seed_sample_data: true,
        }
    }
}

// =============================================================================
// Data Config
// =============================================================================

/// Complete data layer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub mode: StartupMode,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl DataConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (data.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DataResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading data config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file without applying environment overrides.
    pub fn from_file(path: &Path) -> DataResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DataResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DataError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.max_attempts == 0 {
            return Err(DataError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }

        if self.storage.namespace.is_empty() {
            return Err(DataError::InvalidConfig("namespace must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("INVOICEPRO_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(mode) = lookup("INVOICEPRO_MODE") {
            match mode.parse() {
                Ok(parsed) => self.mode = parsed,
                Err(_) => warn!(mode = %mode, "Unknown mode in environment"),
            }
        }

        if let Some(path) = lookup("INVOICEPRO_DB_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }

        if let Some(namespace) = lookup("INVOICEPRO_NAMESPACE") {
            self.storage.namespace = namespace;
        }

        if let Some(attempts) = lookup("INVOICEPRO_MAX_ATTEMPTS") {
            if let Ok(n) = attempts.parse::<u32>() {
                self.api.max_attempts = n;
            }
        }

        if let Some(seed) = lookup("INVOICEPRO_SEED") {
            match seed.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.storage.seed_sample_data = true,
                "0" | "false" | "no" => self.storage.seed_sample_data = false,
                _ => warn!(seed = %seed, "Unknown INVOICEPRO_SEED value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "invoicepro", "invoicepro")
            .map(|dirs| dirs.config_dir().join("data.toml"))
    }
}
