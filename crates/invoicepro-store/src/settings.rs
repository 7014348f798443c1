//! Settings document.
//!
//! Settings are always local, whatever the connection mode, and are stored
//! as a single JSON object under `<namespace>settings`.

use tracing::warn;

use invoicepro_core::Settings;

use crate::error::StoreResult;
use crate::pool::LocalStore;

const SETTINGS_KEY: &str = "settings";

/// Accessor for the settings document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    store: LocalStore,
}

impl SettingsStore {
    pub fn new(store: LocalStore) -> Self {
        SettingsStore { store }
    }

    /// Stored settings, or the defaults when nothing usable is stored.
    pub async fn get(&self) -> Settings {
        let raw = match self.store.get_item(SETTINGS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                warn!(error = %e, "Settings unreadable, using defaults");
                return Settings::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(
                key = %self.store.storage_key(SETTINGS_KEY),
                error = %e,
                "Corrupt settings document, using defaults"
            );
            Settings::default()
        })
    }

    /// Overwrites the stored document.
    pub async fn save(&self, settings: &Settings) -> StoreResult<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.set_item(SETTINGS_KEY, &raw).await
    }
}
