//! Configuration files stored under the user's config directory.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Application directory name under the platform config and data directories.
pub const APP_DIR: &str = "parcelledger";

const DELIVERY_FILE: &str = "delivery.json";
const DEFAULT_STALE_AFTER_DAYS: u32 = 90;

/// Delivery tracking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Database file; defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Age in days after which an unresolved shipment is marked as error.
    pub stale_after_days: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
        }
    }
}

impl DeliveryConfig {
    /// Load settings from `delivery.json`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        load_json(DELIVERY_FILE).await
    }

    /// Save settings to `delivery.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self) -> Result<()> {
        save_json(DELIVERY_FILE, self).await
    }

    /// Database file location.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("parcelledger.db")
        })
    }

    /// Staleness window.
    #[must_use]
    pub fn stale_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.stale_after_days))
    }
}

/// Path of a configuration file.
#[must_use]
pub fn config_path(file_name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(file_name)
}

/// Load a JSON configuration file, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_json<T: DeserializeOwned + Default>(file_name: &str) -> Result<T> {
    let path = config_path(file_name);

    if !tokio::fs::try_exists(&path).await? {
        debug!("No config at {:?}, using defaults", path);
        return Ok(T::default());
    }

    let contents = tokio::fs::read_to_string(&path).await?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Save a JSON configuration file, creating the directory if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be serialized or written.
pub async fn save_json<T: Serialize>(file_name: &str, value: &T) -> Result<()> {
    let path = config_path(file_name);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    tokio::fs::write(&path, contents).await?;

    info!("Config saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DeliveryConfig::default();
        assert_eq!(config.stale_after_days, 90);
        assert_eq!(config.stale_window(), chrono::Duration::days(90));
        assert!(config.database_path().ends_with("parcelledger/parcelledger.db"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: DeliveryConfig = serde_json::from_str(r#"{"stale_after_days": 30}"#).unwrap();
        assert_eq!(config.stale_after_days, 30);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn explicit_database_path() {
        let config: DeliveryConfig =
            serde_json::from_str(r#"{"database_path": "/tmp/parcels.db"}"#).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/parcels.db"));
    }

    #[test]
    fn config_path_is_namespaced() {
        assert!(config_path("delivery.json").ends_with("parcelledger/delivery.json"));
    }
}
