//! Colissimo web service settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Default label generation endpoint.
pub const DEFAULT_LABEL_URL: &str =
    "https://ws.colissimo.fr/sls-ws/SlsServiceWSRest/generateLabel";

/// Default parcel tracking endpoint.
pub const DEFAULT_TRACKING_URL: &str =
    "https://www.coliposte.fr/tracking-chargeur-cxf/TrackingServiceWS/track";

const CONFIG_FILE: &str = "colissimo.json";

/// Colissimo web service settings, stored in `colissimo.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColissimoConfig {
    /// Label generation endpoint.
    pub label_url: String,
    /// Parcel tracking endpoint.
    pub tracking_url: String,
    /// Label format requested from Colissimo.
    pub output_printing_type: String,
    /// Declared parcel weight in kilograms.
    pub weight: f64,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ColissimoConfig {
    fn default() -> Self {
        Self {
            label_url: DEFAULT_LABEL_URL.to_string(),
            tracking_url: DEFAULT_TRACKING_URL.to_string(),
            output_printing_type: "PDF_A4_300dpi".to_string(),
            weight: 0.3,
            timeout_secs: 30,
        }
    }
}

impl ColissimoConfig {
    /// Load settings from `colissimo.json`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> parcelledger_core::Result<Self> {
        parcelledger_core::config::load_json(CONFIG_FILE).await
    }

    /// Save settings to `colissimo.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self) -> parcelledger_core::Result<()> {
        parcelledger_core::config::save_json(CONFIG_FILE, self).await
    }

    /// Parsed label endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL.
    pub fn label_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&self.label_url)?)
    }

    /// Parsed tracking endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL.
    pub fn tracking_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&self.tracking_url)?)
    }

    /// Points both endpoints at another host, e.g. a test server.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` or a current endpoint is not a valid URL.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let base = Url::parse(base)?;
        let label = self.label_endpoint()?;
        let tracking = self.tracking_endpoint()?;
        self.label_url = base.join(label.path().trim_start_matches('/'))?.into();
        self.tracking_url = base.join(tracking.path().trim_start_matches('/'))?.into();
        Ok(self)
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
