//! # parcelledger-colissimo
//!
//! Colissimo carrier for `ParcelLedger`.
//!
//! Implements [`parcelledger_core::Carrier`] on top of two La Poste web
//! services: `generateLabel` (JSON request, multipart response holding the
//! label PDF) and the tracking service (form query, SOAP XML response).
//!
//! ## Example
//!
//! ```ignore
//! use parcelledger_colissimo::{Colissimo, ColissimoConfig};
//! use parcelledger_core::{Database, DeliveryConfig, DeliveryService};
//!
//! let delivery = DeliveryConfig::load().await?;
//! let db = Database::open(&delivery.database_path()).await?;
//! let carrier = Colissimo::new(ColissimoConfig::load().await?)?;
//!
//! let service = DeliveryService::with_config(db, carrier, &delivery);
//! let outcome = service.create_label(shipment_id).await?;
//! for (id, result) in service.poll_pending().await? {
//!     println!("{id}: {result:?}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod api;
mod config;
mod error;
pub mod event_codes;
pub mod label;
pub mod payload;
pub mod tracking;

use chrono::Local;
use parcelledger_core::{
    Carrier, CarrierError, CarrierKind, LabelOutcome, ShipmentContext, ShipmentStatus,
    TrackingEvent,
};
use tracing::{debug, info};

pub use api::{ColissimoApi, HttpApi, TrackingQuery};
pub use config::{ColissimoConfig, DEFAULT_LABEL_URL, DEFAULT_TRACKING_URL};
pub use error::{Error, Result};
pub use label::{Label, LabelReply};
pub use payload::LabelRequest;
pub use tracking::TrackingFields;

/// Colissimo carrier.
#[derive(Debug, Clone)]
pub struct Colissimo<A = HttpApi> {
    api: A,
    config: ColissimoConfig,
}

impl Colissimo<HttpApi> {
    /// Creates a carrier talking to the configured endpoints over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ColissimoConfig) -> Result<Self> {
        let api = HttpApi::new(&config)?;
        Ok(Self { api, config })
    }
}

impl<A: ColissimoApi> Colissimo<A> {
    /// Creates a carrier using the given transport.
    #[must_use]
    pub const fn with_api(api: A, config: ColissimoConfig) -> Self {
        Self { api, config }
    }

    /// Transport in use.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Carrier settings.
    #[must_use]
    pub const fn config(&self) -> &ColissimoConfig {
        &self.config
    }

    /// Builds the label request of a shipment, deposited today.
    ///
    /// # Errors
    ///
    /// Returns an error if an address country cannot be mapped.
    pub fn map_data(&self, context: &ShipmentContext) -> Result<LabelRequest> {
        LabelRequest::new(context, &self.config, Local::now().date_naive())
    }

    async fn generate(&self, context: &ShipmentContext) -> Result<LabelOutcome> {
        let request = self.map_data(context)?;
        let reply = self.api.generate_label(&request).await?;
        let status_code = reply.status;
        debug!("Colissimo label service answered {status_code}");

        let label = reply.into_label()?;
        info!(
            "Colissimo parcel {} for order {}",
            label.parcel_number, request.letter.service.order_number
        );

        Ok(LabelOutcome {
            status_code,
            infos: label.infos,
            document: label.document,
            sent: request.redacted()?,
            tracking_number: label.parcel_number,
        })
    }

    async fn track(&self, context: &ShipmentContext, tracking_number: &str) -> Result<TrackingEvent> {
        info!("Get label status for parcel {tracking_number}");
        let body = self
            .api
            .track(TrackingQuery {
                account_number: &context.credential.account_number,
                password: &context.credential.password,
                skybill_number: tracking_number,
            })
            .await?;

        TrackingFields::parse(&body)?.into_event()
    }
}

impl<A: ColissimoApi> Carrier for Colissimo<A> {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Colissimo
    }

    async fn create_label(
        &self,
        context: &ShipmentContext,
    ) -> std::result::Result<LabelOutcome, CarrierError> {
        Ok(self.generate(context).await?)
    }

    async fn get_label_status(
        &self,
        context: &ShipmentContext,
        tracking_number: &str,
    ) -> std::result::Result<TrackingEvent, CarrierError> {
        Ok(self.track(context, tracking_number).await?)
    }

    fn status_for_event(&self, event_code: &str) -> Option<ShipmentStatus> {
        event_codes::status_for(event_code)
    }
}
