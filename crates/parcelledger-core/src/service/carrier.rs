//! Carrier integration seam.
//!
//! A carrier turns a shipment into a label request and reports the latest
//! tracking event for a parcel. Persisting the results is left to
//! [`DeliveryService`](super::DeliveryService).

use std::future::Future;

use bytes::Bytes;
use serde_json::Value;

use crate::address::Address;
use crate::carrier::{CarrierKind, CarrierService, Credential};
use crate::shipment::{Shipment, ShipmentStatus};

/// Errors reported by a carrier integration.
#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    /// The carrier refused the label request.
    #[error("Label request rejected with status {status}: {messages}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Carrier messages, `null` if none were returned.
        messages: Value,
    },

    /// The tracking service answered with a non-zero error code.
    #[error("Tracking error {code}: {message}")]
    Tracking {
        /// Carrier error code.
        code: String,
        /// Carrier error message.
        message: String,
    },

    /// The carrier reported an event code with no known status.
    #[error("Unknown event code: {0}")]
    UnknownEventCode(String),

    /// The carrier answered with a status code outside its contract.
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(u16),

    /// The shipment cannot be expressed as a carrier request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The carrier response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be delivered.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Everything a carrier needs to know about a shipment.
#[derive(Debug, Clone)]
pub struct ShipmentContext {
    /// The shipment itself.
    pub shipment: Shipment,
    /// Sender address.
    pub sender: Address,
    /// Recipient address.
    pub recipient: Address,
    /// Carrier service used for the shipment.
    pub service: CarrierService,
    /// Credentials of the service.
    pub credential: Credential,
}

/// Successful label generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOutcome {
    /// HTTP status code of the carrier response.
    pub status_code: u16,
    /// Structured info payload returned with the label.
    pub infos: Value,
    /// Label document bytes.
    pub document: Bytes,
    /// Request sent to the carrier, credentials removed.
    pub sent: Value,
    /// Tracking number assigned by the carrier.
    pub tracking_number: String,
}

/// Latest tracking event reported by a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEvent {
    /// Carrier timestamp of the event.
    pub event_date: String,
    /// Carrier event code.
    pub event_code: String,
    /// Carrier's human-readable description.
    pub event_libelle: String,
}

/// A carrier web service able to print labels and track parcels.
pub trait Carrier: Send + Sync {
    /// Carrier implemented by this integration.
    fn kind(&self) -> CarrierKind;

    /// Requests a label for the shipment.
    ///
    /// Rejections are reported as [`CarrierError::Rejected`].
    fn create_label(
        &self,
        context: &ShipmentContext,
    ) -> impl Future<Output = Result<LabelOutcome, CarrierError>> + Send;

    /// Fetches the latest tracking event of a parcel.
    fn get_label_status(
        &self,
        context: &ShipmentContext,
        tracking_number: &str,
    ) -> impl Future<Output = Result<TrackingEvent, CarrierError>> + Send;

    /// Maps a carrier event code to a shipment status.
    fn status_for_event(&self, event_code: &str) -> Option<ShipmentStatus>;
}
