//! Error types for the core library.

use thiserror::Error;

use crate::carrier::CarrierKind;
use crate::service::CarrierError;
use crate::shipment::ShipmentId;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The carrier reported or caused a failure.
    #[error("Carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// No shipment was found for the given identifier.
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// A referenced record is missing.
    #[error("{kind} not found: {id}")]
    RecordNotFound {
        /// Record kind (e.g. "Address").
        kind: &'static str,
        /// Record identifier.
        id: i64,
    },

    /// Polling requires a tracking number, which is only assigned by a label.
    #[error("Shipment {0} has no tracking number")]
    MissingTrackingNumber(ShipmentId),

    /// A label was already generated for this shipment.
    #[error("Shipment {0} already has a label")]
    AlreadyLabelled(ShipmentId),

    /// The shipment's service belongs to another carrier.
    #[error("Carrier {actual} cannot handle a {expected} service")]
    CarrierMismatch {
        /// Carrier the service is registered with.
        expected: CarrierKind,
        /// Carrier that was asked to handle it.
        actual: CarrierKind,
    },

    /// Country code has no ISO 3166 alpha-2 equivalent.
    #[error("Unknown country code: {0}")]
    UnknownCountry(String),

    /// Stored value could not be decoded.
    #[error("Invalid stored value: {0}")]
    InvalidData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
