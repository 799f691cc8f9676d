//! # parcelledger-core
//!
//! Core business logic for `ParcelLedger` shipment tracking.
//!
//! This crate provides:
//! - Addresses, carriers, carrier services and credentials
//! - Shipments with their tracking history and label documents
//! - Local storage (`SQLite`)
//! - The [`Carrier`] trait implemented by carrier integrations
//! - [`DeliveryService`] for label generation and status polling
//! - Configuration files

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod address;
pub mod carrier;
pub mod config;
mod db;
mod error;
pub mod service;
pub mod shipment;

pub use address::{Address, AddressId, AddressRepository};
pub use carrier::{
    CarrierId, CarrierKind, CarrierRecord, CarrierRepository, CarrierService,
    Credential, CredentialId, ServiceId,
};
pub use config::DeliveryConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use service::{
    Carrier, CarrierError, DeliveryService, LABEL_MIME_TYPE, LabelOutcome, PollOutcome,
    ShipmentContext, TrackingEvent,
};
pub use shipment::{
    Document, DocumentId, EventRecord, Shipment, ShipmentId, ShipmentProperties,
    ShipmentRepository, ShipmentStatus,
};
