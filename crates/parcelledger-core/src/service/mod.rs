//! Carrier integration and delivery orchestration.
//!
//! Carriers implement [`Carrier`]; [`DeliveryService`] loads shipments,
//! calls the carrier and persists the results.

mod carrier;
mod delivery;

pub use carrier::{Carrier, CarrierError, LabelOutcome, ShipmentContext, TrackingEvent};
pub use delivery::{DeliveryService, LABEL_MIME_TYPE, PollOutcome};
