//! Shipments, their tracking history and label documents.

mod model;
mod properties;
mod repository;

pub use model::{Document, DocumentId, Shipment, ShipmentId, ShipmentStatus};
pub use properties::{EventRecord, ShipmentProperties};
pub use repository::ShipmentRepository;
