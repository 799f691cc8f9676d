//! Carriers, their services and the credentials used to call them.

mod model;
mod repository;

pub use model::{
    CarrierId, CarrierKind, CarrierRecord, CarrierService, Credential, CredentialId, ServiceId,
};
pub use repository::CarrierRepository;
