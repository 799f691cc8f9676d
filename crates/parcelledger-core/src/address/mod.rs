//! Postal addresses used as shipment sender and recipient.

pub mod country;
mod model;
mod repository;

pub use model::{Address, AddressId};
pub use repository::AddressRepository;
