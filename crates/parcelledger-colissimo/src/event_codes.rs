//! Colissimo tracking event codes.

use parcelledger_core::ShipmentStatus;

/// Event code to shipment status.
pub const EVENT_CODES: &[(&str, ShipmentStatus)] = &[
    // Announced, not yet handed over
    ("PCHTAR", ShipmentStatus::Label),
    ("COMCFM", ShipmentStatus::Label),
    // Handled by the network
    ("PCHCFM", ShipmentStatus::Transit),
    ("PCHMQT", ShipmentStatus::Transit),
    ("AARCFM", ShipmentStatus::Transit),
    ("DCHCFM", ShipmentStatus::Transit),
    ("CHGCFM", ShipmentStatus::Transit),
    ("ET1CFM", ShipmentStatus::Transit),
    ("ET2CFM", ShipmentStatus::Transit),
    ("ET3CFM", ShipmentStatus::Transit),
    ("ET4CFM", ShipmentStatus::Transit),
    ("EP1DST", ShipmentStatus::Transit),
    ("MLVCFM", ShipmentStatus::Transit),
    ("MLVARS", ShipmentStatus::Transit),
    ("SOLCFM", ShipmentStatus::Transit),
    // Delivered or available for pickup
    ("DEPGUI", ShipmentStatus::Delivered),
    ("LIVCFM", ShipmentStatus::Delivered),
    ("LIVGAR", ShipmentStatus::Delivered),
    ("LIVVOI", ShipmentStatus::Delivered),
    ("LIVRTI", ShipmentStatus::Delivered),
    ("RENAVI", ShipmentStatus::Delivered),
    // Delivery incidents
    ("RENTAR", ShipmentStatus::Exception),
    ("RENDIA", ShipmentStatus::Exception),
    ("RENLNA", ShipmentStatus::Exception),
    ("RENSNC", ShipmentStatus::Exception),
    ("RENARV", ShipmentStatus::Exception),
    ("RENCAD", ShipmentStatus::Exception),
    ("RENNRV", ShipmentStatus::Exception),
    ("RENINC", ShipmentStatus::Exception),
    ("RENSIG", ShipmentStatus::Exception),
    ("NRVCFM", ShipmentStatus::Exception),
    ("ND1CFM", ShipmentStatus::Exception),
    ("AG1CFM", ShipmentStatus::Exception),
    // Returned or lost
    ("RSTBRT", ShipmentStatus::Error),
    ("RSTNCG", ShipmentStatus::Error),
    ("RSTFLS", ShipmentStatus::Error),
    ("RSTCFM", ShipmentStatus::Error),
    ("DISCFM", ShipmentStatus::Error),
    ("RENBEC", ShipmentStatus::Error),
    ("RENDEM", ShipmentStatus::Error),
];

/// Shipment status of an event code.
#[must_use]
pub fn status_for(event_code: &str) -> Option<ShipmentStatus> {
    EVENT_CODES
        .iter()
        .find(|(code, _)| *code == event_code)
        .map(|(_, status)| *status)
}
