//! Structured carrier exchange log and tracking history of a shipment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::ShipmentStatus;

/// One tracking event reported by the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Carrier timestamp of the event, as reported.
    pub event_date: String,
    /// Status the event maps to.
    pub event_status: ShipmentStatus,
    /// Carrier's human-readable description.
    pub event_libelle: String,
}

impl EventRecord {
    /// Creates a new event record.
    #[must_use]
    pub fn new(
        event_date: impl Into<String>,
        event_status: ShipmentStatus,
        event_libelle: impl Into<String>,
    ) -> Self {
        Self {
            event_date: event_date.into(),
            event_status,
            event_libelle: event_libelle.into(),
        }
    }
}

/// Carrier exchanges and tracking history stored alongside a shipment.
///
/// Serialized with the keys `sent`, `received` and `events`, events being
/// keyed by their carrier date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentProperties {
    /// Last request sent to the carrier, credentials removed.
    #[serde(rename = "sent", default, skip_serializing_if = "Option::is_none")]
    pub last_sent: Option<Value>,
    /// Last structured response received from the carrier.
    #[serde(rename = "received", default, skip_serializing_if = "Option::is_none")]
    pub last_received: Option<Value>,
    /// Tracking events keyed by event date.
    #[serde(default)]
    pub events: BTreeMap<String, EventRecord>,
}

impl ShipmentProperties {
    /// Records the latest request/response pair, keeping the event history.
    pub fn record_exchange(&mut self, sent: Value, received: Value) {
        self.last_sent = Some(sent);
        self.last_received = Some(received);
    }

    /// Returns true if an event with this date was already recorded.
    #[must_use]
    pub fn has_event(&self, event_date: &str) -> bool {
        self.events.contains_key(event_date)
    }

    /// Adds an event unless one with the same date exists.
    ///
    /// Returns false, leaving the history untouched, for a duplicate date.
    pub fn record_event(&mut self, event: EventRecord) -> bool {
        if self.has_event(&event.event_date) {
            return false;
        }
        self.events.insert(event.event_date.clone(), event);
        true
    }

    /// Most recent event by date.
    #[must_use]
    pub fn latest_event(&self) -> Option<&EventRecord> {
        self.events.values().next_back()
    }

    /// Returns true if any recorded event resolved the shipment.
    #[must_use]
    pub fn has_resolving_event(&self) -> bool {
        self.events
            .values()
            .any(|event| event.event_status.is_resolved())
    }
}
