//! Shipment model types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::properties::ShipmentProperties;
use crate::address::AddressId;
use crate::carrier::ServiceId;

/// Unique identifier for a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentId(pub i64);

impl ShipmentId {
    /// Create a new shipment ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub i64);

/// Shipment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    /// Created, no label yet.
    #[default]
    New,
    /// Label generated, waiting for the carrier to pick it up.
    Label,
    /// Handled by the carrier.
    Transit,
    /// Delivered to the recipient or made available for pickup.
    Delivered,
    /// Delivery incident reported by the carrier.
    Exception,
    /// Failed, returned, or expired without a resolving event.
    Error,
}

impl ShipmentStatus {
    /// Statuses still expecting carrier updates.
    pub const PENDING: &'static [Self] = &[Self::Label, Self::Transit, Self::Exception];

    /// Stable status code, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Label => "label",
            Self::Transit => "transit",
            Self::Delivered => "delivered",
            Self::Exception => "exception",
            Self::Error => "error",
        }
    }

    /// Parse a stored status code.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "label" => Some(Self::Label),
            "transit" => Some(Self::Transit),
            "delivered" => Some(Self::Delivered),
            "exception" => Some(Self::Exception),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns true if the carrier may still report progress.
    #[must_use]
    pub fn is_pending(self) -> bool {
        Self::PENDING.contains(&self)
    }

    /// Returns true if the shipment reached its destination.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parcel sent from one address to another through a carrier service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique identifier (None for unsaved shipments).
    pub id: Option<ShipmentId>,
    /// Carrier service used to ship.
    pub service_id: ServiceId,
    /// Sender address.
    pub sender_address_id: AddressId,
    /// Recipient address.
    pub recipient_address_id: AddressId,
    /// Business reason, typically an order reference.
    pub reason: String,
    /// Pack reference within the order.
    pub pack: String,
    /// Current status.
    pub status: ShipmentStatus,
    /// Carrier tracking number, assigned when the label is generated.
    pub tracking_number: Option<String>,
    /// Carrier exchanges and tracking history.
    pub properties: ShipmentProperties,
    /// Label document, once generated.
    pub document_id: Option<DocumentId>,
    /// When the shipment was created.
    pub create_date: DateTime<Utc>,
    /// When the shipment was last written.
    pub edit_date: DateTime<Utc>,
}

impl Shipment {
    /// Creates a new shipment in `new` status.
    #[must_use]
    pub fn new(
        service_id: ServiceId,
        sender_address_id: AddressId,
        recipient_address_id: AddressId,
        reason: impl Into<String>,
        pack: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            service_id,
            sender_address_id,
            recipient_address_id,
            reason: reason.into(),
            pack: pack.into(),
            status: ShipmentStatus::New,
            tracking_number: None,
            properties: ShipmentProperties::default(),
            document_id: None,
            create_date: now,
            edit_date: now,
        }
    }

    /// Sets the creation date, for imported or backdated records.
    #[must_use]
    pub const fn with_create_date(mut self, create_date: DateTime<Utc>) -> Self {
        self.create_date = create_date;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: ShipmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Order reference sent to carriers: reason and pack separated by a space.
    #[must_use]
    pub fn order_number(&self) -> String {
        format!("{} {}", self.reason, self.pack)
    }

    /// Returns true if the shipment is older than `window` without having
    /// reached a resolving state.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.create_date > window
            && !self.status.is_resolved()
            && !self.properties.has_resolving_event()
    }
}

/// A stored document attached to a shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,
    /// Owning shipment.
    pub shipment_id: ShipmentId,
    /// Document bytes.
    pub content: Vec<u8>,
    /// MIME type of the content.
    pub mime_type: String,
    /// When the document was stored.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipment::EventRecord;

    fn shipment() -> Shipment {
        Shipment::new(
            ServiceId(1),
            AddressId(1),
            AddressId(2),
            "ORDERXXXXXXXXXX",
            "PACKXXXXXXXXXX",
        )
    }

    #[test]
    fn new_shipment_defaults() {
        let shipment = shipment();
        assert_eq!(shipment.status, ShipmentStatus::New);
        assert!(shipment.tracking_number.is_none());
        assert!(shipment.properties.events.is_empty());
        assert_eq!(shipment.order_number(), "ORDERXXXXXXXXXX PACKXXXXXXXXXX");
    }

    #[test]
    fn status_codes() {
        for status in [
            ShipmentStatus::New,
            ShipmentStatus::Label,
            ShipmentStatus::Transit,
            ShipmentStatus::Delivered,
            ShipmentStatus::Exception,
            ShipmentStatus::Error,
        ] {
            assert_eq!(ShipmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ShipmentStatus::parse("lost"), None);
    }

    #[test]
    fn pending_statuses() {
        assert!(ShipmentStatus::Label.is_pending());
        assert!(ShipmentStatus::Exception.is_pending());
        assert!(!ShipmentStatus::New.is_pending());
        assert!(!ShipmentStatus::Delivered.is_pending());
    }

    #[test]
    fn stale_after_window() {
        let now = Utc::now();
        let window = Duration::days(90);

        let fresh = shipment().with_status(ShipmentStatus::Label);
        assert!(!fresh.is_stale(now, window));

        let old = fresh.with_create_date(now - Duration::days(91));
        assert!(old.is_stale(now, window));
    }

    #[test]
    fn delivered_shipment_is_never_stale() {
        let now = Utc::now();
        let old = shipment()
            .with_create_date(now - Duration::days(200))
            .with_status(ShipmentStatus::Delivered);
        assert!(!old.is_stale(now, Duration::days(90)));
    }

    #[test]
    fn resolving_event_prevents_staleness() {
        let now = Utc::now();
        let mut old = shipment()
            .with_create_date(now - Duration::days(120))
            .with_status(ShipmentStatus::Exception);
        old.properties.record_event(EventRecord::new(
            "2024-01-02T10:00:00",
            ShipmentStatus::Delivered,
            "Livré",
        ));
        assert!(!old.is_stale(now, Duration::days(90)));
    }
}
