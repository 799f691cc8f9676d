//! Label generation and tracking orchestration.

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

use super::carrier::{Carrier, CarrierError, LabelOutcome, ShipmentContext};
use crate::config::DeliveryConfig;
use crate::db::Database;
use crate::shipment::{EventRecord, Shipment, ShipmentId, ShipmentStatus};
use crate::{Error, Result};

/// MIME type of stored label documents.
pub const LABEL_MIME_TYPE: &str = "application/pdf";

/// Result of polling a shipment's tracking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new event was recorded and the shipment moved to this status.
    Updated(ShipmentStatus),
    /// The carrier's latest event was already recorded; nothing changed.
    AlreadyRecorded,
    /// The shipment outlived the staleness window and was marked as error.
    Expired,
}

/// Drives a carrier against stored shipments.
#[derive(Debug, Clone)]
pub struct DeliveryService<C> {
    db: Database,
    carrier: C,
    stale_window: Duration,
}

impl<C: Carrier> DeliveryService<C> {
    /// Creates a service with the default staleness window.
    #[must_use]
    pub fn new(db: Database, carrier: C) -> Self {
        Self::with_config(db, carrier, &DeliveryConfig::default())
    }

    /// Creates a service using the given settings.
    #[must_use]
    pub fn with_config(db: Database, carrier: C, config: &DeliveryConfig) -> Self {
        Self {
            db,
            carrier,
            stale_window: config.stale_window(),
        }
    }

    /// The carrier this service drives.
    pub const fn carrier(&self) -> &C {
        &self.carrier
    }

    /// Loads the shipment with its addresses, service and credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if any referenced record is missing or the service
    /// belongs to another carrier.
    pub async fn load_context(&self, shipment: Shipment) -> Result<ShipmentContext> {
        let carriers = self.db.carriers();
        let service = carriers.service(shipment.service_id).await?;

        if service.kind != self.carrier.kind() {
            return Err(Error::CarrierMismatch {
                expected: service.kind,
                actual: self.carrier.kind(),
            });
        }

        let credential = carriers.credential(service.credential_id).await?;
        let addresses = self.db.addresses();
        let sender = addresses.require(shipment.sender_address_id).await?;
        let recipient = addresses.require(shipment.recipient_address_id).await?;

        Ok(ShipmentContext {
            shipment,
            sender,
            recipient,
            service,
            credential,
        })
    }

    /// Generates the carrier label of a shipment.
    ///
    /// On success the label document is stored, the shipment moves to
    /// `label` with the carrier's tracking number, and the redacted request
    /// and response are recorded in its properties. On failure the shipment
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipment cannot be loaded, already has a
    /// label, the carrier rejects the request, or storage fails.
    pub async fn create_label(&self, id: ShipmentId) -> Result<LabelOutcome> {
        let shipment = self.db.shipments().require(id).await?;
        if shipment.tracking_number.is_some() {
            return Err(Error::AlreadyLabelled(id));
        }

        let context = self.load_context(shipment).await?;
        info!(
            "Requesting {} label for shipment {id} ({})",
            self.carrier.kind(),
            context.service.product_code
        );

        let outcome = match self.carrier.create_label(&context).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Label request for shipment {id} failed: {e}");
                return Err(e.into());
            }
        };

        let mut shipment = context.shipment;
        shipment
            .properties
            .record_exchange(outcome.sent.clone(), outcome.infos.clone());
        shipment.status = ShipmentStatus::Label;
        shipment.tracking_number = Some(outcome.tracking_number.clone());

        if let Err(e) = self
            .db
            .shipments()
            .store_label(&mut shipment, &outcome.document, LABEL_MIME_TYPE)
            .await
        {
            warn!(
                "Discarding parcel {} issued for shipment {id}: {e}",
                outcome.tracking_number
            );
            return Err(e);
        }

        info!(
            "Shipment {id} labelled with tracking number {}",
            outcome.tracking_number
        );
        Ok(outcome)
    }

    /// Polls the carrier for the latest event of a shipment.
    ///
    /// Shipments older than the staleness window that never reached a
    /// resolving state are marked as error without contacting the carrier.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipment has no tracking number, the carrier
    /// reports a tracking error or an unknown event code, or storage fails.
    pub async fn get_label_status(&self, id: ShipmentId) -> Result<PollOutcome> {
        let mut shipment = self.db.shipments().require(id).await?;

        if shipment.is_stale(Utc::now(), self.stale_window) {
            if shipment.status != ShipmentStatus::Error {
                info!(
                    "Shipment {id} created {} is stale, marking as error",
                    shipment.create_date
                );
                shipment.status = ShipmentStatus::Error;
                self.db.shipments().update_tracking(&mut shipment).await?;
            }
            return Ok(PollOutcome::Expired);
        }

        let tracking_number = shipment
            .tracking_number
            .clone()
            .ok_or(Error::MissingTrackingNumber(id))?;

        let context = self.load_context(shipment).await?;
        let event = self
            .carrier
            .get_label_status(&context, &tracking_number)
            .await?;

        let mut shipment = context.shipment;
        if shipment.properties.has_event(&event.event_date) {
            debug!(
                "Event {} of shipment {id} already recorded",
                event.event_date
            );
            return Ok(PollOutcome::AlreadyRecorded);
        }

        let Some(status) = self.carrier.status_for_event(&event.event_code) else {
            error!(
                "Unknown {} event code {} for shipment {id}",
                self.carrier.kind(),
                event.event_code
            );
            return Err(CarrierError::UnknownEventCode(event.event_code).into());
        };

        shipment.status = status;
        shipment.properties.record_event(EventRecord::new(
            event.event_date,
            status,
            event.event_libelle,
        ));
        self.db.shipments().update_tracking(&mut shipment).await?;

        debug!("Shipment {id} is now {status}");
        Ok(PollOutcome::Updated(status))
    }

    /// Polls every shipment still waiting for carrier updates.
    ///
    /// Failures are logged and reported per shipment without stopping the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pending shipments cannot be listed.
    pub async fn poll_pending(&self) -> Result<Vec<(ShipmentId, Result<PollOutcome>)>> {
        let pending = self
            .db
            .shipments()
            .list_by_status(ShipmentStatus::PENDING)
            .await?;
        info!("Polling {} pending shipments", pending.len());

        let mut results = Vec::with_capacity(pending.len());
        for id in pending.into_iter().filter_map(|shipment| shipment.id) {
            let result = self.get_label_status(id).await;
            if let Err(e) = &result {
                warn!("Polling shipment {id} failed: {e}");
            }
            results.push((id, result));
        }

        Ok(results)
    }
}
