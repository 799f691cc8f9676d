//! Shipment and document storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::model::{Document, DocumentId, Shipment, ShipmentId, ShipmentStatus};
use crate::address::AddressId;
use crate::carrier::ServiceId;
use crate::{Error, Result};

const SHIPMENT_COLUMNS: &str = "id, service_id, sender_address_id, recipient_address_id, \
     reason, pack, status, tracking_number, properties, document_id, create_date, edit_date";

/// Repository for shipment storage and retrieval.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    pool: SqlitePool,
}

impl ShipmentRepository {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize database schema.
    pub(crate) async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS shipments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                service_id INTEGER NOT NULL REFERENCES carrier_services(id),
                sender_address_id INTEGER NOT NULL REFERENCES addresses(id),
                recipient_address_id INTEGER NOT NULL REFERENCES addresses(id),
                reason TEXT NOT NULL DEFAULT '',
                pack TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'new',
                tracking_number TEXT,
                properties TEXT NOT NULL DEFAULT '{}',
                document_id INTEGER,
                create_date TEXT NOT NULL,
                edit_date TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_shipments_status ON shipments(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                shipment_id INTEGER NOT NULL REFERENCES shipments(id),
                content BLOB NOT NULL,
                mime_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Save a shipment (insert or update).
    ///
    /// Updates refresh `edit_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save(&self, shipment: &mut Shipment) -> Result<()> {
        let properties = serde_json::to_string(&shipment.properties)?;

        if let Some(id) = shipment.id {
            shipment.edit_date = Utc::now();
            sqlx::query(
                r"
                UPDATE shipments SET
                    service_id = ?, sender_address_id = ?, recipient_address_id = ?,
                    reason = ?, pack = ?, status = ?, tracking_number = ?,
                    properties = ?, document_id = ?, edit_date = ?
                WHERE id = ?
                ",
            )
            .bind(shipment.service_id.0)
            .bind(shipment.sender_address_id.0)
            .bind(shipment.recipient_address_id.0)
            .bind(&shipment.reason)
            .bind(&shipment.pack)
            .bind(shipment.status.as_str())
            .bind(&shipment.tracking_number)
            .bind(&properties)
            .bind(shipment.document_id.map(|d| d.0))
            .bind(shipment.edit_date.to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        } else {
            let result = sqlx::query(
                r"
                INSERT INTO shipments (
                    service_id, sender_address_id, recipient_address_id,
                    reason, pack, status, tracking_number,
                    properties, document_id, create_date, edit_date
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(shipment.service_id.0)
            .bind(shipment.sender_address_id.0)
            .bind(shipment.recipient_address_id.0)
            .bind(&shipment.reason)
            .bind(&shipment.pack)
            .bind(shipment.status.as_str())
            .bind(&shipment.tracking_number)
            .bind(&properties)
            .bind(shipment.document_id.map(|d| d.0))
            .bind(shipment.create_date.to_rfc3339())
            .bind(shipment.edit_date.to_rfc3339())
            .execute(&self.pool)
            .await?;

            shipment.id = Some(ShipmentId::new(result.last_insert_rowid()));
        }

        Ok(())
    }

    /// Get shipment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is corrupt.
    pub async fn get(&self, id: ShipmentId) -> Result<Option<Shipment>> {
        let row = sqlx::query(&format!("SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_shipment).transpose()
    }

    /// Get shipment by ID, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ShipmentNotFound` if no shipment has this ID.
    pub async fn require(&self, id: ShipmentId) -> Result<Shipment> {
        self.get(id).await?.ok_or(Error::ShipmentNotFound(id))
    }

    /// List shipments in any of the given statuses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is corrupt.
    pub async fn list_by_status(&self, statuses: &[ShipmentStatus]) -> Result<Vec<Shipment>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments \
             WHERE status IN ({placeholders}) ORDER BY create_date ASC, id ASC"
        );

        let mut query = sqlx::query(&sql);
        for status in statuses {
            query = query.bind(status.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(row_to_shipment).collect()
    }

    /// Stores a label document and the labelled shipment in one transaction.
    ///
    /// On success `shipment.document_id` points at the new document. The
    /// tracking number is only written if none is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyLabelled` if the stored shipment already has a
    /// tracking number, `Error::ShipmentNotFound` if it no longer exists, or
    /// a database error. Nothing is written in any of these cases.
    pub async fn store_label(
        &self,
        shipment: &mut Shipment,
        content: &[u8],
        mime_type: &str,
    ) -> Result<DocumentId> {
        let id = shipment.id.ok_or_else(|| {
            Error::InvalidData("cannot attach a label to an unsaved shipment".to_string())
        })?;
        let properties = serde_json::to_string(&shipment.properties)?;
        let edit_date = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE shipments SET
                status = ?, tracking_number = ?, properties = ?, edit_date = ?
            WHERE id = ? AND tracking_number IS NULL
            ",
        )
        .bind(shipment.status.as_str())
        .bind(&shipment.tracking_number)
        .bind(&properties)
        .bind(edit_date.to_rfc3339())
        .bind(id.0)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return match self.get(id).await? {
                Some(_) => Err(Error::AlreadyLabelled(id)),
                None => Err(Error::ShipmentNotFound(id)),
            };
        }

        let document_id = insert_document(&mut tx, id, content, mime_type).await?;
        sqlx::query("UPDATE shipments SET document_id = ? WHERE id = ?")
            .bind(document_id.0)
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        shipment.document_id = Some(document_id);
        shipment.edit_date = edit_date;
        debug!("Stored label document {} for shipment {id}", document_id.0);
        Ok(document_id)
    }

    /// Persists status and tracking history in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipment is unsaved or the update fails.
    pub async fn update_tracking(&self, shipment: &mut Shipment) -> Result<()> {
        let id = shipment.id.ok_or_else(|| {
            Error::InvalidData("cannot track an unsaved shipment".to_string())
        })?;
        let properties = serde_json::to_string(&shipment.properties)?;
        let edit_date = Utc::now();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE shipments SET status = ?, properties = ?, edit_date = ? WHERE id = ?",
        )
        .bind(shipment.status.as_str())
        .bind(&properties)
        .bind(edit_date.to_rfc3339())
        .bind(id.0)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(Error::ShipmentNotFound(id));
        }
        tx.commit().await?;

        shipment.edit_date = edit_date;
        Ok(())
    }

    /// Stores a document for a shipment without changing the shipment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save_document(
        &self,
        shipment_id: ShipmentId,
        content: &[u8],
        mime_type: &str,
    ) -> Result<DocumentId> {
        let mut conn = self.pool.acquire().await?;
        insert_document(&mut conn, shipment_id, content, mime_type).await
    }

    /// Get a document by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is corrupt.
    pub async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, shipment_id, content, mime_type, created_at FROM documents WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(Document {
                id: DocumentId(row.get("id")),
                shipment_id: ShipmentId::new(row.get("shipment_id")),
                content: row.get("content"),
                mime_type: row.get("mime_type"),
                created_at: parse_date(row.get("created_at"))?,
            })
        })
        .transpose()
    }

    /// Get the label document of a shipment, if one was generated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn label_document(&self, shipment: &Shipment) -> Result<Option<Document>> {
        match shipment.document_id {
            Some(id) => self.get_document(id).await,
            None => Ok(None),
        }
    }
}

async fn insert_document(
    conn: &mut SqliteConnection,
    shipment_id: ShipmentId,
    content: &[u8],
    mime_type: &str,
) -> Result<DocumentId> {
    let result = sqlx::query(
        "INSERT INTO documents (shipment_id, content, mime_type, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(shipment_id.0)
    .bind(content)
    .bind(mime_type)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(DocumentId(result.last_insert_rowid()))
}

fn row_to_shipment(row: &sqlx::sqlite::SqliteRow) -> Result<Shipment> {
    let status: &str = row.get("status");
    let status = ShipmentStatus::parse(status)
        .ok_or_else(|| Error::InvalidData(format!("unknown shipment status {status:?}")))?;
    let properties: &str = row.get("properties");

    Ok(Shipment {
        id: Some(ShipmentId::new(row.get("id"))),
        service_id: ServiceId(row.get("service_id")),
        sender_address_id: AddressId::new(row.get("sender_address_id")),
        recipient_address_id: AddressId::new(row.get("recipient_address_id")),
        reason: row.get("reason"),
        pack: row.get("pack"),
        status,
        tracking_number: row.get("tracking_number"),
        properties: serde_json::from_str(properties)?,
        document_id: row.get::<Option<i64>, _>("document_id").map(DocumentId),
        create_date: parse_date(row.get("create_date"))?,
        edit_date: parse_date(row.get("edit_date"))?,
    })
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::InvalidData(format!("invalid timestamp {value:?}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::Database;
    use crate::address::Address;
    use crate::carrier::{CarrierKind, CarrierRecord, CarrierService, Credential};
    use crate::shipment::EventRecord;

    /// Stores the records a shipment refers to and returns an unsaved
    /// shipment pointing at them.
    async fn shipment(db: &Database) -> Shipment {
        let carriers = db.carriers();
        let mut carrier = CarrierRecord::new(CarrierKind::Colissimo);
        carriers.save_carrier(&mut carrier).await.unwrap();
        let mut credential = Credential::new("123", "password");
        carriers.save_credential(&mut credential).await.unwrap();
        let mut service = CarrierService::new(
            "Domicile",
            "DOM",
            CarrierKind::Colissimo,
            carrier.id.unwrap(),
            credential.id.unwrap(),
        );
        carriers.save_service(&mut service).await.unwrap();

        let mut sender = Address::new("Shipping", "services", "75000", "Paris", "FRA");
        db.addresses().save(&mut sender).await.unwrap();
        let mut recipient = Address::new("Jon", "Doe", "66000", "Perpignan", "FRA");
        db.addresses().save(&mut recipient).await.unwrap();

        Shipment::new(
            service.id.unwrap(),
            sender.id.unwrap(),
            recipient.id.unwrap(),
            "ORDERXXXXXXXXXX",
            "PACKXXXXXXXXXX",
        )
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let mut shipment = shipment(&db).await;
        repo.save(&mut shipment).await.unwrap();

        let loaded = repo.require(shipment.id.unwrap()).await.unwrap();
        assert_eq!(loaded.status, ShipmentStatus::New);
        assert_eq!(loaded.reason, "ORDERXXXXXXXXXX");
        assert!(loaded.tracking_number.is_none());
        assert_eq!(loaded.create_date.timestamp(), shipment.create_date.timestamp());
    }

    #[tokio::test]
    async fn test_require_missing() {
        let db = Database::in_memory().await.unwrap();
        let err = db.shipments().require(ShipmentId::new(99)).await.unwrap_err();
        assert!(matches!(err, Error::ShipmentNotFound(ShipmentId(99))));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let template = shipment(&db).await;
        let mut labelled = template.clone().with_status(ShipmentStatus::Label);
        repo.save(&mut labelled).await.unwrap();
        let mut delivered = template.clone().with_status(ShipmentStatus::Delivered);
        repo.save(&mut delivered).await.unwrap();
        let mut older = template
            .with_status(ShipmentStatus::Transit)
            .with_create_date(Utc::now() - Duration::days(3));
        repo.save(&mut older).await.unwrap();

        let pending = repo.list_by_status(ShipmentStatus::PENDING).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, older.id);
        assert_eq!(pending[1].id, labelled.id);

        assert!(repo.list_by_status(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_label() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let mut shipment = shipment(&db).await;
        repo.save(&mut shipment).await.unwrap();

        shipment.status = ShipmentStatus::Label;
        shipment.tracking_number = Some("6A track number".to_string());
        let document_id = repo
            .store_label(&mut shipment, b"%PDF-1.4", "application/pdf")
            .await
            .unwrap();

        let loaded = repo.require(shipment.id.unwrap()).await.unwrap();
        assert_eq!(loaded.status, ShipmentStatus::Label);
        assert_eq!(loaded.tracking_number.as_deref(), Some("6A track number"));
        assert_eq!(loaded.document_id, Some(document_id));

        let document = repo.label_document(&loaded).await.unwrap().unwrap();
        assert_eq!(document.content, b"%PDF-1.4");
        assert_eq!(document.mime_type, "application/pdf");
        assert_eq!(document.shipment_id, shipment.id.unwrap());
    }

    #[tokio::test]
    async fn test_store_label_keeps_first_tracking_number() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let mut shipment = shipment(&db).await;
        repo.save(&mut shipment).await.unwrap();
        let mut concurrent = shipment.clone();

        shipment.status = ShipmentStatus::Label;
        shipment.tracking_number = Some("6A0".to_string());
        let document_id = repo
            .store_label(&mut shipment, b"%PDF first", "application/pdf")
            .await
            .unwrap();

        // Loaded before the first label was stored
        concurrent.status = ShipmentStatus::Label;
        concurrent.tracking_number = Some("6A1".to_string());
        let err = repo
            .store_label(&mut concurrent, b"%PDF second", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyLabelled(id) if Some(id) == shipment.id));
        assert!(concurrent.document_id.is_none());

        let loaded = repo.require(shipment.id.unwrap()).await.unwrap();
        assert_eq!(loaded.tracking_number.as_deref(), Some("6A0"));
        assert_eq!(loaded.document_id, Some(document_id));
        assert!(
            repo.get_document(DocumentId(document_id.0 + 1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_store_label_unknown_shipment() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let mut shipment = shipment(&db).await;
        shipment.id = Some(ShipmentId::new(5));
        shipment.tracking_number = Some("6A0".to_string());

        let err = repo
            .store_label(&mut shipment, b"%PDF", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShipmentNotFound(ShipmentId(5))));
        assert!(repo.get_document(DocumentId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_tracking() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let mut shipment = shipment(&db).await.with_status(ShipmentStatus::Label);
        repo.save(&mut shipment).await.unwrap();

        shipment.status = ShipmentStatus::Delivered;
        shipment.properties.record_event(EventRecord::new(
            "2024-03-01T08:00:00",
            ShipmentStatus::Delivered,
            "Test",
        ));
        repo.update_tracking(&mut shipment).await.unwrap();

        let loaded = repo.require(shipment.id.unwrap()).await.unwrap();
        assert_eq!(loaded.status, ShipmentStatus::Delivered);
        assert_eq!(loaded.properties, shipment.properties);
    }

    #[tokio::test]
    async fn test_update_tracking_unknown_shipment() {
        let db = Database::in_memory().await.unwrap();
        let mut shipment = shipment(&db).await;
        shipment.id = Some(ShipmentId::new(5));

        let err = db.shipments().update_tracking(&mut shipment).await.unwrap_err();
        assert!(matches!(err, Error::ShipmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_save_document() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.shipments();

        let mut shipment = shipment(&db).await;
        repo.save(&mut shipment).await.unwrap();

        let id = repo
            .save_document(shipment.id.unwrap(), b"customs", "text/plain")
            .await
            .unwrap();
        let document = repo.get_document(id).await.unwrap().unwrap();
        assert_eq!(document.content, b"customs");

        // Unrelated documents do not become the label
        let loaded = repo.require(shipment.id.unwrap()).await.unwrap();
        assert!(repo.label_document(&loaded).await.unwrap().is_none());
    }
}
