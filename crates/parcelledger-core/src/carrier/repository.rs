//! Carrier, credential and service storage repository.

use sqlx::Row;
use sqlx::sqlite::SqlitePool;

use super::model::{
    CarrierId, CarrierKind, CarrierRecord, CarrierService, Credential, CredentialId, ServiceId,
};
use crate::{Error, Result};

/// Repository for carriers, their services and credentials.
#[derive(Debug, Clone)]
pub struct CarrierRepository {
    pool: SqlitePool,
}

impl CarrierRepository {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize database schema.
    pub(crate) async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS carriers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_number TEXT NOT NULL,
                password TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS carrier_services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                product_code TEXT NOT NULL,
                carrier_code TEXT NOT NULL,
                carrier_id INTEGER NOT NULL REFERENCES carriers(id),
                credential_id INTEGER NOT NULL REFERENCES credentials(id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a carrier, or return the existing one with the same code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save_carrier(&self, carrier: &mut CarrierRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO carriers (name, code) VALUES (?, ?)
            ON CONFLICT(code) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(&carrier.name)
        .bind(carrier.code())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id FROM carriers WHERE code = ?")
            .bind(carrier.code())
            .fetch_one(&self.pool)
            .await?;
        carrier.id = Some(CarrierId(row.get("id")));

        Ok(())
    }

    /// Register every supported carrier, returning the stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn register_supported(&self) -> Result<Vec<CarrierRecord>> {
        let mut carriers = Vec::with_capacity(CarrierKind::ALL.len());
        for kind in CarrierKind::ALL {
            let mut carrier = CarrierRecord::new(*kind);
            self.save_carrier(&mut carrier).await?;
            carriers.push(carrier);
        }
        Ok(carriers)
    }

    /// List all registered carriers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored code is
    /// no longer supported.
    pub async fn list_carriers(&self) -> Result<Vec<CarrierRecord>> {
        let rows = sqlx::query("SELECT id, name, code FROM carriers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(CarrierRecord {
                    id: Some(CarrierId(row.get("id"))),
                    name: row.get("name"),
                    kind: parse_kind(row.get("code"))?,
                })
            })
            .collect()
    }

    /// Save credentials (insert or update).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save_credential(&self, credential: &mut Credential) -> Result<()> {
        if let Some(id) = credential.id {
            sqlx::query("UPDATE credentials SET account_number = ?, password = ? WHERE id = ?")
                .bind(&credential.account_number)
                .bind(&credential.password)
                .bind(id.0)
                .execute(&self.pool)
                .await?;
        } else {
            let result =
                sqlx::query("INSERT INTO credentials (account_number, password) VALUES (?, ?)")
                    .bind(&credential.account_number)
                    .bind(&credential.password)
                    .execute(&self.pool)
                    .await?;
            credential.id = Some(CredentialId(result.last_insert_rowid()));
        }

        Ok(())
    }

    /// Get credentials by ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if no credentials have this ID.
    pub async fn credential(&self, id: CredentialId) -> Result<Credential> {
        let row = sqlx::query("SELECT id, account_number, password FROM credentials WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::RecordNotFound {
                kind: "Credential",
                id: id.0,
            })?;

        Ok(Credential {
            id: Some(CredentialId(row.get("id"))),
            account_number: row.get("account_number"),
            password: row.get("password"),
        })
    }

    /// Save a carrier service (insert or update).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save_service(&self, service: &mut CarrierService) -> Result<()> {
        if let Some(id) = service.id {
            sqlx::query(
                r"
                UPDATE carrier_services SET
                    name = ?, product_code = ?, carrier_code = ?,
                    carrier_id = ?, credential_id = ?
                WHERE id = ?
                ",
            )
            .bind(&service.name)
            .bind(&service.product_code)
            .bind(service.kind.code())
            .bind(service.carrier_id.0)
            .bind(service.credential_id.0)
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        } else {
            let result = sqlx::query(
                r"
                INSERT INTO carrier_services (
                    name, product_code, carrier_code, carrier_id, credential_id
                ) VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(&service.name)
            .bind(&service.product_code)
            .bind(service.kind.code())
            .bind(service.carrier_id.0)
            .bind(service.credential_id.0)
            .execute(&self.pool)
            .await?;
            service.id = Some(ServiceId(result.last_insert_rowid()));
        }

        Ok(())
    }

    /// Get a carrier service by ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if no service has this ID.
    pub async fn service(&self, id: ServiceId) -> Result<CarrierService> {
        let row = sqlx::query(
            r"
            SELECT id, name, product_code, carrier_code, carrier_id, credential_id
            FROM carrier_services
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::RecordNotFound {
            kind: "Carrier service",
            id: id.0,
        })?;

        row_to_service(&row)
    }

    /// List services offered by a carrier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_services(&self, kind: CarrierKind) -> Result<Vec<CarrierService>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, product_code, carrier_code, carrier_id, credential_id
            FROM carrier_services
            WHERE carrier_code = ?
            ORDER BY name ASC
            ",
        )
        .bind(kind.code())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_service).collect()
    }
}

fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> Result<CarrierService> {
    Ok(CarrierService {
        id: Some(ServiceId(row.get("id"))),
        name: row.get("name"),
        product_code: row.get("product_code"),
        kind: parse_kind(row.get("carrier_code"))?,
        carrier_id: CarrierId(row.get("carrier_id")),
        credential_id: CredentialId(row.get("credential_id")),
    })
}

fn parse_kind(code: &str) -> Result<CarrierKind> {
    CarrierKind::from_code(code)
        .ok_or_else(|| Error::InvalidData(format!("unsupported carrier code {code:?}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::Database;

    use super::*;

    #[tokio::test]
    async fn test_carrier_service_colissimo() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.carriers();

        let mut carrier = CarrierRecord::new(CarrierKind::Colissimo);
        repo.save_carrier(&mut carrier).await.unwrap();
        let mut credential = Credential::new("123", "password");
        repo.save_credential(&mut credential).await.unwrap();

        let mut service = CarrierService::new(
            "Livraison à domicile",
            "DOM",
            CarrierKind::Colissimo,
            carrier.id.unwrap(),
            credential.id.unwrap(),
        );
        repo.save_service(&mut service).await.unwrap();

        let loaded = repo.service(service.id.unwrap()).await.unwrap();
        assert_eq!(loaded, service);
        assert_eq!(repo.list_services(CarrierKind::Colissimo).await.unwrap().len(), 1);

        let carriers = repo.list_carriers().await.unwrap();
        assert_eq!(carriers.len(), 1);
        assert_eq!(carriers[0].code(), "COLISSIMO");
    }

    #[tokio::test]
    async fn test_save_carrier_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.carriers();

        let mut first = CarrierRecord::new(CarrierKind::Colissimo);
        repo.save_carrier(&mut first).await.unwrap();
        let mut second = CarrierRecord::new(CarrierKind::Colissimo);
        repo.save_carrier(&mut second).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.list_carriers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_supported() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.carriers();

        let registered = repo.register_supported().await.unwrap();
        assert_eq!(registered.len(), CarrierKind::ALL.len());
        assert!(registered.iter().all(|carrier| carrier.id.is_some()));

        repo.register_supported().await.unwrap();
        assert_eq!(repo.list_carriers().await.unwrap(), registered);
    }

    #[tokio::test]
    async fn test_credential_round_trip() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.carriers();

        let mut credential = Credential::new("123", "password");
        repo.save_credential(&mut credential).await.unwrap();
        credential.password = "rotated".to_string();
        repo.save_credential(&mut credential).await.unwrap();

        let loaded = repo.credential(credential.id.unwrap()).await.unwrap();
        assert_eq!(loaded.password, "rotated");
    }

    #[tokio::test]
    async fn test_missing_service() {
        let db = Database::in_memory().await.unwrap();
        let err = db.carriers().service(ServiceId(7)).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { id: 7, .. }));
    }
}
