//! Address storage repository.

use sqlx::Row;
use sqlx::sqlite::SqlitePool;

use super::model::{Address, AddressId};
use crate::{Error, Result};

/// Repository for address storage and retrieval.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize database schema.
    pub(crate) async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS addresses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                company_name TEXT NOT NULL DEFAULT '',
                street1 TEXT NOT NULL DEFAULT '',
                street2 TEXT NOT NULL DEFAULT '',
                street3 TEXT NOT NULL DEFAULT '',
                zip_code TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                country TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Save an address (insert or update).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save(&self, address: &mut Address) -> Result<()> {
        if let Some(id) = address.id {
            sqlx::query(
                r"
                UPDATE addresses SET
                    first_name = ?, last_name = ?, company_name = ?,
                    street1 = ?, street2 = ?, street3 = ?,
                    zip_code = ?, state = ?, city = ?, country = ?
                WHERE id = ?
                ",
            )
            .bind(&address.first_name)
            .bind(&address.last_name)
            .bind(&address.company_name)
            .bind(&address.street1)
            .bind(&address.street2)
            .bind(&address.street3)
            .bind(&address.zip_code)
            .bind(&address.state)
            .bind(&address.city)
            .bind(&address.country)
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        } else {
            let result = sqlx::query(
                r"
                INSERT INTO addresses (
                    first_name, last_name, company_name,
                    street1, street2, street3,
                    zip_code, state, city, country
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(&address.first_name)
            .bind(&address.last_name)
            .bind(&address.company_name)
            .bind(&address.street1)
            .bind(&address.street2)
            .bind(&address.street3)
            .bind(&address.zip_code)
            .bind(&address.state)
            .bind(&address.city)
            .bind(&address.country)
            .execute(&self.pool)
            .await?;

            address.id = Some(AddressId::new(result.last_insert_rowid()));
        }

        Ok(())
    }

    /// Get address by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>> {
        let row = sqlx::query(
            r"
            SELECT id, first_name, last_name, company_name,
                   street1, street2, street3, zip_code, state, city, country
            FROM addresses
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_address))
    }

    /// List all addresses by last name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Address>> {
        let rows = sqlx::query(
            r"
            SELECT id, first_name, last_name, company_name,
                   street1, street2, street3, zip_code, state, city, country
            FROM addresses
            ORDER BY last_name ASC, first_name ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_address).collect())
    }

    /// Get address by ID, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if no address has this ID.
    pub async fn require(&self, id: AddressId) -> Result<Address> {
        self.get(id).await?.ok_or(Error::RecordNotFound {
            kind: "Address",
            id: id.0,
        })
    }
}

fn row_to_address(row: &sqlx::sqlite::SqliteRow) -> Address {
    Address {
        id: Some(AddressId::new(row.get("id"))),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        company_name: row.get("company_name"),
        street1: row.get("street1"),
        street2: row.get("street2"),
        street3: row.get("street3"),
        zip_code: row.get("zip_code"),
        state: row.get("state"),
        city: row.get("city"),
        country: row.get("country"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::Database;

    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.addresses();

        let mut address = Address::new("Shipping", "services", "75000", "Paris", "FRA")
            .with_company("Acme")
            .with_street("1 company street", "", "");
        repo.save(&mut address).await.unwrap();
        assert!(address.id.is_some());

        let loaded = repo.get(address.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded, address);
    }

    #[tokio::test]
    async fn test_update() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.addresses();

        let mut address = Address::new("Jon", "Doe", "66000", "Perpignan", "FRA");
        repo.save(&mut address).await.unwrap();

        address.city = "Narbonne".to_string();
        repo.save(&mut address).await.unwrap();

        let loaded = repo.require(address.id.unwrap()).await.unwrap();
        assert_eq!(loaded.city, "Narbonne");
        assert_eq!(repo.list().await.unwrap(), vec![loaded]);
    }

    #[tokio::test]
    async fn test_require_missing() {
        let db = Database::in_memory().await.unwrap();
        let err = db.addresses().require(AddressId::new(42)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::RecordNotFound {
                kind: "Address",
                id: 42
            }
        ));
    }
}
