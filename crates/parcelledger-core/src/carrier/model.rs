//! Carrier model types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarrierId(pub i64);

/// Unique identifier for a set of carrier credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(pub i64);

/// Unique identifier for a carrier service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub i64);

/// Supported carrier implementations.
///
/// Every carrier service is tagged with the kind of carrier able to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarrierKind {
    /// La Poste Colissimo.
    Colissimo,
}

impl CarrierKind {
    /// All supported carriers.
    pub const ALL: &'static [Self] = &[Self::Colissimo];

    /// Stable carrier code, as stored in the database.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Colissimo => "COLISSIMO",
        }
    }

    /// Get display name for the carrier.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Colissimo => "Colissimo",
        }
    }

    /// Look up a carrier by its code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl std::fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A carrier company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierRecord {
    /// Unique identifier (None for unsaved carriers).
    pub id: Option<CarrierId>,
    /// Display name.
    pub name: String,
    /// Carrier implementation.
    pub kind: CarrierKind,
}

impl CarrierRecord {
    /// Create an unsaved carrier record for a supported carrier.
    #[must_use]
    pub fn new(kind: CarrierKind) -> Self {
        Self {
            id: None,
            name: kind.display_name().to_string(),
            kind,
        }
    }

    /// Carrier code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Account credentials for a carrier web service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier (None for unsaved credentials).
    pub id: Option<CredentialId>,
    /// Contract or account number.
    pub account_number: String,
    /// Web service password.
    pub password: String,
}

impl Credential {
    /// Create unsaved credentials.
    #[must_use]
    pub fn new(account_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            account_number: account_number.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("account_number", &self.account_number)
            .field("password", &"********")
            .finish()
    }
}

/// A shipping product offered by a carrier, e.g. home delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierService {
    /// Unique identifier (None for unsaved services).
    pub id: Option<ServiceId>,
    /// Display name.
    pub name: String,
    /// Carrier product code sent with label requests.
    pub product_code: String,
    /// Carrier able to handle this service.
    pub kind: CarrierKind,
    /// Owning carrier.
    pub carrier_id: CarrierId,
    /// Credentials used to call the carrier.
    pub credential_id: CredentialId,
}

impl CarrierService {
    /// Create an unsaved service for a saved carrier and credential.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        product_code: impl Into<String>,
        kind: CarrierKind,
        carrier_id: CarrierId,
        credential_id: CredentialId,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            product_code: product_code.into(),
            kind,
            carrier_id,
            credential_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_codes() {
        assert_eq!(CarrierKind::Colissimo.code(), "COLISSIMO");
        assert_eq!(CarrierKind::Colissimo.display_name(), "Colissimo");
        assert_eq!(CarrierKind::from_code("colissimo"), Some(CarrierKind::Colissimo));
        assert_eq!(CarrierKind::from_code("UPS"), None);
    }

    #[test]
    fn new_carrier_uses_display_name() {
        let carrier = CarrierRecord::new(CarrierKind::Colissimo);
        assert_eq!(carrier.name, "Colissimo");
        assert_eq!(carrier.code(), "COLISSIMO");
    }

    #[test]
    fn credential_debug_hides_password() {
        let credential = Credential::new("123", "hunter2");
        let debug = format!("{credential:?}");
        assert!(debug.contains("123"));
        assert!(!debug.contains("hunter2"));
    }
}
