//! Address model types.

use serde::{Deserialize, Serialize};

use super::country;
use crate::{Error, Result};

/// Unique identifier for an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressId(pub i64);

impl AddressId {
    /// Create a new address ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Unique identifier (None for unsaved addresses).
    pub id: Option<AddressId>,
    /// Contact first name.
    pub first_name: String,
    /// Contact last name.
    pub last_name: String,
    /// Company name, empty for private persons.
    pub company_name: String,
    /// First street line.
    pub street1: String,
    /// Second street line.
    pub street2: String,
    /// Third street line.
    pub street3: String,
    /// Postal code.
    pub zip_code: String,
    /// State or region.
    pub state: String,
    /// City name.
    pub city: String,
    /// ISO 3166 country code, alpha-3 (`FRA`) or alpha-2 (`FR`).
    pub country: String,
}

impl Address {
    /// Create a new address for a person in the given city and country.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        zip_code: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            zip_code: zip_code.into(),
            city: city.into(),
            country: country.into(),
            ..Default::default()
        }
    }

    /// Set the company name.
    #[must_use]
    pub fn with_company(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = company_name.into();
        self
    }

    /// Set the street lines.
    #[must_use]
    pub fn with_street(
        mut self,
        street1: impl Into<String>,
        street2: impl Into<String>,
        street3: impl Into<String>,
    ) -> Self {
        self.street1 = street1.into();
        self.street2 = street2.into();
        self.street3 = street3.into();
        self
    }

    /// Set the state or region.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Returns the two-letter country code.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCountry` if the stored code is not known.
    pub fn country_alpha_2(&self) -> Result<&'static str> {
        country::alpha_2(&self.country).ok_or_else(|| Error::UnknownCountry(self.country.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let address = Address::new("Jon", "Doe", "66000", "Perpignan", "FRA")
            .with_street("1 street", "crossroad", "")
            .with_state("A region");

        assert!(address.id.is_none());
        assert!(address.company_name.is_empty());
        assert_eq!(address.street2, "crossroad");
        assert_eq!(address.state, "A region");
    }

    #[test]
    fn country_alpha_2_from_alpha_3() {
        let address = Address::new("Jon", "Doe", "75000", "Paris", "FRA");
        assert_eq!(address.country_alpha_2().unwrap(), "FR");
    }

    #[test]
    fn unknown_country_is_an_error() {
        let address = Address::new("Jon", "Doe", "0", "Nowhere", "XXX");
        assert!(matches!(
            address.country_alpha_2(),
            Err(Error::UnknownCountry(code)) if code == "XXX"
        ));
    }
}
