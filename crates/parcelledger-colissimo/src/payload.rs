//! Label request body of the `generateLabel` service.

use chrono::NaiveDate;
use parcelledger_core::ShipmentContext;
use parcelledger_core::address::{Address, country};
use serde::Serialize;
use serde_json::Value;

use crate::config::ColissimoConfig;
use crate::error::{Error, Result};

/// Request keys holding credentials, dropped from recorded requests.
const CREDENTIAL_KEYS: [&str; 2] = ["contractNumber", "password"];

/// `generateLabel` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    /// Colissimo contract number.
    pub contract_number: String,
    /// Web service password.
    pub password: String,
    /// Label printing settings.
    pub output_format: OutputFormat,
    /// Shipment description.
    pub letter: Letter,
}

/// Label printing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFormat {
    /// Horizontal offset.
    pub x: String,
    /// Vertical offset.
    pub y: String,
    /// Label format, e.g. `PDF_A4_300dpi`.
    pub output_printing_type: String,
}

/// Shipment description of a label request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Letter {
    /// Product and deposit information.
    pub service: LetterService,
    /// Parcel characteristics.
    pub parcel: Parcel,
    /// Sender.
    pub sender: Party,
    /// Recipient.
    pub addressee: Party,
}

/// Product and deposit information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterService {
    /// Colissimo product code, e.g. `DOM`.
    pub product_code: String,
    /// Deposit date, `YYYY-MM-DD`.
    pub deposit_date: String,
    /// Order reference printed on the label.
    pub order_number: String,
}

/// Parcel characteristics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parcel {
    /// Weight in kilograms.
    pub weight: String,
}

/// Sender or addressee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Party {
    /// Postal address.
    pub address: PartyAddress,
}

/// Postal address in Colissimo's line layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyAddress {
    /// Company name.
    pub company_name: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Apartment, floor.
    pub line0: String,
    /// Building, entrance.
    pub line1: String,
    /// Street.
    pub line2: String,
    /// Locality, P.O. box.
    pub line3: String,
    /// ISO 3166 alpha-2 country code.
    pub country_code: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub zip_code: String,
}

impl PartyAddress {
    /// Maps a stored address, reducing its country to two letters.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCountry` if the country code is not known.
    pub fn from_address(address: &Address) -> Result<Self> {
        let country_code = country::alpha_2(&address.country)
            .ok_or_else(|| Error::UnknownCountry(address.country.clone()))?;

        Ok(Self {
            company_name: address.company_name.clone(),
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            line0: String::new(),
            line1: String::new(),
            line2: address.street1.clone(),
            line3: address.street2.clone(),
            country_code: country_code.to_string(),
            city: address.city.trim().to_string(),
            zip_code: address.zip_code.trim().to_string(),
        })
    }
}

impl LabelRequest {
    /// Builds the request for a shipment deposited on `deposit_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if an address country cannot be mapped.
    pub fn new(
        context: &ShipmentContext,
        config: &ColissimoConfig,
        deposit_date: NaiveDate,
    ) -> Result<Self> {
        Ok(Self {
            contract_number: context.credential.account_number.clone(),
            password: context.credential.password.clone(),
            output_format: OutputFormat {
                x: "0".to_string(),
                y: "0".to_string(),
                output_printing_type: config.output_printing_type.clone(),
            },
            letter: Letter {
                service: LetterService {
                    product_code: context.service.product_code.clone(),
                    deposit_date: deposit_date.format("%Y-%m-%d").to_string(),
                    order_number: context.shipment.order_number(),
                },
                parcel: Parcel {
                    weight: config.weight.to_string(),
                },
                sender: Party {
                    address: PartyAddress::from_address(&context.sender)?,
                },
                addressee: Party {
                    address: PartyAddress::from_address(&context.recipient)?,
                },
            },
        })
    }

    /// The request as recorded on the shipment, without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn redacted(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            for key in CREDENTIAL_KEYS {
                object.remove(key);
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parcelledger_core::{
        AddressId, CarrierId, CarrierKind, CarrierService, Credential, CredentialId, ServiceId,
        Shipment,
    };
    use serde_json::json;

    use super::*;

    fn context() -> ShipmentContext {
        ShipmentContext {
            shipment: Shipment::new(
                ServiceId(1),
                AddressId::new(1),
                AddressId::new(2),
                "ORDERXXXXXXXXXX",
                "PACKXXXXXXXXXX",
            ),
            sender: Address::new("Jon", "Doe", " 66000 ", " Perpignan ", "FRA")
                .with_company("Acme")
                .with_street("1 street", "crossroad", "ignored"),
            recipient: Address::new("Jon", "Doe", "66000", "Perpignan", "fr")
                .with_street("2 street", "", ""),
            service: CarrierService::new(
                "Livraison à domicile",
                "DOM",
                CarrierKind::Colissimo,
                CarrierId(1),
                CredentialId(1),
            ),
            credential: Credential::new("123", "password"),
        }
    }

    fn deposit_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn maps_shipment() {
        let request =
            LabelRequest::new(&context(), &ColissimoConfig::default(), deposit_date()).unwrap();

        assert_eq!(request.contract_number, "123");
        assert_eq!(request.letter.service.product_code, "DOM");
        assert_eq!(request.letter.service.deposit_date, "2024-03-01");
        assert_eq!(
            request.letter.service.order_number,
            "ORDERXXXXXXXXXX PACKXXXXXXXXXX"
        );
        assert_eq!(request.letter.parcel.weight, "0.3");

        let sender = &request.letter.sender.address;
        assert_eq!(sender.country_code, "FR");
        assert_eq!(sender.city, "Perpignan");
        assert_eq!(sender.zip_code, "66000");
        assert_eq!(sender.line2, "1 street");
        assert_eq!(sender.line3, "crossroad");
        assert_eq!(sender.company_name, "Acme");

        let addressee = &request.letter.addressee.address;
        assert_eq!(addressee.country_code, "FR");
        assert_eq!(addressee.company_name, "");
        assert_eq!(addressee.line3, "");
    }

    #[test]
    fn serialized_layout() {
        let request =
            LabelRequest::new(&context(), &ColissimoConfig::default(), deposit_date()).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["outputFormat"],
            json!({"x": "0", "y": "0", "outputPrintingType": "PDF_A4_300dpi"})
        );
        assert_eq!(
            value["letter"]["addressee"]["address"],
            json!({
                "companyName": "",
                "firstName": "Jon",
                "lastName": "Doe",
                "line0": "",
                "line1": "",
                "line2": "2 street",
                "line3": "",
                "countryCode": "FR",
                "city": "Perpignan",
                "zipCode": "66000"
            })
        );
        assert_eq!(value["contractNumber"], "123");
        assert_eq!(value["password"], "password");
    }

    #[test]
    fn redacted_drops_credentials() {
        let request =
            LabelRequest::new(&context(), &ColissimoConfig::default(), deposit_date()).unwrap();
        let value = request.redacted().unwrap();

        assert!(value.get("contractNumber").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["letter"]["service"]["productCode"], "DOM");
    }

    #[test]
    fn unknown_country() {
        let mut context = context();
        context.recipient.country = "XYZ".to_string();

        let err = LabelRequest::new(&context, &ColissimoConfig::default(), deposit_date())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCountry(ref code) if code == "XYZ"));
    }
}
