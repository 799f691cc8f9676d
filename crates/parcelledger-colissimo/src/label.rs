//! `generateLabel` response decoding.
//!
//! Colissimo answers with a multipart body holding a JSON info part and,
//! on success, the label document as an octet-stream part.

use bytes::Bytes;
use parcelledger_mime::{ContentType, Multipart};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Raw HTTP reply of the label service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelReply {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: String,
    /// Response body.
    pub body: Bytes,
}

/// Decoded parts of a label reply.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelParts {
    /// Label document, empty if none was returned.
    pub document: Bytes,
    /// Info payload, an empty object if none was returned.
    pub infos: Value,
}

/// Accepted label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Label document.
    pub document: Bytes,
    /// Info payload.
    pub infos: Value,
    /// Parcel number assigned by Colissimo.
    pub parcel_number: String,
}

impl LabelReply {
    /// Splits the body into document and info payload.
    ///
    /// Plain JSON bodies are accepted as an info payload without document.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is neither valid multipart nor JSON.
    pub fn parts(&self) -> Result<LabelParts> {
        let content_type = ContentType::parse(&self.content_type)?;

        if content_type.is_json() {
            return Ok(LabelParts {
                document: Bytes::new(),
                infos: serde_json::from_slice(&self.body)?,
            });
        }

        let multipart = Multipart::parse(&self.content_type, &self.body)?;
        debug!("Label reply has {} parts", multipart.len());

        let document = match multipart.find_part(ContentType::is_octet_stream) {
            Some(part) => Bytes::from(part.decode_body()?),
            None => Bytes::new(),
        };
        let infos = match multipart.find_part(ContentType::is_json) {
            Some(part) => serde_json::from_slice(&part.decode_body()?)?,
            None => Value::Object(Map::new()),
        };

        Ok(LabelParts { document, infos })
    }

    /// Interprets the reply according to its status code.
    ///
    /// # Errors
    ///
    /// Returns `Error::Rejected` for 400 and 500, `Error::UnexpectedStatus`
    /// for anything but 200, and `Error::MissingField` if an accepted label
    /// has no parcel number.
    pub fn into_label(self) -> Result<Label> {
        match self.status {
            400 | 500 => {
                let messages = self
                    .parts()
                    .ok()
                    .and_then(|parts| parts.infos.get("messages").cloned())
                    .unwrap_or(Value::Null);
                Err(Error::Rejected {
                    status: self.status,
                    messages,
                })
            }
            200 => {
                let LabelParts { document, infos } = self.parts()?;
                let parcel_number = infos
                    .get("labelResponse")
                    .and_then(|response| response.get("parcelNumber"))
                    .and_then(Value::as_str)
                    .ok_or(Error::MissingField("labelResponse.parcelNumber"))?
                    .to_string();
                Ok(Label {
                    document,
                    infos,
                    parcel_number,
                })
            }
            status => Err(Error::UnexpectedStatus(status)),
        }
    }
}
