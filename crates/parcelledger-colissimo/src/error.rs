//! Error types for the Colissimo integration.

use parcelledger_core::CarrierError;
use serde_json::Value;

/// Result type alias for Colissimo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Colissimo error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tracking response is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Label response is not a valid multipart body.
    #[error("Multipart error: {0}")]
    Multipart(#[from] parcelledger_mime::Error),

    /// Label request refused by Colissimo.
    #[error("Label rejected with status {status}: {messages}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// `messages` entry of the info payload, `null` if absent.
        messages: Value,
    },

    /// Tracking service returned a non-zero error code.
    #[error("Tracking error {code}: {message}")]
    Tracking {
        /// `errorCode` of the response.
        code: String,
        /// `errorMessage` of the response.
        message: String,
    },

    /// Label service answered with a status outside 200, 400 and 500.
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(u16),

    /// A required response field is missing.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// Address country has no two-letter code.
    #[error("Unknown country code: {0}")]
    UnknownCountry(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<Error> for CarrierError {
    fn from(error: Error) -> Self {
        match error {
            Error::Rejected { status, messages } => Self::Rejected { status, messages },
            Error::Tracking { code, message } => Self::Tracking { code, message },
            Error::UnexpectedStatus(status) => Self::UnexpectedStatus(status),
            Error::Http(e) => Self::Transport(Box::new(e)),
            Error::UnknownCountry(code) => {
                Self::InvalidRequest(format!("unknown country code {code:?}"))
            }
            Error::Url(e) => Self::InvalidRequest(e.to_string()),
            e @ (Error::Json(_) | Error::Xml(_) | Error::Multipart(_) | Error::MissingField(_)) => {
                Self::InvalidResponse(e.to_string())
            }
        }
    }
}
