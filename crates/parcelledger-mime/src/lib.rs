//! # parcelledger-mime
//!
//! Multipart body decoding for carrier web service responses.
//!
//! ## Features
//!
//! - **Multipart parsing**: Split `multipart/*` bodies into parts on raw bytes
//! - **Content types**: Parse `type/subtype; param=value` headers
//! - **Transfer encodings**: Binary, Base64 and Quoted-Printable part bodies
//!
//! ## Quick Start
//!
//! ```ignore
//! use parcelledger_mime::{ContentType, Multipart};
//!
//! let multipart = Multipart::parse(content_type_header, &body)?;
//!
//! let infos = multipart.find_part(ContentType::is_json);
//! let label = multipart.find_part(ContentType::is_octet_stream);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod multipart;

pub mod encoding;

pub use content_type::ContentType;
pub use encoding::TransferEncoding;
pub use error::{Error, Result};
pub use header::Headers;
pub use multipart::{Multipart, Part};
