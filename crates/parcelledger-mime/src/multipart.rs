//! Multipart body decoding (RFC 2046 section 5.1).
//!
//! Bodies are handled as raw bytes because carrier responses mix JSON parts
//! with binary label documents.

use crate::content_type::ContentType;
use crate::encoding::TransferEncoding;
use crate::error::{Error, Result};
use crate::header::Headers;

/// A single part of a multipart body.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body (raw bytes, still transfer-encoded).
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Gets the content type, if the part declares a valid one.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.headers
            .get("content-type")
            .and_then(|value| ContentType::parse(value).ok())
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::Binary, TransferEncoding::parse)
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        self.transfer_encoding().decode(&self.body)
    }

    /// Gets the decoded body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        let decoded = self.decode_body()?;
        String::from_utf8(decoded).map_err(Into::into)
    }
}

/// A decoded multipart body.
#[derive(Debug, Clone, Default)]
pub struct Multipart {
    /// Parts in the order they appear.
    pub parts: Vec<Part>,
}

impl Multipart {
    /// Parses a multipart body using the boundary from a `Content-Type`
    /// header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is not multipart, has no
    /// boundary, or the body is not delimited by that boundary.
    pub fn parse(content_type: &str, body: &[u8]) -> Result<Self> {
        let content_type = ContentType::parse(content_type)?;
        if !content_type.is_multipart() {
            return Err(Error::InvalidContentType(format!(
                "Expected multipart, got {}",
                content_type.essence()
            )));
        }
        let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
        Self::parse_with_boundary(boundary, body)
    }

    /// Parses a multipart body with an explicit boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is empty or the body is malformed.
    pub fn parse_with_boundary(boundary: &str, body: &[u8]) -> Result<Self> {
        if boundary.is_empty() {
            return Err(Error::MissingBoundary);
        }

        let delimiter = format!("--{boundary}").into_bytes();
        let (_, mut pos) = find_delimiter(body, &delimiter, 0).ok_or_else(|| {
            Error::InvalidMultipart(format!("Boundary {boundary:?} not found in body"))
        })?;

        let mut parts = Vec::new();
        loop {
            pos += delimiter.len();

            if body[pos..].starts_with(b"--") {
                break;
            }

            // Rest of the delimiter line (transport padding) is ignored
            let content_start = match find(body, b"\n", pos) {
                Some(eol) => eol + 1,
                None => {
                    return Err(Error::InvalidMultipart(
                        "Truncated delimiter line".to_string(),
                    ));
                }
            };

            let (content_end, next) = find_delimiter(body, &delimiter, content_start)
                .ok_or_else(|| Error::InvalidMultipart("Missing closing boundary".to_string()))?;

            parts.push(split_part(&body[content_start..content_end]));
            pos = next;
        }

        Ok(Self { parts })
    }

    /// Returns the first part matching the predicate on its content type.
    pub fn find_part(&self, predicate: impl Fn(&ContentType) -> bool) -> Option<&Part> {
        self.parts
            .iter()
            .find(|part| part.content_type().is_some_and(|ct| predicate(&ct)))
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if there are no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Splits a raw part into headers and body at the first blank line.
fn split_part(raw: &[u8]) -> Part {
    if raw.starts_with(b"\r\n") {
        return Part::new(Headers::new(), raw[2..].to_vec());
    }
    if raw.starts_with(b"\n") {
        return Part::new(Headers::new(), raw[1..].to_vec());
    }

    let crlf = find(raw, b"\r\n\r\n", 0).map(|i| (i, i + 4));
    let lf = find(raw, b"\n\n", 0).map(|i| (i, i + 2));
    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((header_end, body_start)) => Part::new(
            Headers::parse(&raw[..header_end]),
            raw[body_start..].to_vec(),
        ),
        None => Part::new(Headers::parse(raw), Vec::new()),
    }
}

/// Finds the next delimiter that starts a line, at or after `from`.
///
/// Returns where the line break before the delimiter starts, which ends the
/// preceding part, and where the delimiter itself starts.
fn find_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut search = from;
    while let Some(at) = find(body, delimiter, search) {
        if at == 0 {
            return Some((0, 0));
        }
        if body[at - 1] == b'\n' {
            let line_start = if at >= 2 && body[at - 2] == b'\r' {
                at - 2
            } else {
                at - 1
            };
            return Some((line_start.max(from), at));
        }
        search = at + 1;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}
