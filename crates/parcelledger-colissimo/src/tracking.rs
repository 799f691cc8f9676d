//! Tracking service response decoding.
//!
//! The response is a SOAP envelope:
//!
//! ```text
//! <soap:Envelope>
//!   <soap:Body>
//!     <ns1:trackResponse>
//!       <return>
//!         <errorCode>0</errorCode>
//!         <eventCode>DEPGUI</eventCode>
//!         ...
//! ```
//!
//! Only the first child is followed at each level, and the leaf children of
//! `return` are collected into a tag to text map.

use std::collections::HashMap;

use parcelledger_core::TrackingEvent;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};

/// Depth of the element whose children hold the tracking fields, the root
/// element being at depth 1.
const FIELDS_PARENT_DEPTH: usize = 4;

/// Tracking fields of a response, keyed by local tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingFields(HashMap<String, String>);

impl TrackingFields {
    /// Parses a tracking response body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Xml` if the body is not well-formed or does not nest
    /// deep enough.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        // Children seen so far at each open depth, and whether the open
        // element at each depth lies on the first-child path.
        let mut child_counts: Vec<usize> = vec![0];
        let mut on_path: Vec<bool> = vec![true];
        let mut current: Option<(String, String)> = None;
        let mut fields = HashMap::new();
        let mut reached = false;

        loop {
            match reader.read_event().map_err(|e| xml_error(&reader, &e))? {
                Event::Start(element) => {
                    let name = local_name(element.local_name().as_ref());
                    let depth = child_counts.len();
                    let index = child_counts[depth - 1];
                    child_counts[depth - 1] += 1;

                    let parent_on_path = on_path[depth - 1];
                    let followed = parent_on_path && (depth > FIELDS_PARENT_DEPTH || index == 0);
                    if depth == FIELDS_PARENT_DEPTH && followed {
                        reached = true;
                    }
                    if depth == FIELDS_PARENT_DEPTH + 1 && parent_on_path {
                        current = Some((name, String::new()));
                    }

                    child_counts.push(0);
                    on_path.push(followed && depth <= FIELDS_PARENT_DEPTH);
                }
                Event::Empty(element) => {
                    let depth = child_counts.len();
                    child_counts[depth - 1] += 1;
                    if depth == FIELDS_PARENT_DEPTH + 1 && on_path[depth - 1] {
                        fields.insert(local_name(element.local_name().as_ref()), String::new());
                    }
                }
                Event::Text(text) => {
                    if let Some((_, value)) = current.as_mut()
                        && child_counts.len() == FIELDS_PARENT_DEPTH + 2
                    {
                        let text = text.unescape().map_err(|e| xml_error(&reader, &e))?;
                        value.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some((_, value)) = current.as_mut()
                        && child_counts.len() == FIELDS_PARENT_DEPTH + 2
                    {
                        value.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    let depth = child_counts.len() - 1;
                    if depth == FIELDS_PARENT_DEPTH + 1
                        && let Some((name, value)) = current.take()
                    {
                        fields.insert(name, value);
                    }
                    child_counts.pop();
                    on_path.pop();
                    if child_counts.is_empty() {
                        return Err(Error::Xml("unbalanced closing tag".to_string()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !reached {
            return Err(Error::Xml(format!(
                "expected {FIELDS_PARENT_DEPTH} nested elements"
            )));
        }
        Ok(Self(fields))
    }

    /// Value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn require(&self, name: &'static str) -> Result<&str> {
        self.get(name).ok_or(Error::MissingField(name))
    }

    /// Converts the fields into the reported event.
    ///
    /// # Errors
    ///
    /// Returns `Error::Tracking` if `errorCode` is not `0`, and
    /// `Error::MissingField` if a required field is absent.
    pub fn into_event(self) -> Result<TrackingEvent> {
        let code = self.require("errorCode")?;
        if code != "0" {
            return Err(Error::Tracking {
                code: code.to_string(),
                message: self.get("errorMessage").unwrap_or_default().to_string(),
            });
        }

        Ok(TrackingEvent {
            event_date: self.require("eventDate")?.to_string(),
            event_code: self.require("eventCode")?.to_string(),
            event_libelle: self.get("eventLibelle").unwrap_or_default().to_string(),
        })
    }
}

fn local_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn xml_error(reader: &Reader<&[u8]>, error: &quick_xml::Error) -> Error {
    Error::Xml(format!(
        "at position {}: {error}",
        reader.buffer_position()
    ))
}
