//! SPARQL XML result parsing
//!
//! Extracts the text of every `uri` element in a result document. Matching is
//! on the exact, case-sensitive element name with no namespace handling, so
//! `<binding><uri>..</uri></binding>` matches and `<x:uri>` or `<URI>` do not.
//!
//! Two output shapes are offered:
//! - set mode (`collect_uri_set`): distinct URIs
//! - count mode (`count_uris`, `merge`): occurrences per URI, cumulative across calls
//!
//! A document is fully parsed before any output container is touched, so a
//! malformed document never leaves partial counts behind.

use crate::types::OccurrenceTally;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use thiserror::Error;

const URI_ELEMENT: &[u8] = b"uri";

/// Response handling errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Document is not well-formed XML
    #[error("Malformed XML response: {0}")]
    Parse(String),

    /// Caller passed no document to parse
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// All `uri` element values in document order, duplicates included
pub fn extract_uris(document: &str) -> Result<Vec<String>, ResponseError> {
    if document.trim().is_empty() {
        return Err(ResponseError::InvalidArgument(
            "response document is empty".to_string(),
        ));
    }

    let mut reader = Reader::from_str(document);
    let mut uris = Vec::new();
    let mut current: Option<String> = None;
    let mut depth: usize = 0;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ResponseError::Parse(e.to_string()))?;

        if matches!(event, Event::Start(_) | Event::Empty(_)) && depth == 0 && seen_root {
            return Err(ResponseError::Parse("multiple root elements".to_string()));
        }

        match event {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                if e.name().as_ref() == URI_ELEMENT {
                    current = Some(String::new());
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == URI_ELEMENT {
                    if let Some(value) = current.take() {
                        let value = value.trim();
                        if !value.is_empty() {
                            uris.push(value.to_string());
                        }
                    }
                }
            }
            Event::Empty(_) => {
                seen_root = true;
            }
            Event::Text(t) => {
                if depth == 0 {
                    if t.iter().any(|b| !b.is_ascii_whitespace()) {
                        return Err(ResponseError::Parse(
                            "text content outside the root element".to_string(),
                        ));
                    }
                } else if let Some(value) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| ResponseError::Parse(e.to_string()))?;
                    value.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(value) = current.as_mut() {
                    let text = std::str::from_utf8(&c)
                        .map_err(|e| ResponseError::Parse(e.to_string()))?;
                    value.push_str(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ResponseError::Parse(format!(
            "document ended with {} unclosed element(s)",
            depth
        )));
    }
    if !seen_root {
        return Err(ResponseError::Parse("document has no root element".to_string()));
    }

    Ok(uris)
}

/// Add the distinct URIs of `document` to `out`
pub fn collect_uri_set(document: &str, out: &mut HashSet<String>) -> Result<(), ResponseError> {
    let uris = extract_uris(document)?;
    out.extend(uris);
    Ok(())
}

/// Add the URI occurrences of `document` to `tally`
pub fn count_uris(document: &str, tally: &mut OccurrenceTally) -> Result<(), ResponseError> {
    let uris = extract_uris(document)?;
    for uri in uris {
        tally.record(uri);
    }
    Ok(())
}

/// Fold one document into a tally
pub fn merge(mut tally: OccurrenceTally, document: &str) -> Result<OccurrenceTally, ResponseError> {
    count_uris(document, &mut tally)?;
    Ok(tally)
}
