//! Core data types for the recommendation pipeline
//!
//! - `SourceIdentifier`: validated input URI, the unit of work
//! - `Recommendation`: weighted (source, target) pair produced by a querier
//! - `OccurrenceTally`: per-identifier count of candidate URIs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Characters that cannot appear inside a SPARQL IRI reference (`<...>`)
const FORBIDDEN_IRI_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '^', '`', '\\'];

/// Identifier validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid source identifier '{identifier}': {reason}")]
pub struct InvalidIdentifier {
    pub identifier: String,
    pub reason: String,
}

/// Source URI to compute recommendations for
///
/// Kept verbatim as read from input (no normalization); validation only checks
/// that it is an absolute URI that can be embedded in a SPARQL query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceIdentifier(String);

impl SourceIdentifier {
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let invalid = |reason: &str| InvalidIdentifier {
            identifier: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("empty identifier"));
        }

        if raw
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_IRI_CHARS.contains(&c))
        {
            return Err(invalid("contains characters not allowed in an IRI"));
        }

        url::Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One related resource for a source identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub source: SourceIdentifier,
    pub target: String,
    /// Occurrences of `target` across the responses for `source` (always >= 1)
    pub weight: u32,
}

/// Occurrence count per candidate URI
///
/// Counts accumulate: recording the same URI again, or absorbing another tally,
/// adds to the existing count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceTally {
    counts: HashMap<String, u32>,
}

impl OccurrenceTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `uri`
    pub fn record(&mut self, uri: impl Into<String>) {
        *self.counts.entry(uri.into()).or_insert(0) += 1;
    }

    /// Add every count of `other` into this tally
    pub fn absorb(&mut self, other: OccurrenceTally) {
        for (uri, count) in other.counts {
            *self.counts.entry(uri).or_insert(0) += count;
        }
    }

    pub fn get(&self, uri: &str) -> u32 {
        self.counts.get(uri).copied().unwrap_or(0)
    }

    /// Number of distinct URIs
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Convert to one recommendation per distinct URI
    ///
    /// Emitted by descending weight, then target, so output files are reproducible.
    pub fn into_recommendations(self, source: &SourceIdentifier) -> Vec<Recommendation> {
        let mut entries: Vec<(String, u32)> = self.counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        entries
            .into_iter()
            .map(|(target, weight)| Recommendation {
                source: source.clone(),
                target,
                weight,
            })
            .collect()
    }
}

impl FromIterator<String> for OccurrenceTally {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut tally = Self::new();
        for uri in iter {
            tally.record(uri);
        }
        tally
    }
}
