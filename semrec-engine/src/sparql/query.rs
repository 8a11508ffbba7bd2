//! Related-resource query construction

use crate::types::SourceIdentifier;

/// Placeholder replaced by the source identifier (without angle brackets)
pub const URI_PLACEHOLDER: &str = "{uri}";
/// Placeholder replaced by the result limit
pub const LIMIT_PLACEHOLDER: &str = "{limit}";

pub const DEFAULT_LIMIT: u32 = 100;

/// Resources sharing a subject term with the source; each shared term yields
/// one result row, so the occurrence count of a candidate is its overlap.
pub const DEFAULT_TEMPLATE: &str = "PREFIX dct: <http://purl.org/dc/terms/>
SELECT ?related WHERE {
  <{uri}> dct:subject ?subject .
  ?related dct:subject ?subject .
  FILTER (isIRI(?related) && ?related != <{uri}>)
}
LIMIT {limit}";

/// SPARQL SELECT template for one source identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedQuery {
    template: String,
    limit: u32,
}

impl RelatedQuery {
    /// Returns `None` when the template has no `{uri}` placeholder
    pub fn new(template: impl Into<String>, limit: u32) -> Option<Self> {
        let template = template.into();
        if !template.contains(URI_PLACEHOLDER) {
            return None;
        }
        Some(Self { template, limit })
    }

    /// Query text for `source`
    ///
    /// `SourceIdentifier` guarantees the value cannot break out of `<...>`.
    pub fn render(&self, source: &SourceIdentifier) -> String {
        self.template
            .replace(URI_PLACEHOLDER, source.as_str())
            .replace(LIMIT_PLACEHOLDER, &self.limit.to_string())
    }
}

impl Default for RelatedQuery {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_renders_identifier() {
        let source = SourceIdentifier::parse("http://ex/1").unwrap();
        let query = RelatedQuery::default().render(&source);

        assert!(query.contains("<http://ex/1> dct:subject ?subject"));
        assert!(query.contains("?related != <http://ex/1>"));
        assert!(query.ends_with("LIMIT 100"));
        assert!(!query.contains(URI_PLACEHOLDER));
    }

    #[test]
    fn test_custom_template_and_limit() {
        let source = SourceIdentifier::parse("http://ex/2").unwrap();
        let query = RelatedQuery::new("SELECT ?x WHERE { ?x ?p <{uri}> } LIMIT {limit}", 7).unwrap();

        assert_eq!(
            query.render(&source),
            "SELECT ?x WHERE { ?x ?p <http://ex/2> } LIMIT 7"
        );
    }

    #[test]
    fn test_template_without_uri_placeholder_rejected() {
        assert!(RelatedQuery::new("SELECT * WHERE { ?s ?p ?o }", 10).is_none());
    }
}
