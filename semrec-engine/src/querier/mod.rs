//! Querier strategies
//!
//! A querier turns one source identifier into recommendations. The variant is
//! chosen once per run from the `type_recommendation` flag:
//! - **Federated**: one query to a federation-aware endpoint, which fans out itself
//! - **SingleEndpoint**: one query to a plain triple store
//! - **Individual**: one query per configured endpoint, tallies merged
//!
//! Every variant appends to the caller's accumulator only after all of its
//! queries have been answered and parsed, so a failed identifier adds nothing.

mod endpoint_querier;
mod individual;

pub use endpoint_querier::EndpointQuerier;
pub use individual::IndividualQuerier;

use crate::config::RecommenderConfig;
use crate::sparql::{EndpointError, HttpSparqlEndpoint, RelatedQuery, SparqlEndpoint};
use crate::types::{InvalidIdentifier, OccurrenceTally, Recommendation, SourceIdentifier};
use crate::xml_response::ResponseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Querier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Federated,
    SingleEndpoint,
    Individual,
}

impl RecommendationType {
    /// Map the configuration flag to a variant
    ///
    /// `federated` and `single`/`single_endpoint` are matched case-insensitively;
    /// any other value selects `Individual`.
    pub fn from_flag(flag: &str) -> Self {
        let flag = flag.trim();
        if flag.eq_ignore_ascii_case("federated") {
            Self::Federated
        } else if flag.eq_ignore_ascii_case("single") || flag.eq_ignore_ascii_case("single_endpoint") {
            Self::SingleEndpoint
        } else {
            Self::Individual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Federated => "federated",
            Self::SingleEndpoint => "single_endpoint",
            Self::Individual => "individual",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-identifier querier errors
#[derive(Debug, Error)]
pub enum QuerierError {
    /// Identifier rejected before any query was sent
    #[error("Initialization error: {0}")]
    Initialization(#[from] InvalidIdentifier),

    /// Transport or HTTP failure
    #[error("Query to {endpoint} failed: {source}")]
    Query {
        endpoint: String,
        #[source]
        source: EndpointError,
    },

    /// Response arrived but could not be parsed
    #[error("Unusable response from {endpoint}: {source}")]
    Response {
        endpoint: String,
        #[source]
        source: ResponseError,
    },

    /// Individual querier: no endpoint produced a usable response
    #[error("No endpoint answered ({0} queried)")]
    AllEndpointsFailed(usize),
}

/// Querier variant resolved at startup
pub enum Querier {
    Federated(EndpointQuerier),
    SingleEndpoint(EndpointQuerier),
    Individual(IndividualQuerier),
}

impl Querier {
    /// Build the configured variant with HTTP endpoints
    pub fn from_config(config: &RecommenderConfig) -> Result<Self, EndpointError> {
        let mut endpoints = config
            .endpoints
            .iter()
            .map(|url| {
                HttpSparqlEndpoint::new(url, config.request_timeout)
                    .map(|e| Arc::new(e) as Arc<dyn SparqlEndpoint>)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if endpoints.is_empty() {
            return Err(EndpointError::NotConfigured(
                config.recommendation_type.to_string(),
            ));
        }

        let query = config.query.clone();
        let querier = match config.recommendation_type {
            RecommendationType::Individual => {
                Self::Individual(IndividualQuerier::new(endpoints, query))
            }
            kind => {
                let endpoint = endpoints.swap_remove(0);
                Self::with_endpoint(kind, endpoint, query)
            }
        };

        Ok(querier)
    }

    /// Build a single-round-trip variant around an existing endpoint
    ///
    /// `Individual` wraps the endpoint as a one-element list.
    pub fn with_endpoint(
        kind: RecommendationType,
        endpoint: Arc<dyn SparqlEndpoint>,
        query: RelatedQuery,
    ) -> Self {
        match kind {
            RecommendationType::Federated => Self::Federated(EndpointQuerier::new(endpoint, query)),
            RecommendationType::SingleEndpoint => {
                Self::SingleEndpoint(EndpointQuerier::new(endpoint, query))
            }
            RecommendationType::Individual => {
                Self::Individual(IndividualQuerier::new(vec![endpoint], query))
            }
        }
    }

    pub fn kind(&self) -> RecommendationType {
        match self {
            Self::Federated(_) => RecommendationType::Federated,
            Self::SingleEndpoint(_) => RecommendationType::SingleEndpoint,
            Self::Individual(_) => RecommendationType::Individual,
        }
    }

    /// Endpoint URLs this querier talks to
    pub fn endpoint_urls(&self) -> Vec<String> {
        match self {
            Self::Federated(q) | Self::SingleEndpoint(q) => vec![q.endpoint_url().to_string()],
            Self::Individual(q) => q.endpoint_urls(),
        }
    }

    /// Query for `identifier` and append its recommendations to `accumulator`
    ///
    /// Returns the number of recommendations appended. On error the
    /// accumulator is left unchanged.
    pub async fn compute_recommendations(
        &self,
        identifier: &str,
        accumulator: &mut Vec<Recommendation>,
    ) -> Result<usize, QuerierError> {
        let source = SourceIdentifier::parse(identifier)?;

        let tally: OccurrenceTally = match self {
            Self::Federated(q) | Self::SingleEndpoint(q) => q.tally(&source).await?,
            Self::Individual(q) => q.tally(&source).await?,
        };

        let recommendations = tally.into_recommendations(&source);
        let count = recommendations.len();
        accumulator.extend(recommendations);

        tracing::debug!(
            uri = %source,
            querier = %self.kind(),
            recommendations = count,
            "Recommendations computed"
        );

        Ok(count)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_flag_selection() {
        assert_eq!(RecommendationType::from_flag("federated"), RecommendationType::Federated);
        assert_eq!(RecommendationType::from_flag(" FEDERATED "), RecommendationType::Federated);
        assert_eq!(RecommendationType::from_flag("Single"), RecommendationType::SingleEndpoint);
        assert_eq!(
            RecommendationType::from_flag("single_endpoint"),
            RecommendationType::SingleEndpoint
        );
        assert_eq!(RecommendationType::from_flag("individual"), RecommendationType::Individual);
        assert_eq!(RecommendationType::from_flag(""), RecommendationType::Individual);
        assert_eq!(RecommendationType::from_flag("anything"), RecommendationType::Individual);
    }

    #[tokio::test]
    async fn test_federated_appends_weighted_recommendations() {
        let endpoint = Arc::new(ScriptedEndpoint::answering(
            "http://fed/sparql",
            &results_doc(&["http://ex/9", "http://ex/9", "http://ex/7"]),
        ));
        let querier = Querier::with_endpoint(
            RecommendationType::Federated,
            endpoint.clone(),
            RelatedQuery::default(),
        );

        let mut acc = Vec::new();
        let added = querier.compute_recommendations("http://ex/1", &mut acc).await.unwrap();

        assert_eq!(added, 2);
        assert_eq!(acc[0].source.as_str(), "http://ex/1");
        assert_eq!(acc[0].target, "http://ex/9");
        assert_eq!(acc[0].weight, 2);
        assert_eq!(acc[1].target, "http://ex/7");
        assert_eq!(acc[1].weight, 1);
        assert_eq!(endpoint.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_identifier_sends_no_query() {
        let endpoint = Arc::new(ScriptedEndpoint::answering("http://fed/sparql", &results_doc(&[])));
        let querier = Querier::with_endpoint(
            RecommendationType::SingleEndpoint,
            endpoint.clone(),
            RelatedQuery::default(),
        );

        let mut acc = Vec::new();
        let result = querier.compute_recommendations("not a uri", &mut acc).await;

        assert!(matches!(result, Err(QuerierError::Initialization(_))));
        assert!(acc.is_empty());
        assert_eq!(endpoint.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_error_leaves_accumulator_untouched() {
        let endpoint = Arc::new(ScriptedEndpoint::failing("http://fed/sparql", 503));
        let querier =
            Querier::with_endpoint(RecommendationType::Federated, endpoint, RelatedQuery::default());

        let existing = Recommendation {
            source: SourceIdentifier::parse("http://ex/0").unwrap(),
            target: "http://ex/5".to_string(),
            weight: 1,
        };
        let mut acc = vec![existing.clone()];
        let result = querier.compute_recommendations("http://ex/1", &mut acc).await;

        assert!(matches!(result, Err(QuerierError::Query { .. })));
        assert_eq!(acc, vec![existing]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_response_error() {
        let endpoint = Arc::new(ScriptedEndpoint::answering("http://fed/sparql", "<sparql><results>"));
        let querier =
            Querier::with_endpoint(RecommendationType::Federated, endpoint, RelatedQuery::default());

        let mut acc = Vec::new();
        let result = querier.compute_recommendations("http://ex/1", &mut acc).await;

        assert!(matches!(result, Err(QuerierError::Response { .. })));
        assert!(acc.is_empty());
    }

    fn config_with(kind: RecommendationType, endpoints: Vec<String>) -> RecommenderConfig {
        RecommenderConfig {
            source_file_path: "uris.txt".into(),
            output_file_path: "recs.rdf".into(),
            recommendation_type: kind,
            endpoints,
            request_timeout: None,
            query: RelatedQuery::default(),
            flush_policy: crate::orchestrator::FlushPolicy::default(),
        }
    }

    #[test]
    fn test_from_config_without_endpoints_is_not_configured() {
        for kind in [
            RecommendationType::Federated,
            RecommendationType::SingleEndpoint,
            RecommendationType::Individual,
        ] {
            match Querier::from_config(&config_with(kind, Vec::new())) {
                Err(EndpointError::NotConfigured(name)) => assert_eq!(name, kind.as_str()),
                Err(other) => panic!("expected NotConfigured for {}, got {}", kind, other),
                Ok(_) => panic!("expected NotConfigured for {}", kind),
            }
        }

        let err = EndpointError::NotConfigured("federated".to_string());
        assert_eq!(err.to_string(), "No federated endpoint configured");
    }

    #[test]
    fn test_from_config_builds_selected_variant() {
        let querier = Querier::from_config(&config_with(
            RecommendationType::Individual,
            vec!["http://a/sparql".to_string(), "http://b/sparql".to_string()],
        ))
        .unwrap();
        assert_eq!(querier.kind(), RecommendationType::Individual);
        assert_eq!(querier.endpoint_urls().len(), 2);

        let querier = Querier::from_config(&config_with(
            RecommendationType::SingleEndpoint,
            vec!["http://store/sparql".to_string()],
        ))
        .unwrap();
        assert_eq!(querier.endpoint_urls(), vec!["http://store/sparql".to_string()]);
    }

    #[test]
    fn test_kind_and_urls() {
        let endpoint = Arc::new(ScriptedEndpoint::answering("http://fed/sparql", ""));
        let querier =
            Querier::with_endpoint(RecommendationType::Individual, endpoint, RelatedQuery::default());

        assert_eq!(querier.kind(), RecommendationType::Individual);
        assert_eq!(querier.endpoint_urls(), vec!["http://fed/sparql".to_string()]);
    }
}
