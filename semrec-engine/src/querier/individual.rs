//! Direct querying of several endpoints
//!
//! Endpoints are queried one after another with the same query. Each answered
//! document is counted into one cumulative tally. A failing endpoint is logged
//! and contributes nothing; the identifier fails only if no endpoint answered.

use super::QuerierError;
use crate::sparql::{RelatedQuery, SparqlEndpoint};
use crate::types::{OccurrenceTally, SourceIdentifier};
use crate::xml_response;
use std::sync::Arc;
use tracing::warn;

pub struct IndividualQuerier {
    endpoints: Vec<Arc<dyn SparqlEndpoint>>,
    query: RelatedQuery,
}

impl IndividualQuerier {
    pub fn new(endpoints: Vec<Arc<dyn SparqlEndpoint>>, query: RelatedQuery) -> Self {
        Self { endpoints, query }
    }

    pub fn endpoint_urls(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.url().to_string()).collect()
    }

    /// Merged tally over every endpoint that answered
    pub async fn tally(&self, source: &SourceIdentifier) -> Result<OccurrenceTally, QuerierError> {
        let query = self.query.render(source);
        let mut tally = OccurrenceTally::new();
        let mut failures = 0;

        for endpoint in &self.endpoints {
            match query_one(endpoint.as_ref(), &query).await {
                Ok(part) => tally.absorb(part),
                Err(e) => {
                    failures += 1;
                    warn!(
                        uri = %source,
                        endpoint = %endpoint.url(),
                        error = %e,
                        "Endpoint failed, continuing without its results"
                    );
                }
            }
        }

        if failures == self.endpoints.len() {
            return Err(QuerierError::AllEndpointsFailed(failures));
        }

        Ok(tally)
    }
}

async fn query_one(
    endpoint: &dyn SparqlEndpoint,
    query: &str,
) -> Result<OccurrenceTally, QuerierError> {
    let document = endpoint
        .select(query)
        .await
        .map_err(|e| QuerierError::Query {
            endpoint: endpoint.url().to_string(),
            source: e,
        })?;

    xml_response::merge(OccurrenceTally::new(), &document).map_err(|e| QuerierError::Response {
        endpoint: endpoint.url().to_string(),
        source: e,
    })
}
