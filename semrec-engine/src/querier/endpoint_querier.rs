//! One round trip to one endpoint
//!
//! Shared by the federated and single-endpoint variants: from the caller's side
//! both send one query and parse one document. A federated endpoint distributes
//! the query to its sources on its own.

use super::QuerierError;
use crate::sparql::{RelatedQuery, SparqlEndpoint};
use crate::types::{OccurrenceTally, SourceIdentifier};
use crate::xml_response;
use std::sync::Arc;

pub struct EndpointQuerier {
    endpoint: Arc<dyn SparqlEndpoint>,
    query: RelatedQuery,
}

impl EndpointQuerier {
    pub fn new(endpoint: Arc<dyn SparqlEndpoint>, query: RelatedQuery) -> Self {
        Self { endpoint, query }
    }

    pub fn endpoint_url(&self) -> &str {
        self.endpoint.url()
    }

    /// Occurrence tally of the candidates returned for `source`
    pub async fn tally(&self, source: &SourceIdentifier) -> Result<OccurrenceTally, QuerierError> {
        let document = self
            .endpoint
            .select(&self.query.render(source))
            .await
            .map_err(|e| QuerierError::Query {
                endpoint: self.endpoint.url().to_string(),
                source: e,
            })?;

        xml_response::merge(OccurrenceTally::new(), &document).map_err(|e| {
            QuerierError::Response {
                endpoint: self.endpoint.url().to_string(),
                source: e,
            }
        })
    }
}
