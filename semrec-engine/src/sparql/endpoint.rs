//! SPARQL endpoint transport
//!
//! Queries go out as HTTP GET with the query text in the `query` parameter and
//! ask for the SPARQL XML results format. The raw body is returned unparsed.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("semrec/", env!("CARGO_PKG_VERSION"));
pub const SPARQL_RESULTS_XML: &str = "application/sparql-results+xml";

/// Endpoint transport errors
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Invalid endpoint URL '{0}': {1}")]
    InvalidUrl(String, String),

    /// Selected querier has no endpoint to talk to
    #[error("No {0} endpoint configured")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// A remote SPARQL endpoint answering SELECT queries
#[async_trait]
pub trait SparqlEndpoint: Send + Sync {
    /// Endpoint location, used in logs and errors
    fn url(&self) -> &str;

    /// Run a SELECT query and return the raw XML result document
    async fn select(&self, query: &str) -> Result<String, EndpointError>;
}

/// SPARQL protocol over HTTP
pub struct HttpSparqlEndpoint {
    url: String,
    http_client: reqwest::Client,
}

impl HttpSparqlEndpoint {
    /// Build a client for `url`; without a timeout a request may block indefinitely
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, EndpointError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| EndpointError::InvalidUrl(url.to_string(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EndpointError::InvalidUrl(
                url.to_string(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| EndpointError::Network(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl SparqlEndpoint for HttpSparqlEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn select(&self, query: &str) -> Result<String, EndpointError> {
        tracing::debug!(endpoint = %self.url, "Sending SPARQL query");

        let response = self
            .http_client
            .get(&self.url)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_XML)
            .send()
            .await
            .map_err(|e| EndpointError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EndpointError::Status(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EndpointError::Body(e.to_string()))?;

        tracing::debug!(endpoint = %self.url, bytes = body.len(), "SPARQL response received");

        Ok(body)
    }
}
