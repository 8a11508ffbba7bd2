//! Test Helper Utilities
//!
//! Shared fakes for exercising the engine without a triple store or disk.

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::{capture_logs, LogCapture};

use async_trait::async_trait;
use semrec_engine::sink::{OutputSink, SinkError};
use semrec_engine::sparql::{EndpointError, SparqlEndpoint};
use semrec_engine::Recommendation;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

type Responder = Box<dyn Fn(&str) -> Result<String, EndpointError> + Send + Sync>;

/// Endpoint whose answer is computed from the query text
pub struct FnEndpoint {
    url: String,
    respond: Responder,
    calls: AtomicUsize,
}

impl FnEndpoint {
    pub fn new<F>(url: &str, respond: F) -> Self
    where
        F: Fn(&str) -> Result<String, EndpointError> + Send + Sync + 'static,
    {
        Self {
            url: url.to_string(),
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    /// Same document for every query
    pub fn constant(url: &str, document: String) -> Self {
        Self::new(url, move |_| Ok(document.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SparqlEndpoint for FnEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn select(&self, query: &str) -> Result<String, EndpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(query)
    }
}

/// SPARQL XML results document binding `?related` to each URI in order
pub fn results_doc(uris: &[&str]) -> String {
    let mut doc = String::from(
        "<?xml version=\"1.0\"?>\n<sparql xmlns=\"http://www.w3.org/2005/sparql-results#\">\n  <head><variable name=\"related\"/></head>\n  <results>\n",
    );
    for uri in uris {
        doc.push_str(&format!(
            "    <result><binding name=\"related\"><uri>{}</uri></binding></result>\n",
            uri
        ));
    }
    doc.push_str("  </results>\n</sparql>\n");
    doc
}

/// Document with `n` distinct targets
pub fn distinct_targets_doc(n: usize) -> String {
    let uris: Vec<String> = (0..n).map(|i| format!("http://target.example.org/{}", i)).collect();
    let refs: Vec<&str> = uris.iter().map(String::as_str).collect();
    results_doc(&refs)
}

/// In-memory sink; the first `failures` writes fail
#[derive(Default)]
pub struct MemorySink {
    pub batches: Vec<(PathBuf, Vec<Recommendation>)>,
    pub failures: usize,
    pub attempts: usize,
}

impl MemorySink {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Default::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(|(_, b)| b.len()).collect()
    }

    pub fn all(&self) -> Vec<Recommendation> {
        self.batches.iter().flat_map(|(_, b)| b.iter().cloned()).collect()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, recommendations: &[Recommendation], destination: &Path) -> Result<(), SinkError> {
        self.attempts += 1;
        if self.failures > 0 {
            self.failures -= 1;
            return Err(SinkError::Io {
                path: destination.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        self.batches
            .push((destination.to_path_buf(), recommendations.to_vec()));
        Ok(())
    }
}
