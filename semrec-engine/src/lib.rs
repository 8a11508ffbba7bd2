//! # SemRec Engine
//!
//! Batch recommender over SPARQL endpoints. For every source URI in an input
//! file, related resources are fetched with a SELECT query, counted by
//! occurrence, and written out as weighted recommendations in RDF/XML.
//!
//! **Components:**
//! - `querier`: federated, single-endpoint, and per-endpoint query strategies
//! - `xml_response`: SPARQL XML results parsing and occurrence counting
//! - `orchestrator`: iteration, buffering, and flush policy
//! - `sink`: RDF/XML output files
//! - `config`: CLI / environment / TOML resolution

pub mod config;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod querier;
pub mod recommender;
pub mod sink;
pub mod sparql;
pub mod types;
pub mod xml_response;

pub use config::{CliOverrides, RecommenderConfig};
pub use error::{FlushError, RunError};
pub use orchestrator::{BatchOrchestrator, BatchReport, FlushPolicy};
pub use querier::{Querier, QuerierError, RecommendationType};
pub use recommender::start_process;
pub use types::{OccurrenceTally, Recommendation, SourceIdentifier};
