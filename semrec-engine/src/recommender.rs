//! Recommendation process entry point
//!
//! Startup checks run in a fixed order before any query is sent: the output
//! location first, then the identifier file, then endpoint construction.

use crate::config::RecommenderConfig;
use crate::error::RunError;
use crate::input;
use crate::orchestrator::{BatchOrchestrator, BatchReport};
use crate::querier::Querier;
use crate::sink::{self, DestinationNamer, RdfXmlFileSink};
use tracing::info;

/// Run one batch with HTTP endpoints and RDF/XML file output
pub async fn start_process(config: &RecommenderConfig) -> Result<BatchReport, RunError> {
    sink::ensure_output_location(&config.output_file_path).map_err(|source| {
        RunError::FatalOutputPath {
            path: config.output_file_path.clone(),
            source,
        }
    })?;

    let identifiers = input::read_identifiers(&config.source_file_path)?;
    let querier = Querier::from_config(config)?;

    info!(
        source = %config.source_file_path.display(),
        output = %config.output_file_path.display(),
        querier = %querier.kind(),
        "Recommendation process starting"
    );

    let mut orchestrator = BatchOrchestrator::new(
        querier,
        RdfXmlFileSink::new(),
        DestinationNamer::new(&config.output_file_path),
        config.flush_policy,
    );

    Ok(orchestrator.run(&identifiers).await)
}
