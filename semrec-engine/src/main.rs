//! semrec - batch recommender over SPARQL endpoints
//!
//! Reads source URIs from a file, queries the configured endpoint(s) for
//! related resources, and writes weighted recommendations as RDF/XML.
//!
//! Fatal startup problems (unusable output path, unreadable input) are logged
//! and the process ends normally with nothing processed.

use anyhow::{Context, Result};
use clap::Parser;
use semrec_common::config::load_config;
use semrec_common::human_time::format_elapsed;
use semrec_common::logging::{init_tracing, resolve_log_filter};
use semrec_common::time::{self, format_timestamp};
use semrec_engine::{start_process, BatchReport, CliOverrides, RecommenderConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Command-line arguments for semrec
#[derive(Parser, Debug)]
#[command(name = "semrec")]
#[command(about = "Related-resource recommender over SPARQL endpoints")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SEMREC_CONFIG")]
    config: Option<PathBuf>,

    /// Newline-delimited file of source URIs
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Base path for RDF/XML output files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Querier: federated, single, or individual
    #[arg(short = 't', long = "type")]
    recommendation_type: Option<String>,

    /// Write the batch report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log filter directive (overrides RUST_LOG and the config file)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = load_config(args.config.as_deref())?;
    let filter = resolve_log_filter(args.log_level.as_deref(), &loaded.config.logging);
    init_tracing(&filter)?;

    info!(
        "Starting semrec v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &loaded.source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => warn!("No config file found, using compiled defaults"),
    }

    let overrides = CliOverrides {
        source_file_path: args.input,
        output_file_path: args.output,
        type_recommendation: args.recommendation_type,
    };
    let config = RecommenderConfig::resolve(&loaded.config, &overrides)?;

    let started_at = time::now();
    let clock = Instant::now();

    let report = match start_process(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "The application will be stopped");
            BatchReport::default()
        }
    };

    info!(
        "{} -- {} [{}]",
        format_timestamp(&started_at),
        format_timestamp(&time::now()),
        format_elapsed(clock.elapsed())
    );
    info!(
        "Processed {} of {} identifiers ({} discarded), {} recommendations written",
        report.processed, report.total, report.discarded, report.recommendations_written
    );

    if let Some(path) = args.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize batch report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write batch report to {}", path.display()))?;
        info!("Batch report written to {}", path.display());
    }

    Ok(())
}
