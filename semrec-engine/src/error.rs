//! Run-level error types
//!
//! `RunError` aborts the process before the first identifier is processed.
//! `FlushError` never aborts: it is logged and recorded in the batch report.

use crate::input::InputError;
use crate::sink::SinkError;
use crate::sparql::EndpointError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup errors
#[derive(Debug, Error)]
pub enum RunError {
    /// Identifier file missing or unreadable
    #[error("Problems with the input file: {0}")]
    FatalInput(#[from] InputError),

    /// Output location cannot be created or written
    #[error("Problems with the output file path {path}: {source}")]
    FatalOutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Endpoint configuration rejected
    #[error("Querier setup failed: {0}")]
    QuerierSetup(#[from] EndpointError),
}

/// Failed flush of the pending buffer
#[derive(Debug, Error)]
pub enum FlushError {
    #[error("Writing {count} recommendations to {destination} failed (attempt {attempt} of {max_attempts}): {source}")]
    Write {
        count: usize,
        destination: PathBuf,
        attempt: u32,
        max_attempts: u32,
        #[source]
        source: SinkError,
    },

    #[error("Dropped {dropped} recommendations after {attempts} consecutive failed flushes")]
    RetriesExhausted { dropped: usize, attempts: u32 },
}
