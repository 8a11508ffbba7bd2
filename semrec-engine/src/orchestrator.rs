//! Batch orchestration
//!
//! Drives one run over the identifier set:
//! INIT → ITERATING → FINALIZING → DONE
//!
//! Each identifier is handed to the querier, which appends its recommendations
//! to the pending buffer. Once the buffer holds `threshold` recommendations it is
//! flushed to a fresh destination. A failed flush keeps the buffer and retries at
//! the next trigger; after `max_attempts` consecutive failures the buffer is
//! dropped. Finalizing flushes whatever remains, with the same retry bound.

use crate::error::FlushError;
use crate::querier::Querier;
use crate::sink::{DestinationNamer, OutputSink};
use crate::types::Recommendation;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use semrec_common::human_time::format_elapsed;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000;
pub const DEFAULT_MAX_FLUSH_ATTEMPTS: u32 = 3;

/// When to flush and how long to keep retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    /// Pending buffer size that triggers a flush (>= 1)
    pub threshold: usize,
    /// Consecutive failures before the buffer is dropped (>= 1)
    pub max_attempts: u32,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FLUSH_THRESHOLD,
            max_attempts: DEFAULT_MAX_FLUSH_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchPhase {
    /// Inputs loaded, nothing queried yet
    Init,
    /// Visiting identifiers
    Iterating,
    /// Flushing the remainder
    Finalizing,
    Done,
}

/// Mutable state of a run
#[derive(Debug)]
pub struct BatchState {
    pub phase: BatchPhase,
    pub total: usize,
    /// Identifiers that produced recommendations (possibly none)
    pub processed: usize,
    /// Identifiers that failed and were skipped
    pub discarded: usize,
    pending: Vec<Recommendation>,
    consecutive_flush_failures: u32,
}

impl BatchState {
    fn new(total: usize) -> Self {
        Self {
            phase: BatchPhase::Init,
            total,
            processed: 0,
            discarded: 0,
            pending: Vec::new(),
            consecutive_flush_failures: 0,
        }
    }

    fn transition_to(&mut self, phase: BatchPhase) {
        debug!(from = ?self.phase, to = ?phase, "Batch phase transition");
        self.phase = phase;
    }

    /// Identifiers visited so far
    pub fn visited(&self) -> usize {
        self.processed + self.discarded
    }

    /// Share of identifiers visited (0.0 - 100.0)
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.visited() as f64 / self.total as f64) * 100.0
        } else {
            100.0
        }
    }

    pub fn pending(&self) -> &[Recommendation] {
        &self.pending
    }

    /// Hand the buffer over, leaving a fresh one in its place
    fn take_pending(&mut self) -> Vec<Recommendation> {
        std::mem::take(&mut self.pending)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub discarded: usize,
    pub recommendations_written: usize,
    /// Successful flushes (one output file each)
    pub flushes: usize,
    pub failed_flush_attempts: usize,
    pub dropped_recommendations: usize,
    pub flush_errors: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Runs the querier over an identifier set and flushes results to a sink
pub struct BatchOrchestrator<S: OutputSink> {
    querier: Querier,
    sink: S,
    namer: DestinationNamer,
    policy: FlushPolicy,
    state: BatchState,
    report: BatchReport,
}

impl<S: OutputSink> BatchOrchestrator<S> {
    pub fn new(querier: Querier, sink: S, namer: DestinationNamer, policy: FlushPolicy) -> Self {
        Self {
            querier,
            sink,
            namer,
            policy,
            state: BatchState::new(0),
            report: BatchReport::default(),
        }
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process every identifier once, in order
    ///
    /// Never fails: per-identifier and flush problems are logged and counted.
    pub async fn run(&mut self, identifiers: &IndexSet<String>) -> BatchReport {
        self.state = BatchState::new(identifiers.len());
        self.report = BatchReport {
            total: identifiers.len(),
            started_at: Some(semrec_common::time::now()),
            ..BatchReport::default()
        };
        let clock = Instant::now();

        info!(
            total = self.state.total,
            querier = %self.querier.kind(),
            endpoints = ?self.querier.endpoint_urls(),
            threshold = self.policy.threshold,
            "Starting recommendation batch"
        );
        self.log_progress();

        self.state.transition_to(BatchPhase::Iterating);
        for identifier in identifiers {
            self.process_identifier(identifier).await;
            self.log_progress();

            if self.state.pending.len() >= self.policy.threshold {
                self.flush();
            }
        }

        self.state.transition_to(BatchPhase::Finalizing);
        while !self.state.pending.is_empty() {
            if self.flush() {
                break;
            }
        }

        self.state.transition_to(BatchPhase::Done);
        self.report.processed = self.state.processed;
        self.report.discarded = self.state.discarded;
        self.report.finished_at = Some(semrec_common::time::now());

        info!(
            processed = self.report.processed,
            discarded = self.report.discarded,
            total = self.report.total,
            written = self.report.recommendations_written,
            files = self.report.flushes,
            dropped = self.report.dropped_recommendations,
            "Batch complete in {}",
            format_elapsed(clock.elapsed())
        );

        self.report.clone()
    }

    async fn process_identifier(&mut self, identifier: &str) {
        let outcome = self
            .querier
            .compute_recommendations(identifier, &mut self.state.pending)
            .await;

        match outcome {
            Ok(added) => {
                self.state.processed += 1;
                debug!(uri = %identifier, added, pending = self.state.pending.len(), "Identifier processed");
            }
            Err(e) => {
                self.state.discarded += 1;
                warn!(uri = %identifier, error = %e, "Problems with the triplestore, identifier discarded");
            }
        }
    }

    /// Write the pending buffer to a fresh destination
    ///
    /// Returns true when the buffer is empty afterwards (written or dropped).
    fn flush(&mut self) -> bool {
        if self.state.pending.is_empty() {
            return true;
        }

        let destination = self.namer.next_destination();
        let count = self.state.pending.len();

        match self.sink.write(&self.state.pending, &destination) {
            Ok(()) => {
                self.state.take_pending();
                self.state.consecutive_flush_failures = 0;
                self.report.flushes += 1;
                self.report.recommendations_written += count;
                info!(
                    destination = %destination.display(),
                    recommendations = count,
                    "Recommendations flushed"
                );
                true
            }
            Err(source) => {
                self.state.consecutive_flush_failures += 1;
                self.report.failed_flush_attempts += 1;
                let attempt = self.state.consecutive_flush_failures;

                let failure = FlushError::Write {
                    count,
                    destination,
                    attempt,
                    max_attempts: self.policy.max_attempts,
                    source,
                };
                warn!(error = %failure, "Problems writing the output file");
                self.report.flush_errors.push(failure.to_string());

                if attempt < self.policy.max_attempts {
                    return false;
                }

                let dropped = self.state.take_pending().len();
                self.state.consecutive_flush_failures = 0;
                self.report.dropped_recommendations += dropped;

                let exhausted = FlushError::RetriesExhausted {
                    dropped,
                    attempts: attempt,
                };
                error!(error = %exhausted, "Pending recommendations lost");
                self.report.flush_errors.push(exhausted.to_string());
                true
            }
        }
    }

    fn log_progress(&self) {
        info!(
            "Remaining: {} [{:.1}%]",
            self.state.total - self.state.visited(),
            self.state.percentage()
        );
    }
}
