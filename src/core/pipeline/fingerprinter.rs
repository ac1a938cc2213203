//! High-level orchestration: wiring the three stages into one run.

use super::executor::Pipeline;
use crate::core::cancel::CancellationToken;
use crate::core::digest::{Digester, Xxh3Digester};
use crate::core::quota::Quota;
use crate::core::stage::{
    MultiPartDigest, SortedJoin, TwoPartDigest, DEFAULT_PARTS, DEFAULT_WORKERS,
};
use crate::error::{FingerprintError, Result};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, RunSummary};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Result of one fingerprinting run
#[derive(Debug, Clone, Serialize)]
pub struct FingerprintResult {
    /// The composite fingerprint of the whole batch
    pub fingerprint: String,
    /// Number of items in the input batch
    pub items: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Builder for a [`Fingerprinter`]
pub struct FingerprinterBuilder {
    workers: usize,
    parts: usize,
    slow_permits: usize,
    digester: Arc<dyn Digester>,
    cancel: CancellationToken,
}

impl FingerprinterBuilder {
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            parts: DEFAULT_PARTS,
            slow_permits: 1,
            digester: Arc::new(Xxh3Digester),
            cancel: CancellationToken::new(),
        }
    }

    /// Worker-pool size for both digest stages (default 7)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sub-digests per item in the multi-part stage (default 6)
    pub fn parts(mut self, parts: usize) -> Self {
        self.parts = parts;
        self
    }

    /// Concurrent `slow` calls allowed across the whole run (default 1)
    pub fn slow_permits(mut self, permits: usize) -> Self {
        self.slow_permits = permits;
        self
    }

    /// Digest primitives to use (default [`Xxh3Digester`])
    pub fn digester(mut self, digester: Arc<dyn Digester>) -> Self {
        self.digester = digester;
        self
    }

    /// Token allowing a caller to end runs early
    ///
    /// Once signalled, workers finish the items they hold, stop claiming
    /// new ones, and the run reports a cancellation error.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validate the configuration and build the fingerprinter
    pub fn build(self) -> Result<Fingerprinter> {
        if self.workers == 0 {
            return Err(FingerprintError::Config(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.parts == 0 {
            return Err(FingerprintError::Config(
                "parts must be at least 1".to_string(),
            ));
        }
        if self.slow_permits == 0 {
            return Err(FingerprintError::Config(
                "slow_permits must be at least 1".to_string(),
            ));
        }

        Ok(Fingerprinter {
            workers: self.workers,
            parts: self.parts,
            quota: Quota::new(self.slow_permits),
            digester: self.digester,
            cancel: self.cancel,
        })
    }
}

impl Default for FingerprinterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes a composite fingerprint for a batch of integers.
///
/// Data flow: integers -> two-part digest (worker pool, quota-gated slow
/// half) -> multi-part digest (worker pool, per-item fan-out) -> sorted
/// join -> one string. The terminal sort makes the result independent of
/// batch submission order.
pub struct Fingerprinter {
    workers: usize,
    parts: usize,
    quota: Quota,
    digester: Arc<dyn Digester>,
    cancel: CancellationToken,
}

impl Fingerprinter {
    /// Create a fingerprinter builder
    pub fn builder() -> FingerprinterBuilder {
        FingerprinterBuilder::new()
    }

    /// Run with default settings and no progress reporting
    pub fn run(&self, batch: &[i64]) -> Result<FingerprintResult> {
        self.run_with_events(batch, &null_sender())
    }

    /// Run the full pipeline over the batch, reporting progress
    pub fn run_with_events(
        &self,
        batch: &[i64],
        events: &EventSender,
    ) -> Result<FingerprintResult> {
        let start = Instant::now();
        debug!(items = batch.len(), workers = self.workers, "run started");

        events.send(Event::Pipeline(PipelineEvent::Started {
            items: batch.len(),
        }));

        let outputs = Pipeline::source(batch.to_vec())
            .then(
                TwoPartDigest::new(Arc::clone(&self.digester), self.quota.clone())
                    .workers(self.workers)
                    .events(events.clone())
                    .cancellation(self.cancel.clone()),
            )
            .then(
                MultiPartDigest::new(Arc::clone(&self.digester))
                    .workers(self.workers)
                    .parts(self.parts)
                    .events(events.clone())
                    .cancellation(self.cancel.clone()),
            )
            .then(
                SortedJoin::new()
                    .events(events.clone())
                    .cancellation(self.cancel.clone()),
            )
            .collect()?;

        // The terminal stage emits exactly one string, even for an empty
        // batch (the join of nothing is the empty string).
        let fingerprint = outputs.into_iter().next().unwrap_or_default();

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(duration_ms, "run finished");

        let result = FingerprintResult {
            fingerprint,
            items: batch.len(),
            duration_ms,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: RunSummary {
                items: result.items,
                duration_ms,
            },
        }));

        Ok(result)
    }
}
