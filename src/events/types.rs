//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted during a fingerprinting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Run-level events
    Pipeline(PipelineEvent),
    /// Per-stage events
    Stage(StageEvent),
}

/// Which stage emitted a stage event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageId {
    /// Stage 1: two-part fingerprint
    TwoPartDigest,
    /// Stage 2: multi-part fingerprint
    MultiPartDigest,
    /// Terminal stage: sort and join
    SortedJoin,
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// The run has started
    Started { items: usize },
    /// The run finished successfully
    Completed { summary: RunSummary },
}

/// Per-stage events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageEvent {
    /// A digest stage finished one item
    ItemDigested { stage: StageId },
    /// The terminal stage collected all items and produced the result
    Aggregated { items: usize },
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of items in the input batch
    pub items: usize,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}
