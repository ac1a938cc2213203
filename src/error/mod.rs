//! # Error Module
//!
//! Error types for the fingerprinting pipeline.
//!
//! ## Design Principles
//! - **Never panic** on caller input - return errors instead
//! - **Include context** - which stage failed and why
//! - **Fail fast** - a failed stage stops the run; the failure is
//!   surfaced to the caller as a value, not a crash

use thiserror::Error;

/// Top-level error for a pipeline run
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("stage `{stage}` failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: StageError,
    },

    #[error("stage `{stage}` panicked")]
    Panicked { stage: &'static str },

    #[error("failed to spawn thread for stage `{stage}`: {source}")]
    Spawn {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised inside a single stage
#[derive(Error, Debug)]
pub enum StageError {
    /// The downstream stage stopped receiving before this stage was done
    /// producing. Normally means the downstream stage failed or panicked.
    #[error("stage `{stage}` could not deliver an item: downstream hung up")]
    OutputClosed { stage: &'static str },

    #[error("a worker thread of stage `{stage}` panicked")]
    WorkerPanicked { stage: &'static str },

    #[error("stage `{stage}` was cancelled")]
    Cancelled { stage: &'static str },
}

impl FingerprintError {
    /// Whether this failure was caused by cancellation rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            FingerprintError::Stage {
                source: StageError::Cancelled { .. },
                ..
            }
        )
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FingerprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_names_the_stage() {
        let error = FingerprintError::Stage {
            stage: "two-part-digest",
            source: StageError::OutputClosed {
                stage: "two-part-digest",
            },
        };
        let message = error.to_string();
        assert!(message.contains("two-part-digest"));
    }

    #[test]
    fn config_error_carries_reason() {
        let error = FingerprintError::Config("workers must be at least 1".to_string());
        assert!(error.to_string().contains("workers must be at least 1"));
    }
}
