//! # Batch Fingerprinter
//!
//! A staged concurrent engine that computes one composite fingerprint for
//! a batch of integers.
//!
//! ## Core Philosophy
//! - **Deterministic output** - workers race internally, the result never
//!   shows it
//! - **Bounded pressure on the slow primitive** - a quota caps concurrent
//!   calls to the expensive digest, no matter how wide the worker pools
//! - **Typed stage boundaries** - an item of the wrong type cannot enter
//!   a stage
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation
//! layers:
//! - `core` - stages, quota, digest primitives, executor
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - structured error types
//! - `cli` - command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{FingerprintError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
