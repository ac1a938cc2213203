//! # Pipeline Module
//!
//! Executes stages concurrently and orchestrates the full run.
//!
//! ## Pieces
//! - `executor` - generic typed stage chain: dedicated rendezvous channel
//!   per boundary, one thread per stage, caller blocks until all finish
//! - `fingerprinter` - the concrete three-stage fingerprinting run with
//!   its builder and result type
//!
//! ## Termination
//! A stage closes its output by returning; the downstream read loop ends
//! once the closed stream drains. By default a run proceeds to input
//! exhaustion; a [`CancellationToken`](crate::core::cancel) can end it
//! early, in which case the run reports a cancellation error instead of
//! a result.

mod executor;
mod fingerprinter;

pub use executor::Pipeline;
pub use fingerprinter::{Fingerprinter, FingerprinterBuilder, FingerprintResult};
