//! # Core Module
//!
//! The concurrent fingerprinting engine.
//!
//! ## Modules
//! - `digest` - the two digest primitives (fast and rate-limited slow)
//! - `quota` - counting semaphore gating the slow primitive
//! - `cancel` - cooperative early termination of a run
//! - `stage` - stage contract plus the three concrete stages
//! - `pipeline` - stage chaining, execution and the high-level run API

pub mod cancel;
pub mod digest;
pub mod pipeline;
pub mod quota;
pub mod stage;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use digest::{Digester, IdentityDigester, Xxh3Digester};
pub use pipeline::{Fingerprinter, FingerprinterBuilder, FingerprintResult, Pipeline};
pub use quota::{Quota, QuotaPermit};
pub use stage::{MultiPartDigest, SortedJoin, Stage, StageInput, StageOutput, TwoPartDigest};
