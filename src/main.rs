//! # fingerprint CLI
//!
//! Command-line interface for the batch fingerprinter.
//!
//! ## Usage
//! ```bash
//! fingerprint run 0 1 2 3
//! fingerprint run 0 1 2 3 --workers 4 --output json
//! ```

mod cli;

use batch_fingerprinter::Result;

fn main() -> Result<()> {
    cli::run()
}
