//! # CLI Module
//!
//! Command-line interface for the batch fingerprinter.
//!
//! ## Usage
//! ```bash
//! # Fingerprint a batch of integers
//! fingerprint run 0 1 2 3
//!
//! # Narrower worker pools, wider quota
//! fingerprint run 0 1 2 3 --workers 4 --permits 2
//!
//! # JSON output
//! fingerprint run 0 1 2 3 --output json
//! ```

use batch_fingerprinter::core::pipeline::{Fingerprinter, FingerprintResult};
use batch_fingerprinter::error::Result;
use batch_fingerprinter::events::{self, Event, PipelineEvent, StageEvent, StageId};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;

/// Batch Fingerprinter - deterministic fingerprints from racing workers
#[derive(Parser, Debug)]
#[command(name = "fingerprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the composite fingerprint of a batch of integers
    Run {
        /// The integers to fingerprint
        #[arg(required = true)]
        items: Vec<i64>,

        /// Worker-pool size for the digest stages
        #[arg(short, long, default_value = "7")]
        workers: usize,

        /// Sub-digests per item in the multi-part stage
        #[arg(short, long, default_value = "6")]
        parts: usize,

        /// Concurrent slow-digest calls allowed
        #[arg(long, default_value = "1")]
        permits: usize,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// The fingerprint only
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    batch_fingerprinter::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            items,
            workers,
            parts,
            permits,
            output,
            verbose,
        } => run_fingerprint(items, workers, parts, permits, output, verbose),
    }
}

fn run_fingerprint(
    items: Vec<i64>,
    workers: usize,
    parts: usize,
    permits: usize,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Batch Fingerprinter").bold().cyan(),
            style(format!("({} items)", items.len())).dim()
        ))
        .ok();
    }

    let fingerprinter = Fingerprinter::builder()
        .workers(workers)
        .parts(parts)
        .slow_permits(permits)
        .build()?;

    let (sender, receiver) = events::channel();

    // Progress bar for pretty output; each item ticks once per digest stage.
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new((items.len() * 2) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Stage(StageEvent::ItemDigested { stage }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                        pb.set_message(match stage {
                            StageId::TwoPartDigest => "two-part digest",
                            StageId::MultiPartDigest => "multi-part digest",
                            StageId::SortedJoin => "aggregating",
                        });
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = fingerprinter.run_with_events(&items, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match output {
        OutputFormat::Pretty => print_pretty_result(&term, &result, verbose),
        OutputFormat::Json => print_json_result(&result),
        OutputFormat::Minimal => println!("{}", result.fingerprint),
    }

    Ok(())
}

fn print_pretty_result(term: &Term, result: &FingerprintResult, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} items fingerprinted in {:.1}s",
        style(result.items).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if verbose {
        term.write_line(&format!(
            "  fingerprint length: {} characters",
            style(result.fingerprint.len()).cyan()
        ))
        .ok();
    }

    println!("{}", result.fingerprint);
}

fn print_json_result(result: &FingerprintResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize result: {e}"),
    }
}
