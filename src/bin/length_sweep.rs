//! Sweep read lengths over random substrings of a reference.
//!
//! For every substring length in the configured range, a number of seeded
//! random substrings are sampled from the reference and the smallest read
//! length that reassembles each one is appended to a results log as
//! `genome_len<TAB>read_len`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use debruijn_rs::{append_points, load_reference, run_sweep, SweepConfig};

#[derive(Parser, Debug)]
#[command(name = "length_sweep")]
#[command(about = "Find the smallest assemblable read length for random reference substrings")]
struct Args {
    /// Reference FASTA/FASTQ/plain-lines file (optionally gzipped)
    reference: PathBuf,

    /// Smallest substring length sampled (default: 10)
    #[arg(long, default_value_t = SweepConfig::default().min_genome_len)]
    min_genome_len: usize,

    /// Largest substring length sampled, exclusive (default: 400)
    #[arg(long, default_value_t = SweepConfig::default().max_genome_len)]
    max_genome_len: usize,

    /// Substrings sampled per length (default: 20)
    #[arg(long, default_value_t = SweepConfig::default().trials)]
    trials: usize,

    /// Seed for substring sampling (default: 73)
    #[arg(long, default_value_t = SweepConfig::default().seed)]
    seed: u64,

    /// Upper bound on substring start offsets (default: 5000)
    #[arg(long, default_value_t = SweepConfig::default().max_offset)]
    max_offset: usize,

    /// File the results are appended to
    #[arg(long, default_value = "append.txt")]
    results: PathBuf,

    /// Also print the points as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.trace {
        LevelFilter::Trace
    } else if args.debug {
        LevelFilter::Debug
    } else if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };
    env_logger::Builder::new().filter_level(level).init();

    let reference = load_reference(&args.reference)
        .with_context(|| format!("Failed to load reference {}", args.reference.display()))?;
    info!("Reference loaded: {} bp", reference.len());

    let config = SweepConfig {
        min_genome_len: args.min_genome_len,
        max_genome_len: args.max_genome_len,
        trials: args.trials,
        seed: args.seed,
        max_offset: args.max_offset,
    };
    let points = run_sweep(&reference, &config);

    append_points(&args.results, &points)
        .with_context(|| format!("Failed to append results to {}", args.results.display()))?;
    println!(
        "Appended {} points to {}",
        points.len(),
        args.results.display()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    }
    Ok(())
}
