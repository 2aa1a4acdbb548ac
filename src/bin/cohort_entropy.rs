//! Compute Keyfitz entropy directly from a survivorship CSV
//!
//! Uses every age present in the file (no age grid, no fertility merge), for
//! example on a previously exported `life_table.csv`.

use anyhow::{Context, Result};
use clap::Parser;
use life_table_system::entropy::survivorship_entropies;
use life_table_system::input::load_survivorship;
use life_table_system::output::write_entropy_table;
use life_table_system::RecordingReporter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(version, about = "Keyfitz entropy per cohort from a survivorship table")]
struct Args {
    /// Survivorship CSV (country_code, [suffix], year, age, lx)
    input: PathBuf,

    /// Output CSV (country_code, suffix, year, H_N)
    #[arg(long, default_value = "entropy.csv")]
    output: PathBuf,

    /// Divide lx by each cohort's age-0 value first
    #[arg(long)]
    standardise_lx: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let mut table = load_survivorship(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    if args.standardise_lx {
        table.standardise_lx()?;
    }

    let reporter = RecordingReporter::new();
    let entropy = survivorship_entropies(&table, &reporter)?;
    write_entropy_table(&entropy, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "H_N for {}/{} cohorts ({} excluded) written to {} in {:?}",
        entropy.len(),
        entropy.total_cohorts,
        entropy.excluded_count(),
        args.output.display(),
        start.elapsed()
    );
    for (reason, count) in &entropy.excluded {
        println!("  {:>6}  {}", count, reason);
    }
    Ok(())
}
