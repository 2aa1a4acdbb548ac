//! Life Table System CLI
//!
//! Merges a survivorship (HMD) and a fertility (HFD) table, derives the life
//! table columns, and computes Keyfitz entropy per cohort. Results and the
//! normalised source tables are written into the next free `data{i}` folder
//! under the output root.

use anyhow::{Context, Result};
use clap::Parser;
use life_table_system::config::DEFAULT_CONFIG_PATH;
use life_table_system::input::{load_fertility, load_survivorship};
use life_table_system::output::{
    next_output_dir, write_entropy_table, write_fertility_table, write_life_table,
    write_run_metadata, write_survivorship_table, ENTROPY_FILE, FERTILITY_FILE, LIFE_TABLE_FILE,
    METADATA_FILE, SURVIVORSHIP_FILE,
};
use life_table_system::{Pipeline, PipelineConfig, RecordingReporter, Reporter};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(version, about = "Merge HMD/HFD data and compute Keyfitz entropy")]
struct Args {
    /// Survivorship CSV (country_code, [suffix], year, age, lx)
    #[arg(long)]
    survivorship: PathBuf,

    /// Fertility CSV (country_code, [suffix], year, age, mx)
    #[arg(long)]
    fertility: PathBuf,

    /// JSON settings file; defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    min_age: Option<u32>,

    #[arg(long)]
    max_age: Option<u32>,

    /// Divide lx by each cohort's age-0 value
    #[arg(long)]
    standardise_lx: bool,

    /// Root folder for numbered output directories
    #[arg(long)]
    output_root: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let path = args.config.clone().or_else(|| {
        let default = Path::new(DEFAULT_CONFIG_PATH);
        default.exists().then(|| default.to_path_buf())
    });

    let mut config = match path {
        Some(path) => PipelineConfig::from_json_path(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(min_age) = args.min_age {
        config.min_age = min_age;
    }
    if let Some(max_age) = args.max_age {
        config.max_age = max_age;
    }
    if args.standardise_lx {
        config.standardise_lx = true;
    }
    if let Some(root) = &args.output_root {
        config.output_root = root.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let config = load_config(&args)?;
    let reporter = RecordingReporter::with_timestamps();
    reporter.info("successfully loaded settings");

    let survivorship = load_survivorship(&args.survivorship)
        .with_context(|| format!("failed to load {}", args.survivorship.display()))?;
    let fertility = load_fertility(&args.fertility)
        .with_context(|| format!("failed to load {}", args.fertility.display()))?;
    reporter.info(&format!(
        "loaded {} survivorship and {} fertility records",
        survivorship.len(),
        fertility.len()
    ));

    let output_dir = next_output_dir(&config.output_root)?;
    let pipeline = Pipeline::new(config, reporter);
    let output = pipeline.run(&survivorship, &fertility)?;

    // Source tables as the pipeline saw them, after any lx standardisation
    let survivorship_path = output_dir.join(SURVIVORSHIP_FILE);
    write_survivorship_table(
        output.standardised.as_ref().unwrap_or(&survivorship),
        &survivorship_path,
    )?;
    let fertility_path = output_dir.join(FERTILITY_FILE);
    write_fertility_table(&fertility, &fertility_path)?;
    pipeline.reporter().info(&format!(
        "source tables exported to {} and {}",
        survivorship_path.display(),
        fertility_path.display()
    ));

    let life_table_path = output_dir.join(LIFE_TABLE_FILE);
    write_life_table(&output.life_table, &life_table_path)?;
    pipeline
        .reporter()
        .info(&format!("life table exported to {}", life_table_path.display()));

    let entropy_path = output_dir.join(ENTROPY_FILE);
    write_entropy_table(&output.entropy, &entropy_path)?;
    pipeline
        .reporter()
        .info(&format!("entropy table exported to {}", entropy_path.display()));

    write_run_metadata(
        output_dir.join(METADATA_FILE),
        &output_dir,
        pipeline.config(),
        &output.summary,
        &pipeline.reporter().lines(),
        chrono::Local::now(),
    )?;

    println!("Life table rows:  {}", output.summary.life_table_rows);
    println!("Common cohorts:   {}", output.summary.common_cohorts);
    println!("Cohorts with H_N: {}", output.summary.entropy_defined);
    println!("Output written to {} in {:?}", output_dir.display(), start.elapsed());
    Ok(())
}
