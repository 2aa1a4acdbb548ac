//! CSV writers for the output tables and the run metadata file

use crate::config::PipelineConfig;
use crate::entropy::EntropyTable;
use crate::error::Result;
use crate::input::{FertilityTable, SurvivorshipTable};
use crate::life_table::LifeTable;
use crate::pipeline::RunSummary;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const LIFE_TABLE_FILE: &str = "life_table.csv";
pub const ENTROPY_FILE: &str = "entropy.csv";
pub const METADATA_FILE: &str = "INFO.txt";
pub const SURVIVORSHIP_FILE: &str = "hmd_data.csv";
pub const FERTILITY_FILE: &str = "hfd_data.csv";

const LIFE_TABLE_HEADER: [&str; 11] = [
    "country_code", "suffix", "year", "age", "lx", "mx", "lxmx", "dx", "qx", "sx", "vx",
];
const ENTROPY_HEADER: [&str; 4] = ["country_code", "suffix", "year", "H_N"];
const SURVIVORSHIP_HEADER: [&str; 5] = ["country_code", "suffix", "year", "age", "lx"];
const FERTILITY_HEADER: [&str; 5] = ["country_code", "suffix", "year", "age", "mx"];

/// Flat life table row as written to CSV; `None` becomes an empty field
#[derive(Serialize)]
struct LifeTableCsvRow<'a> {
    country_code: &'a str,
    suffix: &'a str,
    year: i32,
    age: u32,
    lx: Option<f64>,
    mx: Option<f64>,
    lxmx: Option<f64>,
    dx: Option<f64>,
    qx: Option<f64>,
    sx: Option<f64>,
    vx: Option<f64>,
}

#[derive(Serialize)]
struct EntropyCsvRow<'a> {
    country_code: &'a str,
    suffix: &'a str,
    year: i32,
    #[serde(rename = "H_N")]
    h_n: f64,
}

#[derive(Serialize)]
struct SurvivorshipCsvRow<'a> {
    country_code: &'a str,
    suffix: &'a str,
    year: i32,
    age: u32,
    lx: Option<f64>,
}

#[derive(Serialize)]
struct FertilityCsvRow<'a> {
    country_code: &'a str,
    suffix: &'a str,
    year: i32,
    age: u32,
    mx: Option<f64>,
}

/// Write the merged life table to any writer
pub fn write_life_table_to<W: Write>(table: &LifeTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    // serialize() only emits a header alongside the first record
    if table.is_empty() {
        csv_writer.write_record(LIFE_TABLE_HEADER)?;
    }
    for row in table.rows() {
        csv_writer.serialize(LifeTableCsvRow {
            country_code: &row.key.country_code,
            suffix: &row.key.suffix,
            year: row.key.year,
            age: row.age,
            lx: row.lx,
            mx: row.mx,
            lxmx: row.lxmx,
            dx: row.dx,
            qx: row.qx,
            sx: row.sx,
            vx: row.vx,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the cohort entropy table to any writer
pub fn write_entropy_table_to<W: Write>(table: &EntropyTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if table.is_empty() {
        csv_writer.write_record(ENTROPY_HEADER)?;
    }
    for row in &table.rows {
        csv_writer.serialize(EntropyCsvRow {
            country_code: &row.key.country_code,
            suffix: &row.key.suffix,
            year: row.key.year,
            h_n: row.h_n,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the normalised survivorship source in its loaded order
pub fn write_survivorship_table_to<W: Write>(table: &SurvivorshipTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if table.is_empty() {
        csv_writer.write_record(SURVIVORSHIP_HEADER)?;
    }
    for record in &table.records {
        csv_writer.serialize(SurvivorshipCsvRow {
            country_code: &record.key.country_code,
            suffix: &record.key.suffix,
            year: record.key.year,
            age: record.age,
            lx: record.lx,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the normalised fertility source in its loaded order
pub fn write_fertility_table_to<W: Write>(table: &FertilityTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if table.is_empty() {
        csv_writer.write_record(FERTILITY_HEADER)?;
    }
    for record in &table.records {
        csv_writer.serialize(FertilityCsvRow {
            country_code: &record.key.country_code,
            suffix: &record.key.suffix,
            year: record.key.year,
            age: record.age,
            mx: record.mx,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_survivorship_table<P: AsRef<Path>>(table: &SurvivorshipTable, path: P) -> Result<()> {
    write_survivorship_table_to(table, BufWriter::new(File::create(path)?))
}

pub fn write_fertility_table<P: AsRef<Path>>(table: &FertilityTable, path: P) -> Result<()> {
    write_fertility_table_to(table, BufWriter::new(File::create(path)?))
}

pub fn write_life_table<P: AsRef<Path>>(table: &LifeTable, path: P) -> Result<()> {
    write_life_table_to(table, BufWriter::new(File::create(path)?))
}

pub fn write_entropy_table<P: AsRef<Path>>(table: &EntropyTable, path: P) -> Result<()> {
    write_entropy_table_to(table, BufWriter::new(File::create(path)?))
}

/// Write a plain-text summary of the run followed by its log lines
pub fn write_run_metadata<P: AsRef<Path>>(
    path: P,
    output_dir: &Path,
    config: &PipelineConfig,
    summary: &RunSummary,
    log_lines: &[String],
    timestamp: DateTime<Local>,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", timestamp.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file, "Data outputted into: {}\n", output_dir.display())?;
    writeln!(file, "The minimum age filtered for is: {}", config.min_age)?;
    writeln!(file, "The maximum age filtered for is: {}", config.max_age)?;
    writeln!(
        file,
        "Fertility band: {}-{}",
        config.fertility_min_age, config.fertility_max_age
    )?;
    writeln!(file, "lx standardised: {}", config.standardise_lx)?;
    writeln!(file)?;
    writeln!(file, "Common cohorts: {}", summary.common_cohorts)?;
    writeln!(file, "Life table rows: {}", summary.life_table_rows)?;
    writeln!(file, "Cohorts with H_N: {}", summary.entropy_defined)?;
    for (reason, count) in &summary.entropy_excluded {
        writeln!(file, "Excluded ({}): {}", reason, count)?;
    }

    writeln!(file, "\nLOGS:")?;
    for line in log_lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(())
}

/// Create the next free `data{i}` directory under `root`
pub fn next_output_dir<P: AsRef<Path>>(root: P) -> Result<PathBuf> {
    let root = root.as_ref();
    let mut i = 1;
    loop {
        let candidate = root.join(format!("data{}", i));
        if !candidate.exists() {
            fs::create_dir_all(&candidate)?;
            return Ok(candidate);
        }
        i += 1;
    }
}
