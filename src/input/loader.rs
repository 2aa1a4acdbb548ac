//! Load survivorship and fertility tables from tidy CSV files
//!
//! Column names are matched case-insensitively. Either a separate suffix
//! column is present, or the code column holds a combined population code
//! (e.g. `DEUTE`) which is split into country and suffix.

use super::records::{FertilityRecord, FertilityTable, SurvivorshipRecord, SurvivorshipTable};
use crate::cohort::CohortKey;
use crate::error::{LifeTableError, Result, Source};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CODE_COLUMNS: &[&str] = &["country_code", "iso3", "code", "popname", "country"];
const SUFFIX_COLUMNS: &[&str] = &["suffix", "iso3_suffix"];
const YEAR_COLUMNS: &[&str] = &["year"];
const AGE_COLUMNS: &[&str] = &["age"];
const LX_COLUMNS: &[&str] = &["lx"];
const MX_COLUMNS: &[&str] = &["mx", "asfr"];

/// Column positions resolved from a header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    code: usize,
    suffix: Option<usize>,
    year: usize,
    age: usize,
    value: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, source: Source, value_names: &[&str]) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| LifeTableError::MissingColumn {
                source_table: source,
                column: names[0].to_string(),
            })
        };

        Ok(Self {
            code: require(CODE_COLUMNS)?,
            suffix: find(SUFFIX_COLUMNS),
            year: require(YEAR_COLUMNS)?,
            age: require(AGE_COLUMNS)?,
            value: require(value_names)?,
        })
    }
}

/// One parsed row before it is specialised into lx or mx
struct ParsedRow {
    key: CohortKey,
    age: u32,
    value: Option<f64>,
}

fn parse_rows<R: Read>(
    reader: R,
    source: Source,
    value_names: &[&'static str],
) -> Result<Vec<ParsedRow>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::locate(csv_reader.headers()?, source, value_names)?;

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header is line 1
        let row = idx + 2;
        let cell = |i: usize| record.get(i).unwrap_or("");
        let invalid = |field: &'static str, value: &str| LifeTableError::InvalidValue {
            source_table: source,
            field,
            value: value.to_string(),
            row,
        };

        let year_cell = cell(columns.year);
        let year: i32 = year_cell
            .parse()
            .map_err(|_| invalid("year", year_cell))?;

        let key = match columns.suffix {
            Some(suffix) => CohortKey::new(cell(columns.code), Some(cell(suffix)), year),
            None => CohortKey::from_population_code(cell(columns.code), year),
        };

        let age_cell = cell(columns.age);
        let age = parse_age(age_cell).ok_or_else(|| invalid("age", age_cell))?;

        let value_cell = cell(columns.value);
        let value = parse_value(value_cell).map_err(|_| invalid(value_names[0], value_cell))?;

        rows.push(ParsedRow { key, age, value });
    }

    Ok(rows)
}

/// First run of digits in an age label: `110+` → 110, `12-` → 12
pub fn parse_age(cell: &str) -> Option<u32> {
    let digits: String = cell
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Numeric cell; blank, `.`, `NA` and `NaN` are missing
pub fn parse_value(cell: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    let cell = cell.trim();
    if cell.is_empty()
        || cell == "."
        || cell.eq_ignore_ascii_case("na")
        || cell.eq_ignore_ascii_case("nan")
    {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some)
}

/// Load a survivorship table from a CSV file
pub fn load_survivorship<P: AsRef<Path>>(path: P) -> Result<SurvivorshipTable> {
    load_survivorship_from_reader(File::open(path)?)
}

/// Load a survivorship table from any reader (e.g., string buffer)
pub fn load_survivorship_from_reader<R: Read>(reader: R) -> Result<SurvivorshipTable> {
    let records = parse_rows(reader, Source::Survivorship, LX_COLUMNS)?
        .into_iter()
        .map(|row| SurvivorshipRecord {
            key: row.key,
            age: row.age,
            lx: row.value,
        })
        .collect();
    Ok(SurvivorshipTable::new(records))
}

/// Load a fertility table from a CSV file
pub fn load_fertility<P: AsRef<Path>>(path: P) -> Result<FertilityTable> {
    load_fertility_from_reader(File::open(path)?)
}

/// Load a fertility table from any reader (e.g., string buffer)
pub fn load_fertility_from_reader<R: Read>(reader: R) -> Result<FertilityTable> {
    let records = parse_rows(reader, Source::Fertility, MX_COLUMNS)?
        .into_iter()
        .map(|row| FertilityRecord {
            key: row.key,
            age: row.age,
            mx: row.value,
        })
        .collect();
    Ok(FertilityTable::new(records))
}
