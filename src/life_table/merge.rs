//! Left-join survivorship and fertility onto the age grid

use super::grid::{verify_cardinality, AgeGrid};
use super::row::LifeTable;
use crate::cohort::CohortKey;
use crate::config::PipelineConfig;
use crate::error::{LifeTableError, Result, Source};
use crate::input::{FertilityTable, SurvivorshipTable};
use std::collections::{BTreeSet, HashMap};

type SourceIndex<'a> = HashMap<(&'a CohortKey, u32), Option<f64>>;

/// Index the participating records of one source by (cohort, age)
///
/// Only records whose key is on the grid and whose age passes `keep` take
/// part; two such records for the same (cohort, age) abort the merge.
fn index_source<'a, I>(
    records: I,
    source: Source,
    keys: &BTreeSet<CohortKey>,
    keep: impl Fn(u32) -> bool,
) -> Result<SourceIndex<'a>>
where
    I: Iterator<Item = (&'a CohortKey, u32, Option<f64>)>,
{
    let mut index = HashMap::new();
    for (key, age, value) in records {
        if !keep(age) || !keys.contains(key) {
            continue;
        }
        if index.insert((key, age), value).is_some() {
            return Err(LifeTableError::DuplicateRecord {
                source_table: source,
                key: key.clone(),
                age,
            });
        }
    }
    Ok(index)
}

/// Merge both sources onto the grid
///
/// Survivorship rows outside `[min_age, max_age]` are excluded from the join.
/// Grid rows without a source match keep `None`. Fertility is then forced to
/// 0.0 outside the reproductive band.
pub fn merge(
    grid: AgeGrid,
    survivorship: &SurvivorshipTable,
    fertility: &FertilityTable,
    config: &PipelineConfig,
) -> Result<LifeTable> {
    let expected = grid.len();
    let (keys, range, mut rows) = grid.into_parts();

    let lx_index = index_source(
        survivorship.records.iter().map(|r| (&r.key, r.age, r.lx)),
        Source::Survivorship,
        &keys,
        |age| range.contains(age),
    )?;
    // Out-of-range fertility ages have no grid row to land on
    let mx_index = index_source(
        fertility.records.iter().map(|r| (&r.key, r.age, r.mx)),
        Source::Fertility,
        &keys,
        |age| range.contains(age),
    )?;

    let mut lx_matched = 0usize;
    let mut mx_matched = 0usize;
    for row in &mut rows {
        if let Some(&lx) = lx_index.get(&(&row.key, row.age)) {
            row.lx = lx;
            lx_matched += 1;
        }
        if let Some(&mx) = mx_index.get(&(&row.key, row.age)) {
            row.mx = mx;
            mx_matched += 1;
        }
        if !config.in_fertility_band(row.age) {
            row.mx = Some(0.0);
        }
    }

    verify_cardinality(expected, rows.len())?;

    log::debug!(
        "merged {} grid rows: {} with survivorship, {} with fertility",
        rows.len(),
        lx_matched,
        mx_matched
    );
    Ok(LifeTable::from_rows(rows, range))
}
