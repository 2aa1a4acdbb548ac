//! Per-cohort entropy: group, fan out over rayon, collect

use super::keyfitz::{keyfitz_entropy, Undefined};
use crate::cohort::CohortKey;
use crate::error::{LifeTableError, Result, Source};
use crate::input::SurvivorshipTable;
use crate::life_table::LifeTable;
use crate::report::Reporter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of progress messages per run
const PROGRESS_STEPS: usize = 20;

/// Entropy of one cohort
#[derive(Debug, Clone, PartialEq)]
pub struct CohortEntropy {
    pub key: CohortKey,
    pub h_n: f64,
}

/// Entropy results for all cohorts where it is defined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntropyTable {
    /// Sorted by cohort key
    pub rows: Vec<CohortEntropy>,

    /// Excluded cohorts by reason
    pub excluded: BTreeMap<Undefined, usize>,

    pub total_cohorts: usize,
}

impl EntropyTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.values().sum()
    }

    pub fn get(&self, key: &CohortKey) -> Option<f64> {
        self.rows
            .binary_search_by(|row| row.key.cmp(key))
            .ok()
            .map(|idx| self.rows[idx].h_n)
    }
}

/// One cohort's survivorship by ascending age
#[derive(Debug, Clone)]
struct CohortSurvivorship<'a> {
    key: &'a CohortKey,
    ages: Vec<(u32, Option<f64>)>,
}

/// Survivorship sequence ready for the entropy calculator
///
/// Trailing ages without lx are dropped (the source simply ends before
/// `max_age`). The sequence must then start at age 0 and have no gaps.
pub fn survivorship_sequence(ages: &[(u32, Option<f64>)]) -> std::result::Result<Vec<f64>, Undefined> {
    let end = ages
        .iter()
        .rposition(|(_, lx)| lx.is_some())
        .map_or(0, |idx| idx + 1);
    let ages = &ages[..end];

    match ages.first() {
        None => return Err(Undefined::TooFewAges),
        Some((age, _)) if *age != 0 => return Err(Undefined::MissingAgeZero),
        Some(_) => {}
    }

    // A skipped age would fold two years into one step of the chain
    if ages
        .iter()
        .enumerate()
        .any(|(idx, (age, _))| *age as usize != idx)
    {
        return Err(Undefined::MissingSurvivorship);
    }

    let lx: Vec<f64> = ages
        .iter()
        .map(|(_, lx)| *lx)
        .collect::<Option<Vec<f64>>>()
        .ok_or(Undefined::MissingSurvivorship)?;

    if lx.len() < 2 {
        return Err(Undefined::TooFewAges);
    }
    Ok(lx)
}

/// Keyfitz entropy for every cohort of the merged life table
pub fn cohort_entropies(table: &LifeTable, reporter: &dyn Reporter) -> EntropyTable {
    let cohorts = table
        .cohorts()
        .map(|rows| CohortSurvivorship {
            key: &rows[0].key,
            ages: rows.iter().map(|r| (r.age, r.lx)).collect(),
        })
        .collect();
    evaluate(cohorts, reporter)
}

/// Keyfitz entropy straight from a survivorship source table
///
/// Uses every age the source provides, not just a configured range.
pub fn survivorship_entropies(
    table: &SurvivorshipTable,
    reporter: &dyn Reporter,
) -> Result<EntropyTable> {
    let mut grouped: BTreeMap<&CohortKey, BTreeMap<u32, Option<f64>>> = BTreeMap::new();
    for record in &table.records {
        let ages = grouped.entry(&record.key).or_default();
        if ages.insert(record.age, record.lx).is_some() {
            return Err(LifeTableError::DuplicateRecord {
                source_table: Source::Survivorship,
                key: record.key.clone(),
                age: record.age,
            });
        }
    }

    let cohorts = grouped
        .into_iter()
        .map(|(key, ages)| CohortSurvivorship {
            key,
            ages: ages.into_iter().collect(),
        })
        .collect();
    Ok(evaluate(cohorts, reporter))
}

fn evaluate(cohorts: Vec<CohortSurvivorship<'_>>, reporter: &dyn Reporter) -> EntropyTable {
    let total = cohorts.len();
    reporter.info(&format!("Processing {} country-year combinations...", total));

    let interval = (total / PROGRESS_STEPS).max(1);
    let done = AtomicUsize::new(0);

    let outcomes: Vec<(&CohortKey, std::result::Result<f64, Undefined>)> = cohorts
        .par_iter()
        .map(|cohort| {
            let outcome = survivorship_sequence(&cohort.ages).and_then(|lx| keyfitz_entropy(&lx));
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % interval == 0 && finished < total {
                reporter.progress(finished, total);
            }
            (cohort.key, outcome)
        })
        .collect();

    let mut result = EntropyTable {
        total_cohorts: total,
        ..Default::default()
    };
    for (key, outcome) in outcomes {
        match outcome {
            Ok(h_n) => result.rows.push(CohortEntropy {
                key: key.clone(),
                h_n,
            }),
            Err(reason) => {
                log::debug!("entropy undefined for {}: {}", key, reason);
                *result.excluded.entry(reason).or_insert(0) += 1;
            }
        }
    }
    result.rows.sort_by(|a, b| a.key.cmp(&b.key));

    for (reason, count) in &result.excluded {
        reporter.warn(&format!("{} cohorts excluded: {}", count, reason));
    }
    reporter.info(&format!(
        "Completed! Successfully calculated H for {}/{} country-years",
        result.rows.len(),
        total
    ));

    result
}
