//! Input record types for the two source tables

use crate::cohort::CohortKey;
use crate::error::{LifeTableError, Result, Source};
use std::collections::{BTreeSet, HashMap};

/// One survivorship value from the mortality source
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivorshipRecord {
    pub key: CohortKey,
    pub age: u32,
    pub lx: Option<f64>,
}

/// One age-specific fertility rate from the fertility source
#[derive(Debug, Clone, PartialEq)]
pub struct FertilityRecord {
    pub key: CohortKey,
    pub age: u32,
    pub mx: Option<f64>,
}

/// Survivorship source table (lx by cohort and age)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurvivorshipTable {
    pub records: Vec<SurvivorshipRecord>,
}

/// Fertility source table (mx by cohort and age)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FertilityTable {
    pub records: Vec<FertilityRecord>,
}

impl SurvivorshipTable {
    pub fn new(records: Vec<SurvivorshipRecord>) -> Self {
        Self { records }
    }

    /// Distinct cohort keys present in the table
    pub fn keys(&self) -> BTreeSet<CohortKey> {
        self.records.iter().map(|r| r.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rescale lx so that each cohort starts at 1.0 at age 0
    ///
    /// Cohorts without a positive age-0 value lose their lx entirely
    /// (set to `None`) rather than being scaled by a meaningless divisor.
    /// Two age-0 rows for one cohort are a `DuplicateRecord`.
    pub fn standardise_lx(&mut self) -> Result<()> {
        self.standardise(None)
    }

    /// Like [`standardise_lx`](Self::standardise_lx), but only cohorts in
    /// `keys` are checked for duplicate age-0 rows
    ///
    /// Any other cohort with an ambiguous radix has its lx cleared.
    pub fn standardise_lx_within(&mut self, keys: &BTreeSet<CohortKey>) -> Result<()> {
        self.standardise(Some(keys))
    }

    fn standardise(&mut self, keys: Option<&BTreeSet<CohortKey>>) -> Result<()> {
        let mut radix: HashMap<CohortKey, Option<f64>> = HashMap::new();
        for record in self.records.iter().filter(|r| r.age == 0) {
            if radix.insert(record.key.clone(), record.lx).is_some() {
                if keys.map_or(true, |keys| keys.contains(&record.key)) {
                    return Err(LifeTableError::DuplicateRecord {
                        source_table: Source::Survivorship,
                        key: record.key.clone(),
                        age: 0,
                    });
                }
                radix.insert(record.key.clone(), None);
            }
        }

        for record in &mut self.records {
            let lx0 = radix
                .get(&record.key)
                .copied()
                .flatten()
                .filter(|&v| v > 0.0);
            record.lx = match (record.lx, lx0) {
                (Some(lx), Some(lx0)) => Some(lx / lx0),
                _ => None,
            };
        }

        log::debug!("standardised lx for {} cohorts", radix.len());
        Ok(())
    }
}

impl FertilityTable {
    pub fn new(records: Vec<FertilityRecord>) -> Self {
        Self { records }
    }

    /// Distinct cohort keys present in the table
    pub fn keys(&self) -> BTreeSet<CohortKey> {
        self.records.iter().map(|r| r.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
