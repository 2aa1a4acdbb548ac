//! Pipeline runner: grid → merge → rates → entropy
//!
//! Holds the run configuration and the reporter, so the same runner can be
//! applied to several input pairs.
//!
//! # Example
//! ```ignore
//! let pipeline = Pipeline::new(PipelineConfig::default(), LogReporter);
//! let output = pipeline.run(&survivorship, &fertility)?;
//! println!("{} cohorts with H_N", output.entropy.len());
//! ```

use crate::config::PipelineConfig;
use crate::entropy::{cohort_entropies, EntropyTable, Undefined};
use crate::error::Result;
use crate::input::{FertilityTable, SurvivorshipTable};
use crate::life_table::{annotate, build_grid, merge, LifeTable};
use crate::report::{LogReporter, Reporter};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Counts describing one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub common_cohorts: usize,
    pub life_table_rows: usize,
    pub entropy_defined: usize,
    pub entropy_excluded: BTreeMap<Undefined, usize>,
}

/// Both output tables plus the run summary
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub life_table: LifeTable,
    pub entropy: EntropyTable,

    /// Survivorship source after lx standardisation; `None` when disabled
    pub standardised: Option<SurvivorshipTable>,

    pub summary: RunSummary,
}

/// Configured pipeline
#[derive(Debug, Clone)]
pub struct Pipeline<R: Reporter = LogReporter> {
    config: PipelineConfig,
    reporter: R,
}

impl<R: Reporter> Pipeline<R> {
    pub fn new(config: PipelineConfig, reporter: R) -> Self {
        Self { config, reporter }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Build the merged life table (grid, merge, derived rates)
    pub fn life_table(
        &self,
        survivorship: &SurvivorshipTable,
        fertility: &FertilityTable,
    ) -> Result<LifeTable> {
        self.build(survivorship, fertility).map(|(table, _)| table)
    }

    /// Run the full pipeline
    pub fn run(
        &self,
        survivorship: &SurvivorshipTable,
        fertility: &FertilityTable,
    ) -> Result<PipelineOutput> {
        let (life_table, standardised) = self.build(survivorship, fertility)?;

        self.reporter
            .info("calculating Keyfitz entropy (H_N) for all country-years");
        let entropy = cohort_entropies(&life_table, &self.reporter);

        let summary = RunSummary {
            common_cohorts: entropy.total_cohorts,
            life_table_rows: life_table.len(),
            entropy_defined: entropy.len(),
            entropy_excluded: entropy.excluded.clone(),
        };

        Ok(PipelineOutput {
            life_table,
            entropy,
            standardised,
            summary,
        })
    }

    /// Life table plus the standardised survivorship table, if one was made
    fn build(
        &self,
        survivorship: &SurvivorshipTable,
        fertility: &FertilityTable,
    ) -> Result<(LifeTable, Option<SurvivorshipTable>)> {
        self.config.validate()?;

        let survivorship = if self.config.standardise_lx {
            let mut standardised = survivorship.clone();
            standardised.standardise_lx_within(&fertility.keys())?;
            self.reporter.info("standardised lx to a radix of 1.0");
            Cow::Owned(standardised)
        } else {
            Cow::Borrowed(survivorship)
        };

        let grid = build_grid(&survivorship.keys(), &fertility.keys(), self.config.age_range())?;
        if grid.is_empty() {
            self.reporter
                .warn("no cohorts are present in both the survivorship and fertility tables");
        }

        let mut table = merge(grid, &survivorship, fertility, &self.config)?;
        self.reporter.info(&format!(
            "merged survivorship and fertility into {} rows for {} cohorts",
            table.len(),
            table.cohort_count()
        ));

        annotate(&mut table)?;
        self.reporter
            .info("successfully completed calculations for additional variables");

        let standardised = match survivorship {
            Cow::Owned(table) => Some(table),
            Cow::Borrowed(_) => None,
        };
        Ok((table, standardised))
    }
}
