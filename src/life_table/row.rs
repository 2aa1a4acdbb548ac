//! Merged life table rows

use crate::cohort::CohortKey;
use crate::config::AgeRange;

/// One (cohort, age) row of the merged life table
///
/// Every value is optional: `lx`/`mx` are missing when the source had no
/// row, derived fields are missing when their inputs are.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeTableRow {
    pub key: CohortKey,
    pub age: u32,

    // Source values
    pub lx: Option<f64>,
    pub mx: Option<f64>,

    // Derived by the rate calculator
    pub lxmx: Option<f64>,
    pub dx: Option<f64>,
    pub qx: Option<f64>,
    pub sx: Option<f64>,
    pub vx: Option<f64>,
}

impl LifeTableRow {
    /// Create an empty grid row
    pub fn new(key: CohortKey, age: u32) -> Self {
        Self {
            key,
            age,
            lx: None,
            mx: None,
            lxmx: None,
            dx: None,
            qx: None,
            sx: None,
            vx: None,
        }
    }
}

/// Dense life table: `range.span()` contiguous rows per cohort,
/// ordered by (country_code, suffix, year, age)
#[derive(Debug, Clone, PartialEq)]
pub struct LifeTable {
    rows: Vec<LifeTableRow>,
    range: AgeRange,
}

impl LifeTable {
    pub(crate) fn from_rows(rows: Vec<LifeTableRow>, range: AgeRange) -> Self {
        Self { rows, range }
    }

    pub fn rows(&self) -> &[LifeTableRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [LifeTableRow] {
        &mut self.rows
    }

    pub fn age_range(&self) -> AgeRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Contiguous slices of rows sharing one cohort key
    pub fn cohorts(&self) -> impl Iterator<Item = &[LifeTableRow]> {
        self.rows.chunk_by(|a, b| a.key == b.key)
    }

    pub fn cohort_count(&self) -> usize {
        self.cohorts().count()
    }

    /// Row for a given cohort and age, if within the grid
    pub fn get(&self, key: &CohortKey, age: u32) -> Option<&LifeTableRow> {
        self.rows
            .binary_search_by(|row| (&row.key, row.age).cmp(&(key, age)))
            .ok()
            .map(|idx| &self.rows[idx])
    }
}
