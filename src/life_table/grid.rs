//! Age grid: one row per (common cohort, age)

use super::row::LifeTableRow;
use crate::cohort::CohortKey;
use crate::config::AgeRange;
use crate::error::{LifeTableError, Result};
use std::collections::BTreeSet;

/// Cross product of the common cohort keys and the configured ages
#[derive(Debug, Clone)]
pub struct AgeGrid {
    keys: BTreeSet<CohortKey>,
    range: AgeRange,
    rows: Vec<LifeTableRow>,
}

impl AgeGrid {
    pub fn keys(&self) -> &BTreeSet<CohortKey> {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn expected_len(&self) -> usize {
        self.keys.len() * self.range.span()
    }

    /// Fail if the grid does not hold exactly one row per (cohort, age)
    pub fn verify(&self) -> Result<()> {
        verify_cardinality(self.expected_len(), self.rows.len())?;
        let dense = self.rows.chunks(self.range.span()).all(|chunk| {
            chunk
                .iter()
                .zip(self.range.ages())
                .all(|(row, age)| row.age == age && row.key == chunk[0].key)
        });
        if !dense {
            return Err(LifeTableError::GridCardinality {
                expected: self.expected_len(),
                actual: self.rows.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (BTreeSet<CohortKey>, AgeRange, Vec<LifeTableRow>) {
        (self.keys, self.range, self.rows)
    }
}

pub(crate) fn verify_cardinality(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(LifeTableError::GridCardinality { expected, actual });
    }
    Ok(())
}

/// Build the grid for cohorts present in both sources
///
/// Keys are held in a `BTreeSet`, so the intersection is de-duplicated and
/// the grid comes out sorted by (country_code, suffix, year, age).
pub fn build_grid(
    survivorship_keys: &BTreeSet<CohortKey>,
    fertility_keys: &BTreeSet<CohortKey>,
    range: AgeRange,
) -> Result<AgeGrid> {
    let keys: BTreeSet<CohortKey> = survivorship_keys
        .intersection(fertility_keys)
        .cloned()
        .collect();

    let rows = keys
        .iter()
        .flat_map(|key| range.ages().map(move |age| LifeTableRow::new(key.clone(), age)))
        .collect();

    let grid = AgeGrid { keys, range, rows };
    grid.verify()?;

    log::debug!(
        "built age grid: {} common cohorts x {} ages = {} rows",
        grid.keys.len(),
        range.span(),
        grid.rows.len()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[(&str, &str, i32)]) -> BTreeSet<CohortKey> {
        items
            .iter()
            .map(|(code, suffix, year)| CohortKey::new(code, Some(suffix), *year))
            .collect()
    }

    #[test]
    fn test_grid_uses_common_keys_only() {
        let hmd = keys(&[("SWE", "", 2000), ("SWE", "", 2001), ("DEU", "TE", 1956)]);
        let hfd = keys(&[("SWE", "", 2001), ("DEU", "TE", 1956), ("USA", "", 1990)]);
        let range = AgeRange { min: 10, max: 14 };

        let grid = build_grid(&hmd, &hfd, range).unwrap();
        assert_eq!(grid.keys().len(), 2);
        assert_eq!(grid.len(), 2 * 5);
        assert_eq!(grid.len(), grid.expected_len());
    }

    #[test]
    fn test_suffix_must_match_exactly() {
        let hmd = keys(&[("DEU", "TE", 1956)]);
        let hfd = keys(&[("DEU", "", 1956)]);
        let grid = build_grid(&hmd, &hfd, AgeRange { min: 0, max: 3 }).unwrap();
        assert!(grid.is_empty());
        assert!(grid.verify().is_ok());
    }

    #[test]
    fn test_grid_rows_sorted_and_dense() {
        let both = keys(&[("SWE", "", 2000), ("DEU", "", 2000)]);
        let grid = build_grid(&both, &both, AgeRange { min: 0, max: 2 }).unwrap();
        let (_, _, rows) = grid.into_parts();

        let labels: Vec<(String, u32)> = rows
            .iter()
            .map(|r| (r.key.country_code.clone(), r.age))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("DEU".to_string(), 0),
                ("DEU".to_string(), 1),
                ("DEU".to_string(), 2),
                ("SWE".to_string(), 0),
                ("SWE".to_string(), 1),
                ("SWE".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_cardinality_mismatch_detected() {
        assert!(verify_cardinality(4, 4).is_ok());
        assert!(matches!(
            verify_cardinality(8, 7),
            Err(LifeTableError::GridCardinality { expected: 8, actual: 7 })
        ));
    }
}
