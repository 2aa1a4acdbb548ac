//! Derived life table columns: lxmx, dx, qx, sx and vx
//!
//! Each cohort is processed on its own, ages ascending. "Next age" never
//! crosses into another cohort, so the last age of every cohort has no
//! dx, qx or sx.
//!
//! `vx` sums lxmx from the current age to `max_age` only. When `max_age` is
//! below the true maximum lifespan this is a truncated approximation of the
//! remaining reproduction.

use super::row::{LifeTable, LifeTableRow};
use crate::error::{LifeTableError, Result};

/// Annotate every cohort of the table in place
pub fn annotate(table: &mut LifeTable) -> Result<()> {
    let mut cohorts = 0usize;
    for cohort in table.rows_mut().chunk_by_mut(|a, b| a.key == b.key) {
        annotate_cohort(cohort)?;
        cohorts += 1;
    }
    log::debug!("calculated derived rates for {} cohorts", cohorts);
    Ok(())
}

/// Annotate one cohort's rows, which must be strictly ascending by age
pub fn annotate_cohort(rows: &mut [LifeTableRow]) -> Result<()> {
    if let Some(pair) = rows.windows(2).find(|pair| pair[1].age <= pair[0].age) {
        return Err(LifeTableError::AgeOrder {
            key: pair[1].key.clone(),
            age: pair[1].age,
        });
    }

    let next_lx: Vec<Option<Option<f64>>> = (0..rows.len())
        .map(|i| rows.get(i + 1).map(|next| next.lx))
        .collect();

    for (row, next) in rows.iter_mut().zip(next_lx) {
        row.lxmx = product(row.lx, row.mx);
        match next {
            Some(next) => {
                row.dx = difference(row.lx, next);
                row.qx = death_probability(row.lx, next);
                row.sx = row.qx.map(|q| 1.0 - q);
            }
            None => {
                row.dx = None;
                row.qx = None;
                row.sx = None;
            }
        }
    }

    // Reverse cumulative lxmx; a missing lxmx adds nothing but has no vx itself
    let mut remaining = 0.0;
    for row in rows.iter_mut().rev() {
        row.vx = match row.lxmx {
            Some(lxmx) => {
                remaining += lxmx;
                ratio(remaining, row.lx)
            }
            None => None,
        };
    }

    Ok(())
}

fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?)
}

fn difference(lx: Option<f64>, next: Option<f64>) -> Option<f64> {
    Some(lx? - next?)
}

/// qx = 1 - lx[a+1]/lx[a]; undefined for zero or missing lx[a]
fn death_probability(lx: Option<f64>, next: Option<f64>) -> Option<f64> {
    let q = 1.0 - next? / lx.filter(|&v| v != 0.0)?;
    q.is_finite().then_some(q)
}

fn ratio(numerator: f64, lx: Option<f64>) -> Option<f64> {
    let v = numerator / lx.filter(|&v| v != 0.0)?;
    v.is_finite().then_some(v)
}
