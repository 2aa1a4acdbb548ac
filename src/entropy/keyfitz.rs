//! Keyfitz entropy via the fundamental matrix of an absorbing Markov chain
//!
//! Following Giaimo (2024), Eq. 2:
//!
//! ```text
//! H_N = (eᵗ N M N e1) / (eᵗ N e1),   N = (I - U)^-1,   M = diag(1 - p)
//! ```
//!
//! where `U` carries the one-step survival probabilities `p` on its first
//! sub-diagonal. For a constant hazard `H_N` tends to 1 as the chain gets
//! longer; the chain ends in certain death at its last age (`p = 0`), so a
//! short range with many survivors at the end gives a value below 1.

use super::matrix::{LuDecomposition, Matrix};
use thiserror::Error;

/// Why entropy could not be computed for a cohort
///
/// These are ordinary outcomes, not failures of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum Undefined {
    #[error("fewer than 2 ages after age 0")]
    TooFewAges,

    #[error("survivorship does not start at age 0")]
    MissingAgeZero,

    #[error("survivorship missing inside the age range")]
    MissingSurvivorship,

    #[error("I - U is singular")]
    SingularMatrix,

    #[error("zero denominator")]
    ZeroDenominator,

    #[error("non-finite result")]
    NonFinite,
}

/// One-step survival probabilities `p[a] = lx[a+1] / lx[a]`
///
/// Zero wherever `lx[a]` is not positive or the ratio is not finite; the
/// last entry is always zero.
pub fn survival_probabilities(lx: &[f64]) -> Vec<f64> {
    let mut p = vec![0.0; lx.len()];
    for (a, pair) in lx.windows(2).enumerate() {
        let (current, next) = (pair[0], pair[1]);
        if current > 0.0 && current.is_finite() {
            let ratio = next / current;
            if ratio.is_finite() {
                p[a] = ratio;
            }
        }
    }
    p
}

/// Calculate Keyfitz entropy `H_N` from a survivorship sequence
///
/// `lx` must be ordered by age with the age-0 entry first; that entry is
/// dropped before the chain is built. The input is not modified and scale
/// does not matter (only ratios of consecutive values are used).
pub fn keyfitz_entropy(lx: &[f64]) -> Result<f64, Undefined> {
    let lx = lx.get(1..).unwrap_or(&[]);
    let omega = lx.len();
    if omega < 2 {
        return Err(Undefined::TooFewAges);
    }

    let p = survival_probabilities(lx);

    let u = Matrix::subdiagonal(omega, &p[..omega - 1]);
    let lu = LuDecomposition::factor(Matrix::identity(omega).sub(&u))
        .ok_or(Undefined::SingularMatrix)?;

    let mut e1 = vec![0.0; omega];
    e1[0] = 1.0;

    // N e1, then N M N e1; eᵗ v is the sum of v
    let n_e1 = lu.solve(&e1);
    let denominator: f64 = n_e1.iter().sum();
    if denominator == 0.0 {
        return Err(Undefined::ZeroDenominator);
    }

    let m_n_e1: Vec<f64> = n_e1.iter().zip(&p).map(|(x, p)| (1.0 - p) * x).collect();
    let numerator: f64 = lu.solve(&m_n_e1).iter().sum();

    let h = numerator / denominator;
    if h.is_finite() {
        Ok(h)
    } else {
        Err(Undefined::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn exponential(rate: f64, ages: usize) -> Vec<f64> {
        (0..ages).map(|a| (-rate * a as f64).exp()).collect()
    }

    #[test]
    fn test_constant_hazard_gives_one() {
        for rate in [0.2, 0.5, 1.0] {
            let h = keyfitz_entropy(&exponential(rate, 111)).unwrap();
            assert_abs_diff_eq!(h, 1.0, epsilon = 1e-6);
        }
        // Shorter chain with a steep hazard
        let h = keyfitz_entropy(&exponential(1.0, 30)).unwrap();
        assert_abs_diff_eq!(h, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_truncated_chain_below_one() {
        // exp(-1.1) of the cohort still alive at the last age
        let h = keyfitz_entropy(&exponential(0.01, 111)).unwrap();
        assert_abs_diff_eq!(h, 0.45884317547453346, epsilon = 1e-9);
    }

    #[test]
    fn test_senescence_below_one() {
        let lx: Vec<f64> = (0..111).map(|a| (-0.0001 * (a * a) as f64).exp()).collect();
        let h = keyfitz_entropy(&lx).unwrap();
        assert!(h < 1.0);
        assert_abs_diff_eq!(h, 0.3046840277178697, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_ages_is_undefined() {
        assert_eq!(keyfitz_entropy(&[]), Err(Undefined::TooFewAges));
        assert_eq!(keyfitz_entropy(&[1.0]), Err(Undefined::TooFewAges));
        assert_eq!(keyfitz_entropy(&[1.0, 0.5]), Err(Undefined::TooFewAges));
        assert!(keyfitz_entropy(&[1.0, 0.5, 0.25]).is_ok());
    }

    #[test]
    fn test_zero_denominator_is_undefined() {
        // p0 = -1 makes eᵗ N e1 = 1 - 1 = 0
        assert_eq!(
            keyfitz_entropy(&[5.0, 1.0, -1.0]),
            Err(Undefined::ZeroDenominator)
        );
    }

    #[test]
    fn test_overflowing_chain_is_non_finite() {
        let lx = [1.0, 1.0, 1e300, 1e308, 1.0];
        assert_eq!(keyfitz_entropy(&lx), Err(Undefined::NonFinite));
    }

    #[test]
    fn test_underflowed_pivot_is_singular() {
        // Elimination factor 1e-200 / 1e200 underflows to zero, leaving a zero pivot
        let lx = [1.0, 1e-200, 1.0, 1e200, 1.0];
        assert_eq!(keyfitz_entropy(&lx), Err(Undefined::SingularMatrix));
    }

    #[test]
    fn test_zero_survivorship_does_not_divide_by_zero() {
        let lx = [1.0, 0.9, 0.8, 0.0];
        let p = survival_probabilities(&lx[1..]);
        assert_eq!(p.len(), 3);
        assert_eq!(p[1], 0.0);
        assert_eq!(p[2], 0.0);
        assert!(p.iter().all(|v| v.is_finite()));

        let h = keyfitz_entropy(&lx).unwrap();
        assert_abs_diff_eq!(h, 0.5816993464052288, epsilon = 1e-12);
    }

    #[test]
    fn test_toy_cohort_values() {
        let h = keyfitz_entropy(&[1.0, 0.95, 0.85, 0.7]).unwrap();
        assert_abs_diff_eq!(h, 0.4946749226006191, epsilon = 1e-12);
    }

    #[test]
    fn test_probabilities_ignore_bad_values() {
        let p = survival_probabilities(&[0.0, 0.5, f64::NAN, 0.2, 0.0, 0.1]);
        assert_eq!(p, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_input_not_modified_and_scale_free() {
        let lx = vec![100_000.0, 95_000.0, 85_000.0, 70_000.0];
        let before = lx.clone();
        let scaled = keyfitz_entropy(&lx).unwrap();
        assert_eq!(lx, before);

        let standard = keyfitz_entropy(&[1.0, 0.95, 0.85, 0.7]).unwrap();
        assert_abs_diff_eq!(scaled, standard, epsilon = 1e-12);
    }
}
