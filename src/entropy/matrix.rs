//! Dense square matrices and LU decomposition with partial pivoting

use std::ops::{Index, IndexMut};

/// Row-major dense square matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Square matrix with `values` on the first sub-diagonal (`m[i+1][i]`)
    pub fn subdiagonal(n: usize, values: &[f64]) -> Self {
        let mut m = Self::zeros(n);
        for (i, &v) in values.iter().take(n.saturating_sub(1)).enumerate() {
            m[(i + 1, i)] = v;
        }
        m
    }

    /// Element-wise `self - other`
    pub fn sub(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.n, other.n);
        Matrix {
            n: self.n,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a - b)
                .collect(),
        }
    }

    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(self.n, v.len());
        self.data
            .chunks(self.n.max(1))
            .take(self.n)
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.n + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.n + col]
    }
}

/// `PA = LU` factorization, L unit lower triangular, stored packed
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Matrix,
    perm: Vec<usize>,
}

impl LuDecomposition {
    /// Factor `a`; `None` when a pivot is exactly zero (singular matrix)
    pub fn factor(mut a: Matrix) -> Option<Self> {
        let n = a.n;
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            // Partial pivoting: largest magnitude in column k at or below row k
            let pivot_row = (k..n).max_by(|&i, &j| a[(i, k)].abs().total_cmp(&a[(j, k)].abs()))?;
            let pivot = a[(pivot_row, k)];
            if pivot == 0.0 || pivot.is_nan() {
                return None;
            }

            if pivot_row != k {
                for col in 0..n {
                    a.data.swap(k * n + col, pivot_row * n + col);
                }
                perm.swap(k, pivot_row);
            }

            for i in (k + 1)..n {
                let factor = a[(i, k)] / pivot;
                a[(i, k)] = factor;
                if factor != 0.0 {
                    for col in (k + 1)..n {
                        let upper = a[(k, col)];
                        a[(i, col)] -= factor * upper;
                    }
                }
            }
        }

        Some(Self { lu: a, perm })
    }

    /// Solve `A x = b`
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.lu.n;
        debug_assert_eq!(b.len(), n);

        // Forward substitution with the row permutation (L y = P b)
        let mut x: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum;
        }

        // Back substitution (U x = y)
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum / self.lu[(i, i)];
        }

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn from_rows(rows: &[&[f64]]) -> Matrix {
        let n = rows.len();
        let mut m = Matrix::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    #[test]
    fn test_solve_requires_pivoting() {
        // Zero in the leading position forces a row swap
        let a = from_rows(&[&[0.0, 2.0, 1.0], &[1.0, 1.0, 0.0], &[3.0, 0.0, 1.0]]);
        let b = [5.0, 3.0, 6.0];
        let lu = LuDecomposition::factor(a.clone()).unwrap();
        let x = lu.solve(&b);

        let back = a.mul_vec(&x);
        for (got, want) in back.iter().zip(&b) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_matrix_detected() {
        let a = from_rows(&[&[1.0, 2.0], &[2.0, 4.0]]);
        assert!(LuDecomposition::factor(a).is_none());
        assert!(LuDecomposition::factor(Matrix::zeros(3)).is_none());
    }

    #[test]
    fn test_unit_lower_bidiagonal_solve() {
        // (I - U) x = e1 gives x = cumulative products of the sub-diagonal
        let p = [0.5, 0.4, 0.0];
        let a = Matrix::identity(3).sub(&Matrix::subdiagonal(3, &p));
        let lu = LuDecomposition::factor(a).unwrap();
        let x = lu.solve(&[1.0, 0.0, 0.0]);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 0.5);
        assert_relative_eq!(x[2], 0.2);
    }

    #[test]
    fn test_subdiagonal_layout() {
        let m = Matrix::subdiagonal(3, &[0.7, 0.6, 0.0]);
        assert_eq!(m[(1, 0)], 0.7);
        assert_eq!(m[(2, 1)], 0.6);
        assert_eq!(m[(0, 0)], 0.0);
        assert_eq!(m[(0, 1)], 0.0);
    }
}
