//! Dense LU factorization with partial pivoting
//!
//! Textbook Gaussian elimination used by the standalone unsymmetric path.
//! The factors are packed into one block (L strictly below the diagonal
//! with implicit unit diagonal, U on and above) together with the row
//! permutation chosen by pivoting.

use super::{LinAlgError, LinAlgResult, DEFAULT_PIVOT_TOLERANCE};
use crate::core::DenseBlock;
use nalgebra::DVector;

/// Packed LU factors and their row permutation
#[derive(Debug, Clone)]
pub struct LuFactors {
    packed: DenseBlock,
    // perm[i] = original row moved into position i
    perm: Vec<usize>,
}

impl LuFactors {
    /// Factor `block` with partial pivoting.
    ///
    /// At every step the remaining row with the largest pivot-column
    /// magnitude is swapped in; if even that magnitude falls below
    /// `tolerance` the matrix is reported singular.
    pub fn factorize(mut block: DenseBlock, tolerance: f64) -> LinAlgResult<Self> {
        let n = block.dim();
        let mut perm: Vec<usize> = (0..n).collect();

        for col in 0..n {
            // Choose the pivot row among the remaining candidates.
            let mut pivot_row = col;
            let mut pivot_mag = block.get(col, col).abs();
            for row in (col + 1)..n {
                let mag = block.get(row, col).abs();
                if mag > pivot_mag {
                    pivot_row = row;
                    pivot_mag = mag;
                }
            }
            if pivot_mag < tolerance {
                return Err(LinAlgError::SingularMatrix);
            }

            if pivot_row != col {
                for j in 0..n {
                    let tmp = block.get(col, j);
                    block.set(col, j, block.get(pivot_row, j));
                    block.set(pivot_row, j, tmp);
                }
                perm.swap(col, pivot_row);
            }

            let pivot = block.get(col, col);
            for row in (col + 1)..n {
                let multiplier = block.get(row, col) / pivot;
                block.set(row, col, multiplier);
                for j in (col + 1)..n {
                    let updated = block.get(row, j) - multiplier * block.get(col, j);
                    block.set(row, j, updated);
                }
            }
        }

        Ok(Self {
            packed: block,
            perm,
        })
    }

    /// Factor with the default pivot tolerance.
    pub fn factorize_default(block: DenseBlock) -> LinAlgResult<Self> {
        Self::factorize(block, DEFAULT_PIVOT_TOLERANCE)
    }

    /// Dimension of the factored matrix.
    pub fn dim(&self) -> usize {
        self.packed.dim()
    }

    /// Solve `A x = b` using the stored factors and permutation.
    pub fn solve(&self, rhs: &DVector<f64>) -> LinAlgResult<DVector<f64>> {
        let n = self.dim();
        if rhs.len() != n {
            return Err(LinAlgError::DimensionMismatch {
                expected: n,
                actual: rhs.len(),
            });
        }

        // Apply the row permutation, then L y = P b.
        let mut x = DVector::from_fn(n, |i, _| rhs[self.perm[i]]);
        for i in 0..n {
            for j in 0..i {
                let update = self.packed.get(i, j) * x[j];
                x[i] -= update;
            }
        }

        // U x = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let update = self.packed.get(i, j) * x[j];
                x[i] -= update;
            }
            x[i] /= self.packed.get(i, i);
        }

        Ok(x)
    }
}
