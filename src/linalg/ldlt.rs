//! In-place LDL^T factorization of dense blocks
//!
//! The kernel eliminates the leading `npivots` columns of a symmetric
//! block. After it returns:
//! - position (i, i), i < npivots holds D(i)
//! - position (j, i), j > i, i < npivots holds L(j, i); the unit diagonal
//!   of L is implicit
//! - the trailing (k - npivots)² block holds the Schur complement of the
//!   eliminated columns
//!
//! With `npivots == dim` this is the full LDL^T used by the root front and
//! the dense reference path. A pivot whose magnitude falls below the
//! tolerance aborts with [`LinAlgError::SingularPivot`] carrying the local
//! pivot index; proceeding past a near-zero pivot would silently corrupt
//! every later column.

use super::{LinAlgError, LinAlgResult};
use crate::core::DenseBlock;
use nalgebra::DVector;

/// Eliminate the leading `npivots` columns of `block` in place.
///
/// Reads the lower triangle; the strict upper triangle of the eliminated
/// columns is left untouched.
pub fn ldlt_in_place(block: &mut DenseBlock, npivots: usize, tolerance: f64) -> LinAlgResult<()> {
    let k = block.dim();
    debug_assert!(npivots <= k);

    for i in 0..npivots {
        // D(i) = F(i,i) - sum_{p<i} L(i,p)^2 D(p)
        let mut d = block.get(i, i);
        for p in 0..i {
            let l_ip = block.get(i, p);
            d -= l_ip * l_ip * block.get(p, p);
        }
        if d.abs() < tolerance {
            return Err(LinAlgError::SingularPivot(i));
        }
        block.set(i, i, d);

        // L(j,i) = (F(j,i) - sum_{p<i} L(j,p) L(i,p) D(p)) / D(i)
        for j in (i + 1)..k {
            let mut sum = block.get(j, i);
            for p in 0..i {
                sum -= block.get(j, p) * block.get(i, p) * block.get(p, p);
            }
            block.set(j, i, sum / d);
        }
    }

    // Trailing block becomes the Schur complement of the eliminated columns.
    if npivots < k {
        for r in npivots..k {
            for c in npivots..=r {
                let mut sum = 0.0;
                for p in 0..npivots {
                    sum += block.get(r, p) * block.get(c, p) * block.get(p, p);
                }
                let updated = block.get(r, c) - sum;
                block.set(r, c, updated);
                block.set(c, r, updated);
            }
        }
    }

    Ok(())
}

/// Solve `A x = b` given a fully factorized block (`npivots == dim`).
///
/// Forward substitution with the unit-lower L, diagonal scaling by D, then
/// backward substitution with L^T. Used as the dense reference path in
/// tests and by callers that factor a whole block at once.
pub fn solve_ldlt(factored: &DenseBlock, rhs: &DVector<f64>) -> LinAlgResult<DVector<f64>> {
    let k = factored.dim();
    if rhs.len() != k {
        return Err(LinAlgError::DimensionMismatch {
            expected: k,
            actual: rhs.len(),
        });
    }

    let mut x = rhs.clone();

    // L y = b
    for i in 0..k {
        for j in 0..i {
            x[i] -= factored.get(i, j) * x[j];
        }
    }

    // D z = y
    for i in 0..k {
        x[i] /= factored.get(i, i);
    }

    // L^T x = z
    for i in (0..k).rev() {
        for j in (i + 1)..k {
            x[i] -= factored.get(j, i) * x[j];
        }
    }

    Ok(x)
}
