//! Read-only sparse matrix view
//!
//! A matrix is presented as a collection of (row, column, value) entries
//! plus its dimensions. Construction rejects out-of-bounds indices and
//! duplicate positions; afterwards the view is immutable. The symbolic
//! phase consumes the pattern through [`SparseMatrix::row_adjacency`], the
//! numeric phase through [`SparseMatrix::entries`].

use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while constructing or accessing a sparse matrix view
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SparseError {
    /// Entry index outside the matrix dimensions
    #[error("entry ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two entries were given for the same position
    #[error("duplicate entry at ({row}, {col})")]
    DuplicateEntry { row: usize, col: usize },
}

/// Capability interface for read-only sparse matrix access
///
/// Both the multifrontal engine and external backend adapters consume
/// matrices through this contract, keeping concrete representations
/// swappable.
pub trait SparseAccess {
    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn cols(&self) -> usize;

    /// Number of stored nonzero entries
    fn nnz(&self) -> usize;

    /// Matrix-vector product `y = A * x`
    fn mat_vec(&self, x: &[f64]) -> Vec<f64>;
}

/// Immutable sparse matrix built from triplets
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
    /// Build a matrix view from `(row, col, value)` triplets.
    ///
    /// The triplet order is irrelevant. Out-of-bounds indices and duplicate
    /// positions are rejected; explicit zeros are kept as structural
    /// entries.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> Result<Self, SparseError> {
        let mut seen = HashSet::with_capacity(triplets.len());
        for &(row, col, _) in triplets {
            if row >= rows || col >= cols {
                return Err(SparseError::IndexOutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            if !seen.insert((row, col)) {
                return Err(SparseError::DuplicateEntry { row, col });
            }
        }

        Ok(Self {
            rows,
            cols,
            entries: triplets.to_vec(),
        })
    }

    /// All stored entries as `(row, col, value)` triplets.
    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored nonzero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Whether the matrix has as many rows as columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Undirected adjacency of the off-diagonal pattern, one sorted and
    /// deduplicated neighbor list per row/column variable.
    ///
    /// Symmetric inputs may carry one or both triangles; the adjacency is
    /// the same either way.
    pub fn row_adjacency(&self) -> Vec<Vec<usize>> {
        let n = self.rows.max(self.cols);
        let mut adjacency = vec![Vec::new(); n];
        for &(row, col, _) in &self.entries {
            if row != col {
                adjacency[row].push(col);
                adjacency[col].push(row);
            }
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }
        adjacency
    }
}

impl SparseAccess for SparseMatrix {
    fn rows(&self) -> usize {
        SparseMatrix::rows(self)
    }

    fn cols(&self) -> usize {
        SparseMatrix::cols(self)
    }

    fn nnz(&self) -> usize {
        SparseMatrix::nnz(self)
    }

    fn mat_vec(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.cols);
        let mut y = vec![0.0; self.rows];
        for &(row, col, value) in &self.entries {
            y[row] += value * x[col];
        }
        y
    }
}
