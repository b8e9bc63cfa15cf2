//! Dense working block for frontal matrices
//!
//! Every front assembles into one of these before factorization. The block
//! is a thin domain wrapper over `nalgebra::DMatrix<f64>` adding the
//! scatter/gather operations the assembler needs.

use nalgebra::DMatrix;

/// Square dense matrix with element access, zeroing and sub-block
/// extraction/accumulation.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBlock {
    data: DMatrix<f64>,
}

impl DenseBlock {
    /// Zero-initialized block of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: DMatrix::zeros(dim, dim),
        }
    }

    /// Wrap an existing square matrix.
    pub fn from_matrix(data: DMatrix<f64>) -> Self {
        assert_eq!(data.nrows(), data.ncols(), "dense block must be square");
        Self { data }
    }

    /// Block dimension.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Overwrite the element at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[(row, col)] = value;
    }

    /// Accumulate into the element at `(row, col)`.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[(row, col)] += value;
    }

    /// Reset every element to zero.
    pub fn fill_zero(&mut self) {
        self.data.fill(0.0);
    }

    /// Extract the sub-block at the given local indices.
    pub fn sub_block(&self, indices: &[usize]) -> DenseBlock {
        let k = indices.len();
        let mut out = DMatrix::zeros(k, k);
        for (a, &i) in indices.iter().enumerate() {
            for (b, &j) in indices.iter().enumerate() {
                out[(a, b)] = self.data[(i, j)];
            }
        }
        DenseBlock::from_matrix(out)
    }

    /// Accumulate `other` into this block at the given local positions:
    /// `self[target[a], target[b]] += other[a, b]`.
    pub fn add_sub_block(&mut self, other: &DenseBlock, target: &[usize]) {
        debug_assert_eq!(other.dim(), target.len());
        for (a, &i) in target.iter().enumerate() {
            for (b, &j) in target.iter().enumerate() {
                self.data[(i, j)] += other.data[(a, b)];
            }
        }
    }

    /// Borrow the underlying matrix.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Consume the block and return the underlying matrix.
    pub fn into_matrix(self) -> DMatrix<f64> {
        self.data
    }
}
