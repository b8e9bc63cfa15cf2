//! Sparse Cholesky backend via faer
//!
//! Alternative backend satisfying the same [`SparseDirectSolver`] contract
//! as the multifrontal engine. The symbolic pattern is cached at
//! `analyze_pattern` and reused across numeric refactorizations, so
//! repeated factorize/solve cycles on a fixed pattern skip the symbolic
//! work.
//!
//! Symmetric inputs must carry both triangles (or at least the lower one);
//! the factorization reads the lower side.

use crate::core::SparseMatrix;
use crate::error::{FrontalError, FrontalResult};
use crate::solvers::{SolverError, SparseDirectSolver};
use faer::linalg::solvers::Solve;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::{SparseColMat, Triplet};
use faer::{Mat, Side};
use nalgebra::DVector;

/// Sparse direct solver backed by faer's simplicial LLT
pub struct FaerCholeskySolver {
    order: Option<usize>,
    symbolic: Option<SymbolicLlt<usize>>,
    factors: Option<Llt<usize, f64>>,
}

impl FaerCholeskySolver {
    pub fn new() -> Self {
        Self {
            order: None,
            symbolic: None,
            factors: None,
        }
    }

    fn to_faer(matrix: &SparseMatrix) -> FrontalResult<SparseColMat<usize, f64>> {
        let triplets: Vec<_> = matrix
            .entries()
            .iter()
            .map(|&(row, col, value)| Triplet::new(row, col, value))
            .collect();

        SparseColMat::try_new_from_triplets(matrix.rows(), matrix.cols(), &triplets).map_err(
            |e| FrontalError::LinearAlgebra(format!("failed to create sparse matrix: {e:?}")),
        )
    }

    fn check_dimensions(matrix: &SparseMatrix) -> FrontalResult<()> {
        if !matrix.is_square() || matrix.rows() == 0 {
            return Err(SolverError::InvalidDimension(format!(
                "matrix must be square with positive order, got {}x{}",
                matrix.rows(),
                matrix.cols()
            ))
            .into());
        }
        Ok(())
    }
}

impl Default for FaerCholeskySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseDirectSolver for FaerCholeskySolver {
    fn analyze_pattern(&mut self, matrix: &SparseMatrix) -> FrontalResult<()> {
        Self::check_dimensions(matrix)?;

        let faer_matrix = Self::to_faer(matrix)?;
        let symbolic = SymbolicLlt::try_new(faer_matrix.symbolic(), Side::Lower).map_err(|e| {
            FrontalError::LinearAlgebra(format!("symbolic factorization failed: {e:?}"))
        })?;

        self.order = Some(matrix.rows());
        self.symbolic = Some(symbolic);
        self.factors = None;
        Ok(())
    }

    fn factorize(&mut self, matrix: &SparseMatrix) -> FrontalResult<()> {
        let order = self.order.ok_or(SolverError::PatternNotAnalyzed)?;
        let symbolic = self
            .symbolic
            .as_ref()
            .ok_or(SolverError::PatternNotAnalyzed)?;

        if matrix.rows() != order || matrix.cols() != order {
            return Err(SolverError::InvalidDimension(format!(
                "matrix is {}x{} but the analyzed pattern has order {order}",
                matrix.rows(),
                matrix.cols()
            ))
            .into());
        }

        let faer_matrix = Self::to_faer(matrix)?;
        let factors =
            Llt::try_new_with_symbolic(symbolic.clone(), faer_matrix.as_ref(), Side::Lower)
                .map_err(|e| {
                    FrontalError::LinearAlgebra(format!(
                        "sparse Cholesky factorization failed: {e:?}"
                    ))
                })?;

        self.factors = Some(factors);
        Ok(())
    }

    fn solve(&self, rhs: &DVector<f64>) -> FrontalResult<DVector<f64>> {
        let factors = self.factors.as_ref().ok_or(SolverError::FactorizationNotDone)?;
        let order = self.order.ok_or(SolverError::FactorizationNotDone)?;

        if rhs.len() != order {
            return Err(SolverError::InvalidDimension(format!(
                "right-hand side has length {} but the matrix has order {order}",
                rhs.len()
            ))
            .into());
        }

        let b = Mat::from_fn(order, 1, |i, _| rhs[i]);
        let x = factors.solve(b);
        Ok(DVector::from_fn(order, |i, _| x[(i, 0)]))
    }

    fn is_factorized(&self) -> bool {
        self.factors.is_some()
    }
}
