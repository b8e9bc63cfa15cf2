//! Error types for the frontal-solver library
//!
//! This module provides the main error and result types used throughout the
//! library. All errors use the `thiserror` crate for automatic trait
//! implementations; module-specific errors convert into [`FrontalError`].

use crate::{core::sparse::SparseError, linalg::LinAlgError, solvers::SolverError};
use thiserror::Error;

/// Main result type used throughout the frontal-solver library
pub type FrontalResult<T> = Result<T, FrontalError>;

/// Main error type for the frontal-solver library
#[derive(Debug, Clone, Error)]
pub enum FrontalError {
    /// Sparse matrix construction or access errors
    #[error("Sparse matrix error: {0}")]
    Sparse(String),

    /// Dense factorization kernel errors
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Solver state-machine and scheduling errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// Convert module-specific errors to FrontalError

impl From<SparseError> for FrontalError {
    fn from(err: SparseError) -> Self {
        FrontalError::Sparse(err.to_string())
    }
}

impl From<LinAlgError> for FrontalError {
    fn from(err: LinAlgError) -> Self {
        FrontalError::LinearAlgebra(err.to_string())
    }
}

impl From<SolverError> for FrontalError {
    fn from(err: SolverError) -> Self {
        FrontalError::Solver(err.to_string())
    }
}
