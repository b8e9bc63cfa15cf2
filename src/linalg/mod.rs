//! Dense factorization kernels and backend adapters
//!
//! This module provides the numeric kernels used by the multifrontal engine
//! and the alternative sparse backend:
//! - In-place LDL^T over dense blocks (partial or full elimination)
//! - Dense LU with partial pivoting for the unsymmetric path
//! - Sparse Cholesky backend via faer

pub mod cholesky;
pub mod ldlt;
pub mod lu;

pub use cholesky::FaerCholeskySolver;
pub use ldlt::{ldlt_in_place, solve_ldlt};
pub use lu::LuFactors;

use thiserror::Error;

/// Result type for dense kernel operations
pub type LinAlgResult<T> = Result<T, LinAlgError>;

/// Pivot magnitudes below this are treated as numerically zero.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Errors raised by the dense factorization kernels
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinAlgError {
    /// A diagonal pivot fell below tolerance during LDL^T
    #[error("singular pivot at index {0}")]
    SingularPivot(usize),

    /// No acceptable pivot remained during LU with partial pivoting
    #[error("matrix is singular to working precision")]
    SingularMatrix,

    /// Operand dimensions do not agree
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
