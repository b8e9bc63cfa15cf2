//! Sparse direct solvers
//!
//! This module contains the multifrontal engine and the surfaces it shares
//! with alternative backends:
//! - The [`SparseDirectSolver`] capability trait
//!   (analyze pattern → factorize → solve)
//! - Elimination tree and front graph construction
//! - The concurrent front scheduler and the assembler it drives
//! - Tree-ordered forward/backward substitution

pub mod assembler;
pub mod elimination_tree;
pub mod front_graph;
pub mod multifrontal;
pub mod scheduler;
pub mod substitution;

pub use elimination_tree::{EliminationTree, NaturalOrdering, OrderingStrategy};
pub use front_graph::{Front, FrontGraph, FrontId};
pub use multifrontal::MultifrontalSolver;

use crate::core::SparseMatrix;
use crate::error::FrontalResult;
use nalgebra::DVector;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the solver state machine and the front scheduler
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SolverError {
    /// Non-square matrix, non-positive order, or a size that does not match
    /// earlier phases
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// `factorize` was called before `analyze_pattern`
    #[error("pattern must be analyzed before factorization")]
    PatternNotAnalyzed,

    /// `solve` was called before `factorize` completed
    #[error("factorization must be completed before solving")]
    FactorizationNotDone,

    /// A front hit a near-zero diagonal pivot at the given variable
    #[error("singular pivot at variable {0}")]
    SingularPivot(usize),

    /// Scheduler infrastructure failure (poisoned lock, lost worker)
    #[error("front scheduler failed: {0}")]
    Scheduler(String),
}

/// Capability interface for sparse direct solvers
///
/// Both the multifrontal engine and external backend adapters satisfy this
/// contract, so callers can swap implementations freely. Operations must
/// occur in the strict order analyze → factorize → solve.
pub trait SparseDirectSolver {
    /// Run the symbolic analysis for the matrix pattern.
    fn analyze_pattern(&mut self, matrix: &SparseMatrix) -> FrontalResult<()>;

    /// Compute the numeric factorization. Requires a prior
    /// `analyze_pattern` on a matrix with the same dimensions.
    fn factorize(&mut self, matrix: &SparseMatrix) -> FrontalResult<()>;

    /// Solve `A x = rhs` using the stored factors. Repeatable; never
    /// mutates the factorization.
    fn solve(&self, rhs: &DVector<f64>) -> FrontalResult<DVector<f64>>;

    /// Whether `factorize` has completed since the last pattern analysis.
    fn is_factorized(&self) -> bool;
}

/// Configuration parameters for the multifrontal solver.
#[derive(Debug, Clone)]
pub struct MultifrontalConfig {
    /// Worker threads for the front scheduler; 0 selects the available
    /// hardware concurrency
    pub workers: usize,
    /// Pivot magnitudes below this fail factorization
    pub pivot_tolerance: f64,
    /// Bounded wait before an idle worker rescans for claimable fronts
    pub poll_interval: Duration,
}

impl Default for MultifrontalConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            pivot_tolerance: crate::linalg::DEFAULT_PIVOT_TOLERANCE,
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl MultifrontalConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of scheduler worker threads (0 = hardware concurrency)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the pivot tolerance
    pub fn with_pivot_tolerance(mut self, pivot_tolerance: f64) -> Self {
        self.pivot_tolerance = pivot_tolerance;
        self
    }

    /// Set the idle-worker poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Worker count after resolving the hardware-concurrency default.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            crate::parallel::available_workers()
        } else {
            self.workers
        }
    }
}
