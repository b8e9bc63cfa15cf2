//! Multifrontal sparse symmetric direct solver
//!
//! Ties the pipeline together behind the [`SparseDirectSolver`] contract:
//! `analyze_pattern` builds the elimination tree and the front graph,
//! `factorize` runs the concurrent front scheduler, `solve` performs the
//! tree-ordered substitution passes. The engine works in position space
//! (the elimination order of the configured [`OrderingStrategy`]); the
//! right-hand side and solution are permuted at the boundary.
//!
//! Any failure leaves the solver in a state where the failed phase must be
//! redone from `analyze_pattern`; partial results are never reused.

use crate::core::SparseMatrix;
use crate::error::FrontalResult;
use crate::solvers::elimination_tree::{EliminationTree, NaturalOrdering, OrderingStrategy};
use crate::solvers::front_graph::FrontGraph;
use crate::solvers::scheduler::{self, FrontFactors};
use crate::solvers::substitution;
use crate::solvers::{MultifrontalConfig, SolverError, SparseDirectSolver};
use nalgebra::DVector;
use tracing::{debug, info};

/// Sparse symmetric direct solver based on the multifrontal method
pub struct MultifrontalSolver {
    config: MultifrontalConfig,
    ordering: Box<dyn OrderingStrategy>,
    /// order[k] = variable eliminated at step k
    order: Vec<usize>,
    /// position[v] = elimination step of variable v
    position: Vec<usize>,
    tree: Option<EliminationTree>,
    graph: Option<FrontGraph>,
    factors: Option<Vec<FrontFactors>>,
}

impl MultifrontalSolver {
    /// Create a solver with the default configuration and natural ordering.
    pub fn new() -> Self {
        Self::with_config(MultifrontalConfig::default())
    }

    /// Create a solver with the given configuration.
    pub fn with_config(config: MultifrontalConfig) -> Self {
        Self {
            config,
            ordering: Box::new(NaturalOrdering),
            order: Vec::new(),
            position: Vec::new(),
            tree: None,
            graph: None,
            factors: None,
        }
    }

    /// Replace the elimination ordering strategy. Invalidates any prior
    /// analysis.
    pub fn with_ordering(mut self, ordering: Box<dyn OrderingStrategy>) -> Self {
        self.ordering = ordering;
        self.tree = None;
        self.graph = None;
        self.factors = None;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &MultifrontalConfig {
        &self.config
    }

    /// Elimination tree of the analyzed pattern, if any.
    pub fn elimination_tree(&self) -> Option<&EliminationTree> {
        self.tree.as_ref()
    }

    /// Front graph of the analyzed pattern, if any.
    pub fn front_graph(&self) -> Option<&FrontGraph> {
        self.graph.as_ref()
    }

    fn check_square(matrix: &SparseMatrix) -> Result<usize, SolverError> {
        if !matrix.is_square() || matrix.rows() == 0 {
            return Err(SolverError::InvalidDimension(format!(
                "matrix must be square with positive order, got {}x{}",
                matrix.rows(),
                matrix.cols()
            )));
        }
        Ok(matrix.rows())
    }

    fn validate_ordering(order: &[usize], n: usize) -> Result<(), SolverError> {
        if order.len() != n {
            return Err(SolverError::InvalidDimension(format!(
                "ordering has length {} but the matrix has order {n}",
                order.len()
            )));
        }
        let mut seen = vec![false; n];
        for &v in order {
            if v >= n || seen[v] {
                return Err(SolverError::InvalidDimension(
                    "ordering is not a permutation of the variables".to_string(),
                ));
            }
            seen[v] = true;
        }
        Ok(())
    }

    /// Adjacency relabeled into elimination-position space.
    fn permuted_adjacency(&self, matrix: &SparseMatrix) -> Vec<Vec<usize>> {
        let adjacency = matrix.row_adjacency();
        self.order
            .iter()
            .map(|&v| {
                let mut neighbors: Vec<usize> =
                    adjacency[v].iter().map(|&w| self.position[w]).collect();
                neighbors.sort_unstable();
                neighbors
            })
            .collect()
    }
}

impl Default for MultifrontalSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseDirectSolver for MultifrontalSolver {
    fn analyze_pattern(&mut self, matrix: &SparseMatrix) -> FrontalResult<()> {
        let n = Self::check_square(matrix)?;

        let order = self.ordering.ordering(matrix);
        Self::validate_ordering(&order, n)?;
        let mut position = vec![0; n];
        for (k, &v) in order.iter().enumerate() {
            position[v] = k;
        }
        self.order = order;
        self.position = position;

        let adjacency = self.permuted_adjacency(matrix);
        let tree = EliminationTree::from_adjacency(&adjacency);
        let graph = FrontGraph::build(&tree, &adjacency);

        info!(
            variables = n,
            fronts = graph.len(),
            roots = tree.roots().len(),
            "pattern analyzed"
        );

        self.tree = Some(tree);
        self.graph = Some(graph);
        self.factors = None;
        Ok(())
    }

    fn factorize(&mut self, matrix: &SparseMatrix) -> FrontalResult<()> {
        // Stale factors must not survive a failed attempt.
        self.factors = None;

        let graph = self.graph.as_ref().ok_or(SolverError::PatternNotAnalyzed)?;
        let n = self.order.len();

        if matrix.rows() != n || matrix.cols() != n {
            return Err(SolverError::InvalidDimension(format!(
                "matrix is {}x{} but the analyzed pattern has order {n}",
                matrix.rows(),
                matrix.cols()
            ))
            .into());
        }

        let mut owned: Vec<Vec<(usize, usize, f64)>> = vec![Vec::new(); n];
        for &(row, col, value) in matrix.entries() {
            let (r, c) = (self.position[row], self.position[col]);
            owned[graph.owner_of(r, c)].push((r, c, value));
        }

        let outcome = scheduler::run_scheduler(graph, &owned, &self.order, &self.config)?;
        debug!(fronts = outcome.factors.len(), "factorization complete");

        self.factors = Some(outcome.factors);
        Ok(())
    }

    fn solve(&self, rhs: &DVector<f64>) -> FrontalResult<DVector<f64>> {
        let factors = self.factors.as_ref().ok_or(SolverError::FactorizationNotDone)?;
        let graph = self.graph.as_ref().ok_or(SolverError::FactorizationNotDone)?;
        let tree = self.tree.as_ref().ok_or(SolverError::FactorizationNotDone)?;
        let n = self.order.len();

        if rhs.len() != n {
            return Err(SolverError::InvalidDimension(format!(
                "right-hand side has length {} but the matrix has order {n}",
                rhs.len()
            ))
            .into());
        }

        let permuted_rhs: Vec<f64> = self.order.iter().map(|&v| rhs[v]).collect();
        let permuted_x = substitution::solve_with_factors(graph, tree, factors, &permuted_rhs);

        let mut x = DVector::zeros(n);
        for (k, &v) in self.order.iter().enumerate() {
            x[v] = permuted_x[k];
        }
        Ok(x)
    }

    fn is_factorized(&self) -> bool {
        self.factors.is_some()
    }
}
