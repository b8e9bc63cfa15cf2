//! Elimination tree construction
//!
//! The elimination tree (a forest for disconnected patterns) encodes the
//! order and grouping of the elimination steps: each variable's parent is
//! the first later variable whose factor column couples with it, fill
//! included. Construction chases ancestor links with path compression, so
//! the whole forest costs O((n + nnz) α(n)) given the elimination order.
//!
//! The tree also carries the traversal data the downstream phases need:
//! post-order, per-node height (forward-pass levels) and depth
//! (backward-pass levels).

use crate::core::SparseMatrix;
use crate::solvers::SolverError;

/// Pluggable elimination ordering
///
/// Produces the elimination sequence: `order[k]` is the variable eliminated
/// at step k. Fill-reducing strategies (minimum degree, nested dissection)
/// plug in here; the engine itself runs in position space and permutes at
/// its boundaries.
pub trait OrderingStrategy: Send + Sync {
    fn ordering(&self, matrix: &SparseMatrix) -> Vec<usize>;
}

/// Identity elimination order
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrdering;

impl OrderingStrategy for NaturalOrdering {
    fn ordering(&self, matrix: &SparseMatrix) -> Vec<usize> {
        (0..matrix.rows()).collect()
    }
}

/// Elimination forest over variables 0..n-1 (position space)
#[derive(Debug, Clone)]
pub struct EliminationTree {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    post_order: Vec<usize>,
    heights: Vec<usize>,
    depths: Vec<usize>,
}

impl EliminationTree {
    /// Build the forest from an undirected adjacency structure whose node
    /// indices are already in elimination order.
    pub fn from_adjacency(adjacency: &[Vec<usize>]) -> Self {
        let n = adjacency.len();
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut ancestor: Vec<Option<usize>> = vec![None; n];

        for v in 0..n {
            for &w in &adjacency[v] {
                if w >= v {
                    continue;
                }
                // Chase w's ancestor chain up to v, compressing as we go;
                // the chain ends either at v (already linked) or at a root
                // that becomes a new child of v.
                let mut r = w;
                loop {
                    let next = ancestor[r];
                    ancestor[r] = Some(v);
                    match next {
                        None => {
                            if r != v {
                                parent[r] = Some(v);
                            }
                            break;
                        }
                        Some(a) if a == v => break,
                        Some(a) => r = a,
                    }
                }
            }
        }

        let mut children = vec![Vec::new(); n];
        for v in 0..n {
            if let Some(p) = parent[v] {
                children[p].push(v);
            }
        }

        let post_order = Self::compute_post_order(&parent, &children);
        let heights = Self::compute_heights(&children);
        let depths = Self::compute_depths(&parent);

        Self {
            parent,
            children,
            post_order,
            heights,
            depths,
        }
    }

    /// Build the forest for a matrix pattern under the natural order.
    ///
    /// Fails with `InvalidDimension` for non-square or zero-order input.
    pub fn from_pattern(matrix: &SparseMatrix) -> Result<Self, SolverError> {
        if !matrix.is_square() || matrix.rows() == 0 {
            return Err(SolverError::InvalidDimension(format!(
                "matrix must be square with positive order, got {}x{}",
                matrix.rows(),
                matrix.cols()
            )));
        }
        Ok(Self::from_adjacency(&matrix.row_adjacency()))
    }

    fn compute_post_order(parent: &[Option<usize>], children: &[Vec<usize>]) -> Vec<usize> {
        let n = parent.len();
        let mut order = Vec::with_capacity(n);
        // (node, next child index to descend into)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if parent[root].is_some() {
                continue;
            }
            stack.push((root, 0));
            while !stack.is_empty() {
                let (node, next) = {
                    let top = stack.last_mut().expect("stack is non-empty");
                    let state = *top;
                    top.1 += 1;
                    state
                };
                if next < children[node].len() {
                    stack.push((children[node][next], 0));
                } else {
                    order.push(node);
                    stack.pop();
                }
            }
        }
        order
    }

    fn compute_heights(children: &[Vec<usize>]) -> Vec<usize> {
        let n = children.len();
        let mut heights = vec![0; n];
        // Children always precede their parent in index order.
        for v in 0..n {
            heights[v] = children[v]
                .iter()
                .map(|&c| heights[c] + 1)
                .max()
                .unwrap_or(0);
        }
        heights
    }

    fn compute_depths(parent: &[Option<usize>]) -> Vec<usize> {
        let n = parent.len();
        let mut depths = vec![0; n];
        // Parents always follow their children in index order.
        for v in (0..n).rev() {
            if let Some(p) = parent[v] {
                depths[v] = depths[p] + 1;
            }
        }
        depths
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Parent of `node`, `None` for roots.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    /// Children of `node`, ascending.
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    /// Nodes without a parent, ascending.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&v| self.parent[v].is_none()).collect()
    }

    /// Post-order traversal (children before parents).
    pub fn post_order(&self) -> &[usize] {
        &self.post_order
    }

    /// Height of `node` above its deepest leaf.
    pub fn height(&self, node: usize) -> usize {
        self.heights[node]
    }

    /// Distance of `node` from its root.
    pub fn depth(&self, node: usize) -> usize {
        self.depths[node]
    }

    /// Height of the whole forest.
    pub fn forest_height(&self) -> usize {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    /// Nodes grouped by height, ascending: level 0 holds the leaves. All
    /// children of a node live in strictly lower levels, so walking levels
    /// in order visits children before parents.
    pub fn levels_by_height(&self) -> Vec<Vec<usize>> {
        let mut levels = vec![Vec::new(); self.forest_height() + 1];
        for v in 0..self.len() {
            levels[self.heights[v]].push(v);
        }
        levels
    }

    /// Nodes grouped by depth, ascending: level 0 holds the roots. All
    /// ancestors of a node live in strictly lower levels, so walking levels
    /// in order visits parents before children.
    pub fn levels_by_depth(&self) -> Vec<Vec<usize>> {
        let max_depth = self.depths.iter().copied().max().unwrap_or(0);
        let mut levels = vec![Vec::new(); max_depth + 1];
        for v in 0..self.len() {
            levels[self.depths[v]].push(v);
        }
        levels
    }
}
