//! Front graph construction
//!
//! One front per elimination-tree node, held in an arena and addressed by
//! integer id (front id == node index). A front's variable set is its own
//! node, the node's structural neighbors with larger index, and everything
//! each child front forwards after eliminating its own node. Local
//! numbering sorts the set ascending, which puts the eliminated node at
//! local position 0 and makes the mapping deterministic.

use crate::solvers::elimination_tree::EliminationTree;

/// Arena index of a front
pub type FrontId = usize;

/// Symbolic description of one frontal matrix
#[derive(Debug, Clone)]
pub struct Front {
    pub id: FrontId,
    /// Variable this front eliminates (position space)
    pub node: usize,
    /// Variable set, sorted ascending; `vars[0] == node`
    pub vars: Vec<usize>,
    /// Number of leading local positions eliminated here
    num_eliminated: usize,
    /// Fronts that must finish before this one may assemble
    pub children: Vec<FrontId>,
    /// Front that consumes this front's Schur contribution
    pub parent: Option<FrontId>,
    /// For each child, its remaining variables mapped to local positions
    /// of this front (same order as `children`)
    child_maps: Vec<Vec<usize>>,
}

impl Front {
    /// Dense block dimension.
    pub fn dim(&self) -> usize {
        self.vars.len()
    }

    /// Leading local positions eliminated in this front.
    pub fn num_eliminated(&self) -> usize {
        self.num_eliminated
    }

    /// Variables forwarded to the parent, in local order.
    pub fn remaining(&self) -> &[usize] {
        &self.vars[self.num_eliminated..]
    }

    /// Local position of `var` inside this front.
    pub fn local_index(&self, var: usize) -> Option<usize> {
        self.vars.binary_search(&var).ok()
    }

    /// Local positions (in this front) of the given child's remaining
    /// variables.
    pub fn child_map(&self, child_slot: usize) -> &[usize] {
        &self.child_maps[child_slot]
    }
}

/// Arena of fronts plus their dependency edges
#[derive(Debug, Clone)]
pub struct FrontGraph {
    fronts: Vec<Front>,
}

impl FrontGraph {
    /// Build one front per tree node from the elimination forest and the
    /// (position-space) adjacency it was derived from.
    pub fn build(tree: &EliminationTree, adjacency: &[Vec<usize>]) -> Self {
        let n = tree.len();
        let mut fronts: Vec<Front> = Vec::with_capacity(n);

        for v in 0..n {
            let mut set: Vec<usize> = vec![v];
            for &w in &adjacency[v] {
                if w > v {
                    set.push(w);
                }
            }
            for &c in tree.children(v) {
                set.extend_from_slice(fronts[c].remaining());
            }
            set.sort_unstable();
            set.dedup();
            debug_assert_eq!(set[0], v);

            let children = tree.children(v).to_vec();
            let front = Front {
                id: v,
                node: v,
                vars: set,
                num_eliminated: 1,
                children,
                parent: tree.parent(v),
                child_maps: Vec::new(),
            };
            // The parent is the first variable forwarded upward.
            debug_assert_eq!(front.remaining().first().copied(), tree.parent(v));
            fronts.push(front);
        }

        // Child remaining sets are subsets of the parent set by
        // construction, so every lookup resolves.
        for v in 0..n {
            let maps: Vec<Vec<usize>> = fronts[v]
                .children
                .iter()
                .map(|&c| {
                    fronts[c]
                        .remaining()
                        .iter()
                        .map(|&w| {
                            fronts[v]
                                .local_index(w)
                                .expect("child remaining variable missing from parent front")
                        })
                        .collect()
                })
                .collect();
            fronts[v].child_maps = maps;
        }

        Self { fronts }
    }

    /// Number of fronts.
    pub fn len(&self) -> usize {
        self.fronts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fronts.is_empty()
    }

    /// Front by id.
    pub fn front(&self, id: FrontId) -> &Front {
        &self.fronts[id]
    }

    /// All fronts, id order.
    pub fn fronts(&self) -> &[Front] {
        &self.fronts
    }

    /// Id of the front owning entry `(row, col)` (position space): the
    /// front of the smaller endpoint, which always contains both.
    pub fn owner_of(&self, row: usize, col: usize) -> FrontId {
        row.min(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseMatrix;

    fn build_graph(matrix: &SparseMatrix) -> (EliminationTree, FrontGraph) {
        let adjacency = matrix.row_adjacency();
        let tree = EliminationTree::from_adjacency(&adjacency);
        let graph = FrontGraph::build(&tree, &adjacency);
        (tree, graph)
    }

    fn tridiagonal(n: usize) -> SparseMatrix {
        let mut triplets = Vec::new();
        for i in 0..n {
            triplets.push((i, i, 4.0));
            if i + 1 < n {
                triplets.push((i, i + 1, -1.0));
                triplets.push((i + 1, i, -1.0));
            }
        }
        SparseMatrix::from_triplets(n, n, &triplets).unwrap()
    }

    #[test]
    fn test_tridiagonal_front_sets() {
        let matrix = tridiagonal(4);
        let (_, graph) = build_graph(&matrix);

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.front(0).vars, vec![0, 1]);
        assert_eq!(graph.front(1).vars, vec![1, 2]);
        assert_eq!(graph.front(2).vars, vec![2, 3]);
        assert_eq!(graph.front(3).vars, vec![3]);

        assert_eq!(graph.front(0).remaining(), &[1]);
        assert!(graph.front(3).remaining().is_empty());
        assert_eq!(graph.front(1).children, vec![0]);
        assert_eq!(graph.front(2).parent, Some(3));
    }

    #[test]
    fn test_inherited_variables_propagate() {
        // Star around 0: front 0 is {0,1,2,3}; its remaining set {1,2,3}
        // must flow into front 1, then {2,3} into front 2, and so on.
        let mut triplets = vec![(0, 0, 4.0)];
        for i in 1..4 {
            triplets.push((i, i, 4.0));
            triplets.push((0, i, -1.0));
            triplets.push((i, 0, -1.0));
        }
        let matrix = SparseMatrix::from_triplets(4, 4, &triplets).unwrap();
        let (_, graph) = build_graph(&matrix);

        assert_eq!(graph.front(0).vars, vec![0, 1, 2, 3]);
        assert_eq!(graph.front(1).vars, vec![1, 2, 3]);
        assert_eq!(graph.front(2).vars, vec![2, 3]);
        assert_eq!(graph.front(3).vars, vec![3]);
    }

    #[test]
    fn test_child_maps_match_parent_positions() {
        let matrix = tridiagonal(3);
        let (_, graph) = build_graph(&matrix);

        // Front 1 = {1, 2}; child front 0 forwards {1} to local position 0.
        let front = graph.front(1);
        assert_eq!(front.children, vec![0]);
        assert_eq!(front.child_map(0), &[0]);
    }

    #[test]
    fn test_every_entry_owned_exactly_once() {
        let matrix = tridiagonal(5);
        let (_, graph) = build_graph(&matrix);

        let mut owned_counts = vec![0usize; graph.len()];
        for &(row, col, _) in matrix.entries() {
            let owner = graph.owner_of(row, col);
            owned_counts[owner] += 1;
            // The owner must contain both endpoints.
            let front = graph.front(owner);
            assert!(front.local_index(row).is_some());
            assert!(front.local_index(col).is_some());
        }
        let total: usize = owned_counts.iter().sum();
        assert_eq!(total, matrix.nnz());
    }
}
