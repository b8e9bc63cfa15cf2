//! Front assembly
//!
//! Fills a front's dense block from the original entries it owns plus the
//! Schur-complement contributions of its already-factored children. The
//! assembler touches nothing outside the block it returns; child factors
//! are read through the scheduler's write-once slots, which the caller
//! guarantees are populated before assembly starts.

use crate::core::DenseBlock;
use crate::solvers::front_graph::Front;
use crate::solvers::scheduler::FrontFactors;
use crate::solvers::SolverError;
use std::sync::OnceLock;

/// Assemble the dense block for `front`.
///
/// `owned` holds the original matrix entries owned by this front in
/// position space; each child's contribution is accumulated at the
/// precomputed child-to-parent index mapping.
pub(crate) fn assemble_front(
    front: &Front,
    owned: &[(usize, usize, f64)],
    slots: &[OnceLock<FrontFactors>],
) -> Result<DenseBlock, SolverError> {
    let mut block = DenseBlock::zeros(front.dim());

    // Original entries, mirrored so the lower triangle is complete even
    // when the input carries only one triangle.
    for &(row, col, value) in owned {
        let li = front.local_index(row).ok_or_else(|| {
            SolverError::Scheduler(format!(
                "entry ({row}, {col}) assigned to front {} which does not contain it",
                front.id
            ))
        })?;
        let lj = front.local_index(col).ok_or_else(|| {
            SolverError::Scheduler(format!(
                "entry ({row}, {col}) assigned to front {} which does not contain it",
                front.id
            ))
        })?;
        block.set(li, lj, value);
        block.set(lj, li, value);
    }

    // Schur-complement contributions handed up by the children.
    for (slot, &child_id) in front.children.iter().enumerate() {
        let child_factors = slots[child_id].get().ok_or_else(|| {
            SolverError::Scheduler(format!(
                "front {} assembled before child front {child_id} was processed",
                front.id
            ))
        })?;
        block.add_sub_block(&child_factors.schur, front.child_map(slot));
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseMatrix;
    use crate::solvers::elimination_tree::EliminationTree;
    use crate::solvers::front_graph::FrontGraph;
    use nalgebra::{DMatrix, DVector};

    fn graph_for(matrix: &SparseMatrix) -> FrontGraph {
        let adjacency = matrix.row_adjacency();
        let tree = EliminationTree::from_adjacency(&adjacency);
        FrontGraph::build(&tree, &adjacency)
    }

    #[test]
    fn test_owned_entries_scattered_and_mirrored() {
        // Lower triangle only; the block must come out symmetric.
        let matrix =
            SparseMatrix::from_triplets(2, 2, &[(0, 0, 2.0), (1, 0, 1.0), (1, 1, 2.0)]).unwrap();
        let graph = graph_for(&matrix);
        let slots: Vec<OnceLock<FrontFactors>> = (0..graph.len()).map(|_| OnceLock::new()).collect();

        let block =
            assemble_front(graph.front(0), &[(0, 0, 2.0), (1, 0, 1.0)], &slots).unwrap();
        assert_eq!(block.get(0, 0), 2.0);
        assert_eq!(block.get(0, 1), 1.0);
        assert_eq!(block.get(1, 0), 1.0);
        assert_eq!(block.get(1, 1), 0.0);
    }

    #[test]
    fn test_child_contribution_accumulated() {
        let matrix = SparseMatrix::from_triplets(
            2,
            2,
            &[(0, 0, 2.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)],
        )
        .unwrap();
        let graph = graph_for(&matrix);
        let slots: Vec<OnceLock<FrontFactors>> = (0..graph.len()).map(|_| OnceLock::new()).collect();

        // Front 0 eliminated variable 0 and forwards a 1x1 Schur block.
        let mut schur = DenseBlock::zeros(1);
        schur.set(0, 0, -0.5);
        slots[0]
            .set(FrontFactors {
                l: DMatrix::from_row_slice(2, 1, &[1.0, 0.5]),
                d: DVector::from_vec(vec![2.0]),
                schur,
            })
            .unwrap();

        let block = assemble_front(graph.front(1), &[(1, 1, 2.0)], &slots).unwrap();
        assert_eq!(block.get(0, 0), 1.5);
    }

    #[test]
    fn test_unprocessed_child_is_an_error() {
        let matrix = SparseMatrix::from_triplets(
            2,
            2,
            &[(0, 0, 2.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)],
        )
        .unwrap();
        let graph = graph_for(&matrix);
        let slots: Vec<OnceLock<FrontFactors>> = (0..graph.len()).map(|_| OnceLock::new()).collect();

        let err = assemble_front(graph.front(1), &[(1, 1, 2.0)], &slots).unwrap_err();
        assert!(matches!(err, SolverError::Scheduler(_)));
    }
}
