//! Tree-ordered forward and backward substitution
//!
//! The forward pass walks fronts children-before-parents, the backward pass
//! parents-before-children. Fronts of equal tree level are independent, so
//! each level runs as a parallel loop with a barrier between levels; every
//! front computes into its own buffer and *pulls* from its children (no
//! two fronts ever write the same memory), which keeps the result bitwise
//! identical for any thread count.
//!
//! Forward, per front: load the right-hand-side value of the eliminated
//! variable, accumulate the children's forwarded remaining slots, then
//! apply the eliminated columns of L. Backward, per front: gather the
//! already-solved ancestor values, scale by D⁻¹ and back-substitute with
//! L^T, publishing the eliminated variable's solution.

use crate::solvers::elimination_tree::EliminationTree;
use crate::solvers::front_graph::{Front, FrontGraph};
use crate::solvers::scheduler::FrontFactors;
use rayon::prelude::*;

/// Solve `A x = b` (position space) given every front's factors.
pub(crate) fn solve_with_factors(
    graph: &FrontGraph,
    tree: &EliminationTree,
    factors: &[FrontFactors],
    rhs: &[f64],
) -> Vec<f64> {
    let buffers = forward_pass(graph, tree, factors, rhs);
    backward_pass(graph, tree, factors, &buffers)
}

fn forward_pass(
    graph: &FrontGraph,
    tree: &EliminationTree,
    factors: &[FrontFactors],
    rhs: &[f64],
) -> Vec<Vec<f64>> {
    let mut buffers: Vec<Vec<f64>> = vec![Vec::new(); graph.len()];

    for level in tree.levels_by_height() {
        let updates: Vec<(usize, Vec<f64>)> = if level.len() > 1 {
            level
                .par_iter()
                .map(|&id| (id, forward_front(graph.front(id), graph, factors, &buffers, rhs)))
                .collect()
        } else {
            level
                .iter()
                .map(|&id| (id, forward_front(graph.front(id), graph, factors, &buffers, rhs)))
                .collect()
        };
        for (id, buffer) in updates {
            buffers[id] = buffer;
        }
    }

    buffers
}

fn forward_front(
    front: &Front,
    graph: &FrontGraph,
    factors: &[FrontFactors],
    buffers: &[Vec<f64>],
    rhs: &[f64],
) -> Vec<f64> {
    let dim = front.dim();
    let ne = front.num_eliminated();
    let mut y = vec![0.0; dim];

    for e in 0..ne {
        y[e] = rhs[front.vars[e]];
    }

    // Children contribute their forwarded remaining slots.
    for (slot, &child_id) in front.children.iter().enumerate() {
        let child_ne = graph.front(child_id).num_eliminated();
        let child_buffer = &buffers[child_id];
        for (offset, &local) in front.child_map(slot).iter().enumerate() {
            y[local] += child_buffer[child_ne + offset];
        }
    }

    // Apply the eliminated columns of the unit-lower L.
    let l = &factors[front.id].l;
    for e in 0..ne {
        let y_e = y[e];
        for j in (e + 1)..dim {
            y[j] -= l[(j, e)] * y_e;
        }
    }

    y
}

fn backward_pass(
    graph: &FrontGraph,
    tree: &EliminationTree,
    factors: &[FrontFactors],
    buffers: &[Vec<f64>],
) -> Vec<f64> {
    let mut x = vec![0.0; graph.len()];

    for level in tree.levels_by_depth() {
        let updates: Vec<Vec<(usize, f64)>> = if level.len() > 1 {
            level
                .par_iter()
                .map(|&id| backward_front(graph.front(id), &factors[id], &buffers[id], &x))
                .collect()
        } else {
            level
                .iter()
                .map(|&id| backward_front(graph.front(id), &factors[id], &buffers[id], &x))
                .collect()
        };
        for update in updates {
            for (var, value) in update {
                x[var] = value;
            }
        }
    }

    x
}

fn backward_front(
    front: &Front,
    factors: &FrontFactors,
    buffer: &[f64],
    solution: &[f64],
) -> Vec<(usize, f64)> {
    let dim = front.dim();
    let ne = front.num_eliminated();

    // Remaining variables are strict ancestors, solved in earlier levels.
    let mut local = vec![0.0; dim];
    for r in ne..dim {
        local[r] = solution[front.vars[r]];
    }

    for e in (0..ne).rev() {
        let mut value = buffer[e] / factors.d[e];
        for j in (e + 1)..dim {
            value -= factors.l[(j, e)] * local[j];
        }
        local[e] = value;
    }

    (0..ne).map(|e| (front.vars[e], local[e])).collect()
}
