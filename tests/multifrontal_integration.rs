//! End-to-end tests for the multifrontal direct solver
//!
//! Covers the full analyze → factorize → solve pipeline:
//! - Known small systems and a dense LDL^T reference
//! - Determinism across worker-pool sizes
//! - State-machine and singular-pivot error paths
//! - Agreement with the faer Cholesky backend

// Allow expect() in test code
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use frontal_solver::core::{DenseBlock, SparseAccess, SparseMatrix};
use frontal_solver::linalg::{ldlt_in_place, solve_ldlt, FaerCholeskySolver};
use frontal_solver::solvers::{MultifrontalConfig, MultifrontalSolver, SparseDirectSolver};
use nalgebra::DVector;

/// Dense LDL^T reference solve over the full matrix.
fn reference_solve(matrix: &SparseMatrix, rhs: &DVector<f64>) -> DVector<f64> {
    let n = matrix.rows();
    let mut block = DenseBlock::zeros(n);
    for &(row, col, value) in matrix.entries() {
        block.set(row, col, value);
        block.set(col, row, value);
    }
    ldlt_in_place(&mut block, n, 1e-12).expect("reference factorization");
    solve_ldlt(&block, rhs).expect("reference solve")
}

fn relative_residual(matrix: &SparseMatrix, x: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let ax = matrix.mat_vec(x.as_slice());
    let mut residual = 0.0;
    let mut norm_b = 0.0;
    for i in 0..b.len() {
        residual += (ax[i] - b[i]) * (ax[i] - b[i]);
        norm_b += b[i] * b[i];
    }
    (residual / norm_b.max(1e-300)).sqrt()
}

fn solve_multifrontal(matrix: &SparseMatrix, b: &DVector<f64>, workers: usize) -> DVector<f64> {
    let config = MultifrontalConfig::new().with_workers(workers);
    let mut solver = MultifrontalSolver::with_config(config);
    solver.analyze_pattern(matrix).expect("analyze");
    solver.factorize(matrix).expect("factorize");
    solver.solve(b).expect("solve")
}

/// 5-point Laplacian on a `side` x `side` grid, shifted to be strongly SPD.
fn grid_matrix(side: usize) -> SparseMatrix {
    let n = side * side;
    let mut triplets = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let v = row * side + col;
            triplets.push((v, v, 4.0 + ((v % 3) as f64) * 0.5));
            if col + 1 < side {
                triplets.push((v, v + 1, -1.0));
                triplets.push((v + 1, v, -1.0));
            }
            if row + 1 < side {
                triplets.push((v, v + side, -1.0));
                triplets.push((v + side, v, -1.0));
            }
        }
    }
    SparseMatrix::from_triplets(n, n, &triplets).expect("grid matrix")
}

fn tridiagonal_4545() -> SparseMatrix {
    let diag = [4.0, 5.0, 4.0, 5.0, 4.0];
    let mut triplets = Vec::new();
    for (i, &d) in diag.iter().enumerate() {
        triplets.push((i, i, d));
    }
    for i in 0..4 {
        triplets.push((i, i + 1, -1.0));
        triplets.push((i + 1, i, -1.0));
    }
    SparseMatrix::from_triplets(5, 5, &triplets).expect("tridiagonal matrix")
}

// ============================================================================
// Known solutions
// ============================================================================

#[test]
fn test_two_by_two_known_solution() {
    let matrix = SparseMatrix::from_triplets(
        2,
        2,
        &[(0, 0, 2.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)],
    )
    .unwrap();
    let b = DVector::from_vec(vec![3.0, 3.0]);

    let x = solve_multifrontal(&matrix, &b, 0);
    assert!((x[0] - 1.0).abs() < 1e-9);
    assert!((x[1] - 1.0).abs() < 1e-9);
}

#[test]
fn test_one_by_one_system() {
    let matrix = SparseMatrix::from_triplets(1, 1, &[(0, 0, 5.0)]).unwrap();
    let b = DVector::from_vec(vec![10.0]);

    let x = solve_multifrontal(&matrix, &b, 1);
    assert!((x[0] - 2.0).abs() < 1e-12);
}

#[test]
fn test_tridiagonal_against_reference() {
    let matrix = tridiagonal_4545();
    let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let x = solve_multifrontal(&matrix, &b, 0);
    assert!(relative_residual(&matrix, &x, &b) < 1e-9);

    let reference = reference_solve(&matrix, &b);
    for i in 0..5 {
        assert!((x[i] - reference[i]).abs() < 1e-10);
    }
}

#[test]
fn test_grid_against_reference() {
    let matrix = grid_matrix(7);
    let n = matrix.rows();
    let b = DVector::from_fn(n, |i, _| ((i % 11) as f64) - 3.0);

    let x = solve_multifrontal(&matrix, &b, 0);
    assert!(relative_residual(&matrix, &x, &b) < 1e-9);

    let reference = reference_solve(&matrix, &b);
    for i in 0..n {
        assert!(
            (x[i] - reference[i]).abs() < 1e-9,
            "component {i}: {} vs {}",
            x[i],
            reference[i]
        );
    }
}

// ============================================================================
// Determinism and idempotence
// ============================================================================

#[test]
fn test_determinism_across_worker_counts() {
    let matrix = grid_matrix(6);
    let n = matrix.rows();
    let b = DVector::from_fn(n, |i, _| (i as f64).sin());

    let x1 = solve_multifrontal(&matrix, &b, 1);
    let x2 = solve_multifrontal(&matrix, &b, 2);
    let x8 = solve_multifrontal(&matrix, &b, 8);

    for i in 0..n {
        assert!((x1[i] - x2[i]).abs() < 1e-12);
        assert!((x1[i] - x8[i]).abs() < 1e-12);
    }
}

#[test]
fn test_repeated_solve_is_idempotent() {
    let matrix = tridiagonal_4545();
    let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let mut solver = MultifrontalSolver::new();
    solver.analyze_pattern(&matrix).unwrap();
    solver.factorize(&matrix).unwrap();

    let first = solver.solve(&b).unwrap();
    let second = solver.solve(&b).unwrap();
    assert_eq!(first.as_slice(), second.as_slice());

    // A different right-hand side between identical ones must not disturb
    // the factors.
    let other = DVector::from_vec(vec![-1.0, 0.5, 0.0, 2.0, 1.0]);
    let _ = solver.solve(&other).unwrap();
    let third = solver.solve(&b).unwrap();
    assert_eq!(first.as_slice(), third.as_slice());
}

// ============================================================================
// Symbolic structure
// ============================================================================

#[test]
fn test_roots_match_connected_components() {
    // Two decoupled blocks.
    let matrix = SparseMatrix::from_triplets(
        4,
        4,
        &[
            (0, 0, 2.0),
            (1, 1, 2.0),
            (0, 1, -1.0),
            (1, 0, -1.0),
            (2, 2, 2.0),
            (3, 3, 2.0),
            (2, 3, -1.0),
            (3, 2, -1.0),
        ],
    )
    .unwrap();

    let mut solver = MultifrontalSolver::new();
    solver.analyze_pattern(&matrix).unwrap();
    let tree = solver.elimination_tree().expect("tree");
    assert_eq!(tree.roots().len(), 2);
}

#[test]
fn test_one_front_per_variable() {
    let matrix = grid_matrix(4);
    let mut solver = MultifrontalSolver::new();
    solver.analyze_pattern(&matrix).unwrap();
    let graph = solver.front_graph().expect("front graph");
    assert_eq!(graph.len(), matrix.rows());
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_non_square_input_rejected() {
    let matrix = SparseMatrix::from_triplets(2, 3, &[(0, 0, 1.0)]).unwrap();
    let mut solver = MultifrontalSolver::new();
    let err = solver.analyze_pattern(&matrix).unwrap_err();
    assert!(err.to_string().contains("square"));
}

#[test]
fn test_solve_before_factorize_rejected() {
    let matrix = tridiagonal_4545();
    let mut solver = MultifrontalSolver::new();
    solver.analyze_pattern(&matrix).unwrap();

    let err = solver.solve(&DVector::zeros(5)).unwrap_err();
    assert!(err.to_string().contains("factorization must be completed"));
}

#[test]
fn test_structural_zero_pivot_raises() {
    // Variable 0 has a structurally zero diagonal and nothing couples into
    // it before elimination: the pivot must fail, not divide through.
    let matrix = SparseMatrix::from_triplets(
        3,
        3,
        &[
            (0, 1, 1.0),
            (1, 0, 1.0),
            (1, 1, 3.0),
            (1, 2, -1.0),
            (2, 1, -1.0),
            (2, 2, 3.0),
        ],
    )
    .unwrap();

    let mut solver = MultifrontalSolver::new();
    solver.analyze_pattern(&matrix).unwrap();
    let err = solver.factorize(&matrix).unwrap_err();
    assert!(
        err.to_string().contains("singular pivot at variable 0"),
        "unexpected error: {err}"
    );
    assert!(!solver.is_factorized());
}

#[test]
fn test_duplicate_entries_rejected_at_construction() {
    let result = SparseMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (0, 0, 2.0)]);
    assert!(result.is_err());
}

// ============================================================================
// Backend agreement
// ============================================================================

#[test]
fn test_multifrontal_agrees_with_faer_backend() {
    let matrix = grid_matrix(5);
    let n = matrix.rows();
    let b = DVector::from_fn(n, |i, _| 1.0 + (i as f64) * 0.25);

    let x_multifrontal = solve_multifrontal(&matrix, &b, 0);

    let mut backend = FaerCholeskySolver::new();
    backend.analyze_pattern(&matrix).unwrap();
    backend.factorize(&matrix).unwrap();
    let x_faer = backend.solve(&b).unwrap();

    for i in 0..n {
        assert!(
            (x_multifrontal[i] - x_faer[i]).abs() < 1e-9,
            "component {i}: {} vs {}",
            x_multifrontal[i],
            x_faer[i]
        );
    }
}
