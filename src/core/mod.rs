//! Core matrix types for the frontal-solver library
//!
//! This module contains the fundamental building blocks shared by the
//! symbolic and numeric phases:
//! - Read-only sparse matrix view built from (row, column, value) triplets
//! - Dense working blocks for frontal matrices

pub mod dense;
pub mod sparse;

pub use dense::DenseBlock;
pub use sparse::{SparseAccess, SparseError, SparseMatrix};
