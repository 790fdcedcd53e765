//! Linear algebra on [`Matrix`]
//!
//! Everything here is built on [`lu`]: factor once, then solve, invert or
//! take the determinant. The inner loops (pivot search, row elimination,
//! triangular solves) go through the matrix's dispatch policy like any
//! other container operation.

mod lu;

pub use lu::{lu, LuDecomposition};

use crate::array::{Matrix, Vector};
use crate::error::{Error, Result};

/// Solve `a·x = b`
pub fn solve(a: &Matrix, b: &Vector) -> Result<Vector> {
    lu(a)?.solve(b)
}

/// Determinant of a square matrix
///
/// A singular matrix has determinant 0 rather than an error; a non-square
/// one is a `ShapeMismatch`.
pub fn det(a: &Matrix) -> Result<f64> {
    match lu(a) {
        Ok(factors) => Ok(factors.determinant()),
        Err(Error::Singular { .. }) => Ok(0.0),
        Err(e) => Err(e),
    }
}

/// Inverse of a square, non-singular matrix
pub fn inverse(a: &Matrix) -> Result<Matrix> {
    lu(a)?.inverse()
}
