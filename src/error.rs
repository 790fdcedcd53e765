//! Error types for densela

use thiserror::Error;

/// Result type alias using densela's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in densela operations
///
/// Every error is raised before the receiver is touched: a method that fails
/// leaves its container exactly as it found it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed construction input
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Negative element count requested
    #[error("Invalid size {size}: element count must be non-negative")]
    InvalidSize {
        /// The requested size
        size: isize,
    },

    /// Range parameters that cannot produce a sequence
    #[error("Invalid range: {reason}")]
    InvalidRange {
        /// Why the range was rejected
        reason: String,
    },

    /// Operand shapes disagree
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Index outside `[0, size)`
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: isize,
        /// Size of the dimension
        size: usize,
    },

    /// LU factorization hit a zero pivot
    #[error("Matrix is singular (zero pivot in column {column})")]
    Singular {
        /// Column where elimination broke down
        column: usize,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid range error
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Create an out-of-bounds error
    pub fn out_of_bounds(index: isize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::shape_mismatch(&[3], &[2]);
        assert_eq!(err.to_string(), "Shape mismatch: expected [3], got [2]");

        let err = Error::out_of_bounds(-1, 4);
        assert_eq!(
            err.to_string(),
            "Index -1 out of bounds for dimension of size 4"
        );

        let err = Error::InvalidSize { size: -2 };
        assert!(err.to_string().contains("-2"));
    }
}
