//! # densela
//!
//! **Dense vectors, matrices and N-d arrays over BLAS-shaped kernels.**
//!
//! Every container is a view onto a reference-counted, typed buffer (`f32`
//! or `f64`). Numeric methods route through a [`Dispatch`](runtime::Dispatch)
//! policy that picks, per call, between a portable strided implementation
//! and an accelerated one (runtime-detected SIMD, or CBLAS from OpenBLAS).
//! Both paths agree within floating-point rounding; the accelerator changes
//! speed, never behavior.
//!
//! ## Quick Start
//!
//! ```
//! use densela::prelude::*;
//!
//! # fn main() -> densela::error::Result<()> {
//! let mut a = Vector::from_values(&[1.0, 2.0, 3.0], DType::F64);
//! let b = Vector::from_values(&[4.0, 5.0, 6.0], DType::F32);
//!
//! a.add(&b)?.scale(0.5);
//! assert_eq!(a.to_vec(), vec![2.5, 3.5, 4.5]);
//! assert_eq!(a.dtype(), DType::F64);
//!
//! let m = Matrix::from_rows(&[&[2.0, 1.0], &[1.0, 3.0]], DType::F64)?;
//! let x = densela::linalg::solve(&m, &Vector::from_values(&[5.0, 10.0], DType::F64))?;
//! assert!((x.get(1)? - 3.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `simd` (default): AVX2+FMA / NEON kernels, detected at runtime
//! - `openblas`: CBLAS kernels linked from `libopenblas`
//!
//! The `DENSELA_ACCEL` environment variable (`auto`, `simd`, `cblas`, `off`)
//! narrows the choice at probe time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod dtype;
pub mod error;
pub mod linalg;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::array::{Matrix, NDArray, RangeSpec, Vector};
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{Accelerator, Capabilities, Dispatch, KernelOp, KernelPath};
}
