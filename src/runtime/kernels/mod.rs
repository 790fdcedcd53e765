//! Kernel sets
//!
//! A kernel set implements the BLAS-shaped [`Kernels`] trait for one or more
//! element types:
//!
//! - [`Portable`]: generic loops, every element type, always available
//! - `Simd`: AVX2+FMA / NEON intrinsics for `f32` and `f64` (`simd` feature)
//! - `Cblas`: libopenblas routines for `f32` and `f64` (`openblas` feature)
//!
//! All sets produce the same results within floating-point rounding;
//! `iamax` agrees exactly.
//!
//! # Slice conventions
//!
//! Vector arguments are slices starting at the first element, with `inc`
//! the distance between consecutive elements; a slice must hold at least
//! `(n - 1) * inc + 1` elements. Matrices are row-major with leading
//! dimension `ld` (elements between the starts of consecutive rows).

#[cfg(feature = "openblas")]
pub mod cblas;
pub mod portable;
#[cfg(feature = "simd")]
pub mod simd;

pub use portable::Portable;

use crate::dtype::Element;

/// BLAS-style routines keyed by element type
#[allow(clippy::too_many_arguments)]
pub trait Kernels<T: Element>: Send + Sync {
    /// Name of the kernel set
    fn name(&self) -> &'static str;

    /// `y[i] += alpha * x[i]` for `i < n`
    fn axpy(&self, n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize);

    /// `Σ x[i] * y[i]` for `i < n`
    fn dot(&self, n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> T;

    /// `x[i] *= alpha` for `i < n`
    fn scal(&self, n: usize, alpha: T, x: &mut [T], incx: usize);

    /// Euclidean norm of `x[..n]`
    fn nrm2(&self, n: usize, x: &[T], incx: usize) -> T;

    /// Index of the element with greatest magnitude
    ///
    /// Ties resolve to the lowest index; NaN elements never win; an empty or
    /// all-NaN input yields 0.
    fn iamax(&self, n: usize, x: &[T], incx: usize) -> usize;

    /// `y = alpha * A x + beta * y` with `A` an `m × n` row-major matrix
    ///
    /// `beta == 0` overwrites `y` without reading it.
    fn gemv(
        &self,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        x: &[T],
        incx: usize,
        beta: T,
        y: &mut [T],
        incy: usize,
    );

    /// `C = alpha * A B + beta * C` with `A: m × k`, `B: k × n`, `C: m × n`
    ///
    /// `beta == 0` overwrites `C` without reading it.
    fn gemm(
        &self,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &[T],
        ldb: usize,
        beta: T,
        c: &mut [T],
        ldc: usize,
    );
}

/// Number of slice elements a strided vector of `n` elements spans
#[inline]
pub(crate) fn span(n: usize, inc: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n - 1) * inc + 1
    }
}
