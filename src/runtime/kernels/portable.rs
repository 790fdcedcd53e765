//! Portable kernel set
//!
//! Straightforward strided loops over any [`Element`]. This is the reference
//! the accelerated sets are checked against, and the code they fall back to
//! for strided or short inputs.

use super::Kernels;
use crate::dtype::Element;

/// Portable loop implementations
#[derive(Copy, Clone, Debug, Default)]
pub struct Portable;

/// `y[i] += alpha * x[i]`
#[inline]
pub fn axpy<T: Element>(n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) {
    for i in 0..n {
        let yi = &mut y[i * incy];
        *yi = *yi + alpha * x[i * incx];
    }
}

/// `Σ x[i] * y[i]`
#[inline]
pub fn dot<T: Element>(n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> T {
    let mut sum = T::zero();
    for i in 0..n {
        sum = sum + x[i * incx] * y[i * incy];
    }
    sum
}

/// `x[i] *= alpha`
#[inline]
pub fn scal<T: Element>(n: usize, alpha: T, x: &mut [T], incx: usize) {
    for i in 0..n {
        let xi = &mut x[i * incx];
        *xi = *xi * alpha;
    }
}

/// `sqrt(Σ x[i]²)`, plain accumulation
#[inline]
pub fn nrm2<T: Element>(n: usize, x: &[T], incx: usize) -> T {
    let mut sum_sq = T::zero();
    for i in 0..n {
        let v = x[i * incx];
        sum_sq = sum_sq + v * v;
    }
    sum_sq.sqrt()
}

/// Index of the first element with greatest magnitude (NaN never wins)
#[inline]
pub fn iamax<T: Element>(n: usize, x: &[T], incx: usize) -> usize {
    let mut best_idx = 0;
    let mut best = T::neg_infinity();
    for i in 0..n {
        let v = x[i * incx].abs();
        if v > best {
            best = v;
            best_idx = i;
        }
    }
    best_idx
}

/// `y = alpha * A x + beta * y`
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn gemv<T: Element>(
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
) {
    for i in 0..m {
        let row = &a[i * lda..];
        let acc = alpha * dot(n, row, 1, x, incx);
        let yi = &mut y[i * incy];
        *yi = if beta == T::zero() {
            acc
        } else {
            acc + beta * *yi
        };
    }
}

/// `C = alpha * A B + beta * C`
///
/// Row-by-row `ikj` order: each output row accumulates scaled rows of `B`,
/// which keeps every inner loop contiguous.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Element>(
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
) {
    for i in 0..m {
        let c_row = &mut c[i * ldc..i * ldc + n];
        scale_or_clear(c_row, beta);
        for p in 0..k {
            let a_ip = alpha * a[i * lda + p];
            let b_row = &b[p * ldb..p * ldb + n];
            axpy(n, a_ip, b_row, 1, c_row, 1);
        }
    }
}

/// `row *= beta`, or zero-fill when `beta == 0` so stale NaNs do not survive
#[inline]
pub(crate) fn scale_or_clear<T: Element>(row: &mut [T], beta: T) {
    if beta == T::zero() {
        row.fill(T::zero());
    } else if beta != T::one() {
        for v in row.iter_mut() {
            *v = *v * beta;
        }
    }
}

impl<T: Element> Kernels<T> for Portable {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn axpy(&self, n: usize, alpha: T, x: &[T], incx: usize, y: &mut [T], incy: usize) {
        axpy(n, alpha, x, incx, y, incy)
    }

    fn dot(&self, n: usize, x: &[T], incx: usize, y: &[T], incy: usize) -> T {
        dot(n, x, incx, y, incy)
    }

    fn scal(&self, n: usize, alpha: T, x: &mut [T], incx: usize) {
        scal(n, alpha, x, incx)
    }

    fn nrm2(&self, n: usize, x: &[T], incx: usize) -> T {
        nrm2(n, x, incx)
    }

    fn iamax(&self, n: usize, x: &[T], incx: usize) -> usize {
        iamax(n, x, incx)
    }

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
    ) {
        gemv(m, n, alpha, a, lda, x, incx, beta, y, incy)
    }

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
    ) {
        gemm(m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
    }
}
