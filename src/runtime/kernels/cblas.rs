//! CBLAS kernel set backed by libopenblas
//!
//! Enabled with the `openblas` feature, which links `libopenblas` at build
//! time. Degenerate shapes (a zero dimension, or a length that does not fit
//! the BLAS `int`) stay on the portable loops.

use super::portable;
use super::Kernels;

#[allow(non_camel_case_types)]
type CBLAS_ORDER = i32;
#[allow(non_camel_case_types)]
type CBLAS_TRANSPOSE = i32;

const CBLAS_ROW_MAJOR: CBLAS_ORDER = 101;
const CBLAS_NO_TRANS: CBLAS_TRANSPOSE = 111;

#[link(name = "openblas")]
extern "C" {
    fn cblas_ddot(n: i32, x: *const f64, incx: i32, y: *const f64, incy: i32) -> f64;
    fn cblas_dnrm2(n: i32, x: *const f64, incx: i32) -> f64;
    fn cblas_idamax(n: i32, x: *const f64, incx: i32) -> usize;
    fn cblas_dscal(n: i32, alpha: f64, x: *mut f64, incx: i32);
    fn cblas_daxpy(n: i32, alpha: f64, x: *const f64, incx: i32, y: *mut f64, incy: i32);
    fn cblas_dgemv(
        order: CBLAS_ORDER,
        trans: CBLAS_TRANSPOSE,
        m: i32,
        n: i32,
        alpha: f64,
        a: *const f64,
        lda: i32,
        x: *const f64,
        incx: i32,
        beta: f64,
        y: *mut f64,
        incy: i32,
    );
    fn cblas_dgemm(
        order: CBLAS_ORDER,
        transa: CBLAS_TRANSPOSE,
        transb: CBLAS_TRANSPOSE,
        m: i32,
        n: i32,
        k: i32,
        alpha: f64,
        a: *const f64,
        lda: i32,
        b: *const f64,
        ldb: i32,
        beta: f64,
        c: *mut f64,
        ldc: i32,
    );

    fn cblas_sdot(n: i32, x: *const f32, incx: i32, y: *const f32, incy: i32) -> f32;
    fn cblas_snrm2(n: i32, x: *const f32, incx: i32) -> f32;
    fn cblas_isamax(n: i32, x: *const f32, incx: i32) -> usize;
    fn cblas_sscal(n: i32, alpha: f32, x: *mut f32, incx: i32);
    fn cblas_saxpy(n: i32, alpha: f32, x: *const f32, incx: i32, y: *mut f32, incy: i32);
    fn cblas_sgemv(
        order: CBLAS_ORDER,
        trans: CBLAS_TRANSPOSE,
        m: i32,
        n: i32,
        alpha: f32,
        a: *const f32,
        lda: i32,
        x: *const f32,
        incx: i32,
        beta: f32,
        y: *mut f32,
        incy: i32,
    );
    fn cblas_sgemm(
        order: CBLAS_ORDER,
        transa: CBLAS_TRANSPOSE,
        transb: CBLAS_TRANSPOSE,
        m: i32,
        n: i32,
        k: i32,
        alpha: f32,
        a: *const f32,
        lda: i32,
        b: *const f32,
        ldb: i32,
        beta: f32,
        c: *mut f32,
        ldc: i32,
    );
}

/// libopenblas kernel set for `f32` and `f64`
#[derive(Copy, Clone, Debug, Default)]
pub struct Cblas;

/// Convert every argument to a BLAS `int`, or `None` if any overflows
fn blas_ints<const N: usize>(values: [usize; N]) -> Option<[i32; N]> {
    let mut out = [0i32; N];
    for (dst, src) in out.iter_mut().zip(values) {
        *dst = i32::try_from(src).ok()?;
    }
    Some(out)
}

macro_rules! impl_cblas_kernels {
    ($t:ident, $p:ident) => {
        paste::paste! {
            impl Kernels<$t> for Cblas {
                fn name(&self) -> &'static str {
                    "cblas"
                }

                fn axpy(&self, n: usize, alpha: $t, x: &[$t], incx: usize, y: &mut [$t], incy: usize) {
                    let (xs, ys) = (super::span(n, incx), super::span(n, incy));
                    match blas_ints([n, incx, incy]) {
                        Some([ni, ix, iy]) if n > 0 => {
                            let (x, y) = (&x[..xs], &mut y[..ys]);
                            // SAFETY: slices span n strided elements
                            unsafe { [<cblas_ $p axpy>](ni, alpha, x.as_ptr(), ix, y.as_mut_ptr(), iy) }
                        }
                        _ => portable::axpy(n, alpha, x, incx, y, incy),
                    }
                }

                fn dot(&self, n: usize, x: &[$t], incx: usize, y: &[$t], incy: usize) -> $t {
                    let (xs, ys) = (super::span(n, incx), super::span(n, incy));
                    match blas_ints([n, incx, incy]) {
                        Some([ni, ix, iy]) if n > 0 => {
                            let (x, y) = (&x[..xs], &y[..ys]);
                            // SAFETY: slices span n strided elements
                            unsafe { [<cblas_ $p dot>](ni, x.as_ptr(), ix, y.as_ptr(), iy) }
                        }
                        _ => portable::dot(n, x, incx, y, incy),
                    }
                }

                fn scal(&self, n: usize, alpha: $t, x: &mut [$t], incx: usize) {
                    let xs = super::span(n, incx);
                    match blas_ints([n, incx]) {
                        Some([ni, ix]) if n > 0 => {
                            let x = &mut x[..xs];
                            // SAFETY: slice spans n strided elements
                            unsafe { [<cblas_ $p scal>](ni, alpha, x.as_mut_ptr(), ix) }
                        }
                        _ => portable::scal(n, alpha, x, incx),
                    }
                }

                fn nrm2(&self, n: usize, x: &[$t], incx: usize) -> $t {
                    let xs = super::span(n, incx);
                    match blas_ints([n, incx]) {
                        Some([ni, ix]) if n > 0 => {
                            let x = &x[..xs];
                            // SAFETY: slice spans n strided elements
                            unsafe { [<cblas_ $p nrm2>](ni, x.as_ptr(), ix) }
                        }
                        _ => portable::nrm2(n, x, incx),
                    }
                }

                fn iamax(&self, n: usize, x: &[$t], incx: usize) -> usize {
                    let xs = super::span(n, incx);
                    // BLAS NaN handling is implementation-defined
                    let has_nan = x[..xs].iter().step_by(incx.max(1)).any(|v| v.is_nan());
                    match blas_ints([n, incx]) {
                        Some([ni, ix]) if n > 0 && !has_nan => {
                            // SAFETY: slice spans n strided elements
                            unsafe { [<cblas_i $p amax>](ni, x[..xs].as_ptr(), ix) }
                        }
                        _ => portable::iamax(n, x, incx),
                    }
                }

                fn gemv(
                    &self,
                    m: usize,
                    n: usize,
                    alpha: $t,
                    a: &[$t],
                    lda: usize,
                    x: &[$t],
                    incx: usize,
                    beta: $t,
                    y: &mut [$t],
                    incy: usize,
                ) {
                    let a_len = if m == 0 { 0 } else { (m - 1) * lda + n };
                    let (xs, ys) = (super::span(n, incx), super::span(m, incy));
                    match blas_ints([m, n, lda, incx, incy]) {
                        Some([mi, ni, ldai, ix, iy]) if m > 0 && n > 0 && lda >= n => {
                            let (a, x, y) = (&a[..a_len], &x[..xs], &mut y[..ys]);
                            // SAFETY: a holds m rows of lda, x and y span their strided lengths
                            unsafe {
                                [<cblas_ $p gemv>](
                                    CBLAS_ROW_MAJOR, CBLAS_NO_TRANS, mi, ni, alpha,
                                    a.as_ptr(), ldai, x.as_ptr(), ix, beta, y.as_mut_ptr(), iy,
                                )
                            }
                        }
                        _ => portable::gemv(m, n, alpha, a, lda, x, incx, beta, y, incy),
                    }
                }

                fn gemm(
                    &self,
                    m: usize,
                    n: usize,
                    k: usize,
                    alpha: $t,
                    a: &[$t],
                    lda: usize,
                    b: &[$t],
                    ldb: usize,
                    beta: $t,
                    c: &mut [$t],
                    ldc: usize,
                ) {
                    let usable = m > 0 && n > 0 && k > 0 && lda >= k && ldb >= n && ldc >= n;
                    match blas_ints([m, n, k, lda, ldb, ldc]) {
                        Some([mi, ni, ki, ldai, ldbi, ldci]) if usable => {
                            let a = &a[..(m - 1) * lda + k];
                            let b = &b[..(k - 1) * ldb + n];
                            let c = &mut c[..(m - 1) * ldc + n];
                            // SAFETY: each slice holds its full row-major extent
                            unsafe {
                                [<cblas_ $p gemm>](
                                    CBLAS_ROW_MAJOR, CBLAS_NO_TRANS, CBLAS_NO_TRANS,
                                    mi, ni, ki, alpha, a.as_ptr(), ldai, b.as_ptr(), ldbi,
                                    beta, c.as_mut_ptr(), ldci,
                                )
                            }
                        }
                        _ => portable::gemm(m, n, k, alpha, a, lda, b, ldb, beta, c, ldc),
                    }
                }
            }
        }
    };
}

impl_cblas_kernels!(f32, s);
impl_cblas_kernels!(f64, d);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blas_ints_overflow() {
        assert_eq!(blas_ints([1, 2]), Some([1, 2]));
        assert_eq!(blas_ints([usize::MAX]), None);
    }

    #[test]
    fn test_cblas_matches_portable() {
        let a = [1.0f64, 2.0, 3.0, 4.0];
        let b = [5.0f64, 6.0, 7.0, 8.0];
        let mut c = [0.0f64; 4];
        Kernels::<f64>::gemm(&Cblas, 2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &mut c, 2);
        assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
        assert_eq!(Kernels::<f64>::dot(&Cblas, 4, &a, 1, &b, 1), 70.0);
        assert_eq!(Kernels::<f64>::iamax(&Cblas, 3, &[1.0, -5.0, 5.0], 1), 1);
    }
}
