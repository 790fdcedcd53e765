//! SIMD kernel set
//!
//! ```text
//! simd/
//! ├── mod.rs     # Kernels impls + architecture dispatch
//! ├── avx2.rs    # x86-64 AVX2+FMA
//! └── neon.rs    # AArch64 NEON
//! ```
//!
//! Vector intrinsics only see contiguous (`inc == 1`) operands of at least
//! [`SIMD_THRESHOLD`] elements. Everything else, and every call on a CPU
//! without a supported instruction set, runs the portable loops. The
//! instruction set is re-checked against [`detect_simd`] on each call, so a
//! `Simd` table is safe to use even under pinned capabilities.

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "aarch64")]
mod neon;

use super::portable;
use super::Kernels;
use crate::runtime::{detect_simd, SimdLevel};

/// Minimum length to justify SIMD overhead
pub const SIMD_THRESHOLD: usize = 16;

/// AVX2+FMA / NEON kernel set for `f32` and `f64`
#[derive(Copy, Clone, Debug, Default)]
pub struct Simd;

macro_rules! impl_simd_kernels {
    ($t:ident) => {
        paste::paste! {
            #[inline]
            fn [<dot_ $t>](x: &[$t], y: &[$t]) -> $t {
                let n = x.len().min(y.len());
                match detect_simd() {
                    #[cfg(target_arch = "x86_64")]
                    // SAFETY: AVX2+FMA detected; both slices hold n elements
                    SimdLevel::Avx2Fma => unsafe { avx2::[<dot_ $t>](x.as_ptr(), y.as_ptr(), n) },
                    #[cfg(target_arch = "aarch64")]
                    // SAFETY: NEON is baseline on AArch64; both slices hold n elements
                    SimdLevel::Neon => unsafe { neon::[<dot_ $t>](x.as_ptr(), y.as_ptr(), n) },
                    _ => portable::dot(n, x, 1, y, 1),
                }
            }

            #[inline]
            fn [<axpy_ $t>](alpha: $t, x: &[$t], y: &mut [$t]) {
                let n = x.len().min(y.len());
                match detect_simd() {
                    #[cfg(target_arch = "x86_64")]
                    // SAFETY: AVX2+FMA detected; both slices hold n elements
                    SimdLevel::Avx2Fma => unsafe {
                        avx2::[<axpy_ $t>](alpha, x.as_ptr(), y.as_mut_ptr(), n)
                    },
                    #[cfg(target_arch = "aarch64")]
                    // SAFETY: NEON is baseline on AArch64; both slices hold n elements
                    SimdLevel::Neon => unsafe {
                        neon::[<axpy_ $t>](alpha, x.as_ptr(), y.as_mut_ptr(), n)
                    },
                    _ => portable::axpy(n, alpha, x, 1, y, 1),
                }
            }

            #[inline]
            fn [<scal_ $t>](alpha: $t, x: &mut [$t]) {
                let n = x.len();
                match detect_simd() {
                    #[cfg(target_arch = "x86_64")]
                    // SAFETY: AVX2 detected; slice holds n elements
                    SimdLevel::Avx2Fma => unsafe { avx2::[<scal_ $t>](alpha, x.as_mut_ptr(), n) },
                    #[cfg(target_arch = "aarch64")]
                    // SAFETY: NEON is baseline on AArch64; slice holds n elements
                    SimdLevel::Neon => unsafe { neon::[<scal_ $t>](alpha, x.as_mut_ptr(), n) },
                    _ => portable::scal(n, alpha, x, 1),
                }
            }

            #[inline]
            fn [<sumsq_ $t>](x: &[$t]) -> $t {
                let n = x.len();
                match detect_simd() {
                    #[cfg(target_arch = "x86_64")]
                    // SAFETY: AVX2+FMA detected; slice holds n elements
                    SimdLevel::Avx2Fma => unsafe { avx2::[<sumsq_ $t>](x.as_ptr(), n) },
                    #[cfg(target_arch = "aarch64")]
                    // SAFETY: NEON is baseline on AArch64; slice holds n elements
                    SimdLevel::Neon => unsafe { neon::[<sumsq_ $t>](x.as_ptr(), n) },
                    _ => x.iter().fold(0.0, |acc, &v| acc + v * v),
                }
            }

            #[inline]
            fn [<max_abs_ $t>](x: &[$t]) -> $t {
                let n = x.len();
                match detect_simd() {
                    #[cfg(target_arch = "x86_64")]
                    // SAFETY: AVX2 detected; slice holds n elements
                    SimdLevel::Avx2Fma => unsafe { avx2::[<max_abs_ $t>](x.as_ptr(), n) },
                    #[cfg(target_arch = "aarch64")]
                    // SAFETY: NEON is baseline on AArch64; slice holds n elements
                    SimdLevel::Neon => unsafe { neon::[<max_abs_ $t>](x.as_ptr(), n) },
                    _ => x
                        .iter()
                        .fold($t::NEG_INFINITY, |best, &v| if v.abs() > best { v.abs() } else { best }),
                }
            }

            impl Kernels<$t> for Simd {
                fn name(&self) -> &'static str {
                    "simd"
                }

                fn axpy(&self, n: usize, alpha: $t, x: &[$t], incx: usize, y: &mut [$t], incy: usize) {
                    if incx == 1 && incy == 1 && n >= SIMD_THRESHOLD {
                        [<axpy_ $t>](alpha, &x[..n], &mut y[..n]);
                    } else {
                        portable::axpy(n, alpha, x, incx, y, incy);
                    }
                }

                fn dot(&self, n: usize, x: &[$t], incx: usize, y: &[$t], incy: usize) -> $t {
                    if incx == 1 && incy == 1 && n >= SIMD_THRESHOLD {
                        [<dot_ $t>](&x[..n], &y[..n])
                    } else {
                        portable::dot(n, x, incx, y, incy)
                    }
                }

                fn scal(&self, n: usize, alpha: $t, x: &mut [$t], incx: usize) {
                    if incx == 1 && n >= SIMD_THRESHOLD {
                        [<scal_ $t>](alpha, &mut x[..n]);
                    } else {
                        portable::scal(n, alpha, x, incx);
                    }
                }

                fn nrm2(&self, n: usize, x: &[$t], incx: usize) -> $t {
                    if incx == 1 && n >= SIMD_THRESHOLD {
                        [<sumsq_ $t>](&x[..n]).sqrt()
                    } else {
                        portable::nrm2(n, x, incx)
                    }
                }

                fn iamax(&self, n: usize, x: &[$t], incx: usize) -> usize {
                    if incx != 1 || n < SIMD_THRESHOLD {
                        return portable::iamax(n, x, incx);
                    }
                    // Vector max first, then the first index attaining it.
                    // abs is exact, so this matches the portable scan.
                    let x = &x[..n];
                    let best = [<max_abs_ $t>](x);
                    x.iter().position(|v| v.abs() == best).unwrap_or(0)
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
                    if incx != 1 || n < SIMD_THRESHOLD {
                        portable::gemv(m, n, alpha, a, lda, x, incx, beta, y, incy);
                        return;
                    }
                    let x = &x[..n];
                    for i in 0..m {
                        let row = &a[i * lda..i * lda + n];
                        let acc = alpha * [<dot_ $t>](row, x);
                        let yi = &mut y[i * incy];
                        *yi = if beta == 0.0 { acc } else { acc + beta * *yi };
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
                    if n < SIMD_THRESHOLD {
                        portable::gemm(m, n, k, alpha, a, lda, b, ldb, beta, c, ldc);
                        return;
                    }
                    for i in 0..m {
                        let c_row = &mut c[i * ldc..i * ldc + n];
                        portable::scale_or_clear(c_row, beta);
                        for p in 0..k {
                            let a_ip = alpha * a[i * lda + p];
                            [<axpy_ $t>](a_ip, &b[p * ldb..p * ldb + n], c_row);
                        }
                    }
                }
            }
        }
    };
}

impl_simd_kernels!(f32);
impl_simd_kernels!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<f64> {
        (0..n).map(|i| ((i * 7 + 3) % 11) as f64 - 5.0).collect()
    }

    #[test]
    fn test_dot_matches_portable() {
        for n in [0, 3, 15, 16, 17, 33, 100] {
            let x = sample(n);
            let y: Vec<f64> = x.iter().map(|v| v * 0.5 + 1.0).collect();
            let expect = portable::dot(n, &x, 1, &y, 1);
            let got = Kernels::<f64>::dot(&Simd, n, &x, 1, &y, 1);
            assert!((got - expect).abs() < 1e-9, "n={n}: {got} vs {expect}");
        }
    }

    #[test]
    fn test_axpy_f32_matches_portable() {
        let n = 37;
        let x: Vec<f32> = (0..n).map(|i| i as f32 * 0.25).collect();
        let mut y_simd = vec![1.0f32; n];
        let mut y_port = y_simd.clone();
        Kernels::<f32>::axpy(&Simd, n, 2.0, &x, 1, &mut y_simd, 1);
        portable::axpy(n, 2.0, &x, 1, &mut y_port, 1);
        assert_eq!(y_simd, y_port);
    }

    #[test]
    fn test_iamax_agrees_exactly() {
        let mut x = sample(40);
        x[5] = -9.0;
        x[31] = 9.0;
        x[12] = f64::NAN;
        assert_eq!(Kernels::<f64>::iamax(&Simd, 40, &x, 1), 5);
        assert_eq!(portable::iamax(40, &x, 1), 5);

        let all_nan = vec![f64::NAN; 20];
        assert_eq!(Kernels::<f64>::iamax(&Simd, 20, &all_nan, 1), 0);
    }

    #[test]
    fn test_gemm_matches_portable() {
        let (m, n, k) = (3, 20, 4);
        let a: Vec<f64> = (0..m * k).map(|i| i as f64 - 4.0).collect();
        let b: Vec<f64> = (0..k * n).map(|i| (i % 5) as f64).collect();
        let mut c_simd = vec![0.0; m * n];
        let mut c_port = vec![0.0; m * n];
        Kernels::<f64>::gemm(&Simd, m, n, k, 1.0, &a, k, &b, n, 0.0, &mut c_simd, n);
        portable::gemm(m, n, k, 1.0, &a, k, &b, n, 0.0, &mut c_port, n);
        assert_eq!(c_simd, c_port);
    }
}
