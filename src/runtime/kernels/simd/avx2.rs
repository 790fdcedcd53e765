//! AVX2+FMA kernels
//!
//! Every entry point processes `n` contiguous elements: full vectors first,
//! then a scalar tail. AVX2 lacks `_mm256_reduce_*`, so horizontal
//! reductions are done by hand.

use std::arch::x86_64::*;

const F32_LANES: usize = 8;
const F64_LANES: usize = 4;

// ============================================================================
// Horizontal reduction helpers
// ============================================================================

/// Horizontal sum of 8 f32s
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_f32(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let sum128 = _mm_add_ps(low, high);

    let shuf = _mm_movehdup_ps(sum128);
    let sum64 = _mm_add_ps(sum128, shuf);
    let shuf2 = _mm_movehl_ps(sum64, sum64);
    _mm_cvtss_f32(_mm_add_ss(sum64, shuf2))
}

/// Horizontal max of 8 f32s (inputs must be NaN-free)
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hmax_f32(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let max128 = _mm_max_ps(low, high);

    let shuf = _mm_movehdup_ps(max128);
    let max64 = _mm_max_ps(max128, shuf);
    let shuf2 = _mm_movehl_ps(max64, max64);
    _mm_cvtss_f32(_mm_max_ss(max64, shuf2))
}

/// Horizontal sum of 4 f64s
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_f64(v: __m256d) -> f64 {
    let high = _mm256_extractf128_pd(v, 1);
    let low = _mm256_castpd256_pd128(v);
    let sum128 = _mm_add_pd(low, high);
    let hi64 = _mm_unpackhi_pd(sum128, sum128);
    _mm_cvtsd_f64(_mm_add_sd(sum128, hi64))
}

/// Horizontal max of 4 f64s (inputs must be NaN-free)
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hmax_f64(v: __m256d) -> f64 {
    let high = _mm256_extractf128_pd(v, 1);
    let low = _mm256_castpd256_pd128(v);
    let max128 = _mm_max_pd(low, high);
    let hi64 = _mm_unpackhi_pd(max128, max128);
    _mm_cvtsd_f64(_mm_max_sd(max128, hi64))
}

// ============================================================================
// f32
// ============================================================================

/// `Σ a[i] * b[i]`
///
/// # Safety
/// - CPU must support AVX2 and FMA
/// - `a` and `b` must point to `n` valid elements
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn dot_f32(a: *const f32, b: *const f32, n: usize) -> f32 {
    let chunks = n / F32_LANES;
    let mut acc = _mm256_setzero_ps();
    for c in 0..chunks {
        let off = c * F32_LANES;
        let va = _mm256_loadu_ps(a.add(off));
        let vb = _mm256_loadu_ps(b.add(off));
        acc = _mm256_fmadd_ps(va, vb, acc);
    }
    let mut sum = hsum_f32(acc);
    for i in (chunks * F32_LANES)..n {
        sum += *a.add(i) * *b.add(i);
    }
    sum
}

/// `y[i] += alpha * x[i]`
///
/// # Safety
/// - CPU must support AVX2 and FMA
/// - `x` and `y` must point to `n` valid elements; `y` must be writable
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn axpy_f32(alpha: f32, x: *const f32, y: *mut f32, n: usize) {
    let chunks = n / F32_LANES;
    let va = _mm256_set1_ps(alpha);
    for c in 0..chunks {
        let off = c * F32_LANES;
        let vx = _mm256_loadu_ps(x.add(off));
        let vy = _mm256_loadu_ps(y.add(off));
        _mm256_storeu_ps(y.add(off), _mm256_fmadd_ps(va, vx, vy));
    }
    for i in (chunks * F32_LANES)..n {
        *y.add(i) += alpha * *x.add(i);
    }
}

/// `x[i] *= alpha`
///
/// # Safety
/// - CPU must support AVX2
/// - `x` must point to `n` valid, writable elements
#[target_feature(enable = "avx2")]
pub unsafe fn scal_f32(alpha: f32, x: *mut f32, n: usize) {
    let chunks = n / F32_LANES;
    let va = _mm256_set1_ps(alpha);
    for c in 0..chunks {
        let off = c * F32_LANES;
        let vx = _mm256_loadu_ps(x.add(off));
        _mm256_storeu_ps(x.add(off), _mm256_mul_ps(vx, va));
    }
    for i in (chunks * F32_LANES)..n {
        *x.add(i) *= alpha;
    }
}

/// `Σ x[i]²`
///
/// # Safety
/// - CPU must support AVX2 and FMA
/// - `x` must point to `n` valid elements
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn sumsq_f32(x: *const f32, n: usize) -> f32 {
    let chunks = n / F32_LANES;
    let mut acc = _mm256_setzero_ps();
    for c in 0..chunks {
        let v = _mm256_loadu_ps(x.add(c * F32_LANES));
        acc = _mm256_fmadd_ps(v, v, acc);
    }
    let mut sum = hsum_f32(acc);
    for i in (chunks * F32_LANES)..n {
        let v = *x.add(i);
        sum += v * v;
    }
    sum
}

/// Largest `|x[i]|`, skipping NaN; `-inf` when nothing qualifies
///
/// # Safety
/// - CPU must support AVX2
/// - `x` must point to `n` valid elements
#[target_feature(enable = "avx2")]
pub unsafe fn max_abs_f32(x: *const f32, n: usize) -> f32 {
    let chunks = n / F32_LANES;
    let sign = _mm256_set1_ps(-0.0);
    let mut acc = _mm256_set1_ps(f32::NEG_INFINITY);
    for c in 0..chunks {
        let v = _mm256_andnot_ps(sign, _mm256_loadu_ps(x.add(c * F32_LANES)));
        // maxps returns its second operand when either is NaN
        acc = _mm256_max_ps(v, acc);
    }
    let mut best = hmax_f32(acc);
    for i in (chunks * F32_LANES)..n {
        let v = (*x.add(i)).abs();
        if v > best {
            best = v;
        }
    }
    best
}

// ============================================================================
// f64
// ============================================================================

/// `Σ a[i] * b[i]`
///
/// # Safety
/// - CPU must support AVX2 and FMA
/// - `a` and `b` must point to `n` valid elements
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn dot_f64(a: *const f64, b: *const f64, n: usize) -> f64 {
    let chunks = n / F64_LANES;
    let mut acc = _mm256_setzero_pd();
    for c in 0..chunks {
        let off = c * F64_LANES;
        let va = _mm256_loadu_pd(a.add(off));
        let vb = _mm256_loadu_pd(b.add(off));
        acc = _mm256_fmadd_pd(va, vb, acc);
    }
    let mut sum = hsum_f64(acc);
    for i in (chunks * F64_LANES)..n {
        sum += *a.add(i) * *b.add(i);
    }
    sum
}

/// `y[i] += alpha * x[i]`
///
/// # Safety
/// - CPU must support AVX2 and FMA
/// - `x` and `y` must point to `n` valid elements; `y` must be writable
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn axpy_f64(alpha: f64, x: *const f64, y: *mut f64, n: usize) {
    let chunks = n / F64_LANES;
    let va = _mm256_set1_pd(alpha);
    for c in 0..chunks {
        let off = c * F64_LANES;
        let vx = _mm256_loadu_pd(x.add(off));
        let vy = _mm256_loadu_pd(y.add(off));
        _mm256_storeu_pd(y.add(off), _mm256_fmadd_pd(va, vx, vy));
    }
    for i in (chunks * F64_LANES)..n {
        *y.add(i) += alpha * *x.add(i);
    }
}

/// `x[i] *= alpha`
///
/// # Safety
/// - CPU must support AVX2
/// - `x` must point to `n` valid, writable elements
#[target_feature(enable = "avx2")]
pub unsafe fn scal_f64(alpha: f64, x: *mut f64, n: usize) {
    let chunks = n / F64_LANES;
    let va = _mm256_set1_pd(alpha);
    for c in 0..chunks {
        let off = c * F64_LANES;
        let vx = _mm256_loadu_pd(x.add(off));
        _mm256_storeu_pd(x.add(off), _mm256_mul_pd(vx, va));
    }
    for i in (chunks * F64_LANES)..n {
        *x.add(i) *= alpha;
    }
}

/// `Σ x[i]²`
///
/// # Safety
/// - CPU must support AVX2 and FMA
/// - `x` must point to `n` valid elements
#[target_feature(enable = "avx2", enable = "fma")]
pub unsafe fn sumsq_f64(x: *const f64, n: usize) -> f64 {
    let chunks = n / F64_LANES;
    let mut acc = _mm256_setzero_pd();
    for c in 0..chunks {
        let v = _mm256_loadu_pd(x.add(c * F64_LANES));
        acc = _mm256_fmadd_pd(v, v, acc);
    }
    let mut sum = hsum_f64(acc);
    for i in (chunks * F64_LANES)..n {
        let v = *x.add(i);
        sum += v * v;
    }
    sum
}

/// Largest `|x[i]|`, skipping NaN; `-inf` when nothing qualifies
///
/// # Safety
/// - CPU must support AVX2
/// - `x` must point to `n` valid elements
#[target_feature(enable = "avx2")]
pub unsafe fn max_abs_f64(x: *const f64, n: usize) -> f64 {
    let chunks = n / F64_LANES;
    let sign = _mm256_set1_pd(-0.0);
    let mut acc = _mm256_set1_pd(f64::NEG_INFINITY);
    for c in 0..chunks {
        let v = _mm256_andnot_pd(sign, _mm256_loadu_pd(x.add(c * F64_LANES)));
        acc = _mm256_max_pd(v, acc);
    }
    let mut best = hmax_f64(acc);
    for i in (chunks * F64_LANES)..n {
        let v = (*x.add(i)).abs();
        if v > best {
            best = v;
        }
    }
    best
}
