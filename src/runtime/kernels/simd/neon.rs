//! NEON kernels for ARM64
//!
//! 4 f32 / 2 f64 lanes per 128-bit register, scalar tail for the rest.

use std::arch::aarch64::*;

const F32_LANES: usize = 4;
const F64_LANES: usize = 2;

// ============================================================================
// f32
// ============================================================================

/// `Σ a[i] * b[i]`
///
/// # Safety
/// - `a` and `b` must point to `n` valid elements
#[target_feature(enable = "neon")]
pub unsafe fn dot_f32(a: *const f32, b: *const f32, n: usize) -> f32 {
    let chunks = n / F32_LANES;
    let mut acc = vdupq_n_f32(0.0);
    for c in 0..chunks {
        let off = c * F32_LANES;
        acc = vfmaq_f32(acc, vld1q_f32(a.add(off)), vld1q_f32(b.add(off)));
    }
    let mut sum = vaddvq_f32(acc);
    for i in (chunks * F32_LANES)..n {
        sum += *a.add(i) * *b.add(i);
    }
    sum
}

/// `y[i] += alpha * x[i]`
///
/// # Safety
/// - `x` and `y` must point to `n` valid elements; `y` must be writable
#[target_feature(enable = "neon")]
pub unsafe fn axpy_f32(alpha: f32, x: *const f32, y: *mut f32, n: usize) {
    let chunks = n / F32_LANES;
    let va = vdupq_n_f32(alpha);
    for c in 0..chunks {
        let off = c * F32_LANES;
        let vy = vfmaq_f32(vld1q_f32(y.add(off)), va, vld1q_f32(x.add(off)));
        vst1q_f32(y.add(off), vy);
    }
    for i in (chunks * F32_LANES)..n {
        *y.add(i) += alpha * *x.add(i);
    }
}

/// `x[i] *= alpha`
///
/// # Safety
/// - `x` must point to `n` valid, writable elements
#[target_feature(enable = "neon")]
pub unsafe fn scal_f32(alpha: f32, x: *mut f32, n: usize) {
    let chunks = n / F32_LANES;
    let va = vdupq_n_f32(alpha);
    for c in 0..chunks {
        let off = c * F32_LANES;
        vst1q_f32(x.add(off), vmulq_f32(vld1q_f32(x.add(off)), va));
    }
    for i in (chunks * F32_LANES)..n {
        *x.add(i) *= alpha;
    }
}

/// `Σ x[i]²`
///
/// # Safety
/// - `x` must point to `n` valid elements
#[target_feature(enable = "neon")]
pub unsafe fn sumsq_f32(x: *const f32, n: usize) -> f32 {
    let chunks = n / F32_LANES;
    let mut acc = vdupq_n_f32(0.0);
    for c in 0..chunks {
        let v = vld1q_f32(x.add(c * F32_LANES));
        acc = vfmaq_f32(acc, v, v);
    }
    let mut sum = vaddvq_f32(acc);
    for i in (chunks * F32_LANES)..n {
        let v = *x.add(i);
        sum += v * v;
    }
    sum
}

/// Largest `|x[i]|`, skipping NaN; `-inf` when nothing qualifies
///
/// # Safety
/// - `x` must point to `n` valid elements
#[target_feature(enable = "neon")]
pub unsafe fn max_abs_f32(x: *const f32, n: usize) -> f32 {
    let chunks = n / F32_LANES;
    let mut acc = vdupq_n_f32(f32::NEG_INFINITY);
    for c in 0..chunks {
        let v = vabsq_f32(vld1q_f32(x.add(c * F32_LANES)));
        // maxnm keeps the numeric operand when the other is NaN
        acc = vmaxnmq_f32(acc, v);
    }
    let mut best = vmaxnmvq_f32(acc);
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
/// - `a` and `b` must point to `n` valid elements
#[target_feature(enable = "neon")]
pub unsafe fn dot_f64(a: *const f64, b: *const f64, n: usize) -> f64 {
    let chunks = n / F64_LANES;
    let mut acc = vdupq_n_f64(0.0);
    for c in 0..chunks {
        let off = c * F64_LANES;
        acc = vfmaq_f64(acc, vld1q_f64(a.add(off)), vld1q_f64(b.add(off)));
    }
    let mut sum = vaddvq_f64(acc);
    for i in (chunks * F64_LANES)..n {
        sum += *a.add(i) * *b.add(i);
    }
    sum
}

/// `y[i] += alpha * x[i]`
///
/// # Safety
/// - `x` and `y` must point to `n` valid elements; `y` must be writable
#[target_feature(enable = "neon")]
pub unsafe fn axpy_f64(alpha: f64, x: *const f64, y: *mut f64, n: usize) {
    let chunks = n / F64_LANES;
    let va = vdupq_n_f64(alpha);
    for c in 0..chunks {
        let off = c * F64_LANES;
        let vy = vfmaq_f64(vld1q_f64(y.add(off)), va, vld1q_f64(x.add(off)));
        vst1q_f64(y.add(off), vy);
    }
    for i in (chunks * F64_LANES)..n {
        *y.add(i) += alpha * *x.add(i);
    }
}

/// `x[i] *= alpha`
///
/// # Safety
/// - `x` must point to `n` valid, writable elements
#[target_feature(enable = "neon")]
pub unsafe fn scal_f64(alpha: f64, x: *mut f64, n: usize) {
    let chunks = n / F64_LANES;
    let va = vdupq_n_f64(alpha);
    for c in 0..chunks {
        let off = c * F64_LANES;
        vst1q_f64(x.add(off), vmulq_f64(vld1q_f64(x.add(off)), va));
    }
    for i in (chunks * F64_LANES)..n {
        *x.add(i) *= alpha;
    }
}

/// `Σ x[i]²`
///
/// # Safety
/// - `x` must point to `n` valid elements
#[target_feature(enable = "neon")]
pub unsafe fn sumsq_f64(x: *const f64, n: usize) -> f64 {
    let chunks = n / F64_LANES;
    let mut acc = vdupq_n_f64(0.0);
    for c in 0..chunks {
        let v = vld1q_f64(x.add(c * F64_LANES));
        acc = vfmaq_f64(acc, v, v);
    }
    let mut sum = vaddvq_f64(acc);
    for i in (chunks * F64_LANES)..n {
        let v = *x.add(i);
        sum += v * v;
    }
    sum
}

/// Largest `|x[i]|`, skipping NaN; `-inf` when nothing qualifies
///
/// # Safety
/// - `x` must point to `n` valid elements
#[target_feature(enable = "neon")]
pub unsafe fn max_abs_f64(x: *const f64, n: usize) -> f64 {
    let chunks = n / F64_LANES;
    let mut acc = vdupq_n_f64(f64::NEG_INFINITY);
    for c in 0..chunks {
        let v = vabsq_f64(vld1q_f64(x.add(c * F64_LANES)));
        acc = vmaxnmq_f64(acc, v);
    }
    let mut best = vmaxnmvq_f64(acc);
    for i in (chunks * F64_LANES)..n {
        let v = (*x.add(i)).abs();
        if v > best {
            best = v;
        }
    }
    best
}
