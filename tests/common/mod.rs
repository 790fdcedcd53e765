//! Common test utilities
#![allow(dead_code)]

use densela::runtime::{detect_simd, Accelerator, Capabilities, Dispatch, SimdLevel};

/// Install `env_logger` once so `RUST_LOG=densela=trace` shows dispatch decisions
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Dispatch policy pinned to the portable path
pub fn portable() -> Dispatch {
    Dispatch::portable()
}

/// Every accelerated policy this build and CPU can serve
///
/// Empty on a machine with neither SIMD nor CBLAS; parity tests then only
/// exercise the portable path against itself.
pub fn accelerated() -> Vec<Dispatch> {
    let mut out = Vec::new();
    let level = detect_simd();
    if cfg!(feature = "simd") && level != SimdLevel::Scalar {
        out.push(Dispatch::new(Capabilities::with_accelerator(
            Accelerator::Simd(level),
        )));
    }
    if cfg!(feature = "openblas") {
        out.push(Dispatch::new(Capabilities::with_accelerator(
            Accelerator::Cblas,
        )));
    }
    out
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}
