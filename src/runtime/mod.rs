//! Kernel runtime: capability probing, dispatch policy and kernel sets
//!
//! # Architecture
//!
//! ```text
//! Capabilities (probed once per process)
//! └── Dispatch (pure policy: dtype × op × capabilities → KernelPath)
//!     ├── Portable       (always available, strided loops)
//!     └── Accelerated
//!         ├── Simd       (AVX2+FMA / NEON, runtime detected)
//!         └── Cblas      (libopenblas, `openblas` feature)
//! ```
//!
//! Containers carry a [`Dispatch`] value and consult it on every call; the
//! probe result is injected rather than read from global state, so tests can
//! pin either path.

mod capability;
mod dispatch;
pub mod kernels;

pub use capability::{detect_simd, Accelerator, Capabilities, SimdLevel, ACCEL_ENV};
pub use dispatch::{Dispatch, KernelOp, KernelPath};
