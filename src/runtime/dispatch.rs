//! Dispatch policy: which kernel set services a call

use super::capability::Capabilities;
use super::kernels::{Kernels, Portable};
use crate::dtype::{DType, Element};

/// Operations routed through the dispatch policy
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KernelOp {
    /// `y += alpha * x`
    Axpy,
    /// Inner product
    Dot,
    /// `x *= alpha`
    Scal,
    /// Euclidean norm
    Nrm2,
    /// Index of largest magnitude
    Iamax,
    /// Matrix-vector product
    Gemv,
    /// Matrix-matrix product
    Gemm,
    /// Structural equality
    Equals,
    /// Elementwise rewrite
    Map,
    /// Elementwise visit
    Each,
    /// Concatenation
    Combine,
    /// Single-element append
    Push,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Sum of elements
    Sum,
    /// Elementwise product
    Hadamard,
    /// Shape change
    Reshape,
    /// Matrix transpose
    Transpose,
    /// Text rendering
    ToString,
    /// Flat export
    ToArray,
}

impl KernelOp {
    /// Returns true if an accelerated kernel set can service this op
    ///
    /// Control-flow operations (comparisons, maps, concatenation, shape
    /// changes, rendering) only exist as portable loops.
    #[inline]
    pub const fn has_accelerated_entry(self) -> bool {
        matches!(
            self,
            Self::Axpy | Self::Dot | Self::Scal | Self::Nrm2 | Self::Iamax | Self::Gemv | Self::Gemm
        )
    }

    /// Operation name as used in logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Axpy => "axpy",
            Self::Dot => "dot",
            Self::Scal => "scal",
            Self::Nrm2 => "nrm2",
            Self::Iamax => "iamax",
            Self::Gemv => "gemv",
            Self::Gemm => "gemm",
            Self::Equals => "equals",
            Self::Map => "map",
            Self::Each => "each",
            Self::Combine => "combine",
            Self::Push => "push",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Hadamard => "hadamard",
            Self::Reshape => "reshape",
            Self::Transpose => "transpose",
            Self::ToString => "to_string",
            Self::ToArray => "to_array",
        }
    }
}

/// Outcome of the dispatch decision
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KernelPath {
    /// Accelerated kernel set (SIMD or CBLAS)
    Accelerated,
    /// Portable loops
    Portable,
}

/// Dispatch policy bound to a set of capabilities
///
/// `Dispatch` is a small `Copy` value. Every container holds one and asks it
/// on each call which kernels to run; nothing is cached per call.
///
/// # Example
///
/// ```
/// use densela::dtype::DType;
/// use densela::runtime::{Dispatch, KernelOp, KernelPath};
///
/// let dispatch = Dispatch::portable();
/// assert_eq!(dispatch.select(DType::F64, KernelOp::Dot), KernelPath::Portable);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dispatch {
    caps: Capabilities,
}

impl Dispatch {
    /// Policy over explicit capabilities
    pub const fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    /// Policy over the process-wide probe result
    pub fn detected() -> Self {
        Self::new(Capabilities::detect())
    }

    /// Policy that always selects the portable path
    pub const fn portable() -> Self {
        Self::new(Capabilities::portable())
    }

    /// The capabilities this policy decides over
    #[inline]
    pub const fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Decide the kernel path for `op` on elements of `dtype`
    pub fn select(&self, dtype: DType, op: KernelOp) -> KernelPath {
        let path = if self.caps.has_accelerator()
            && dtype.is_accelerable()
            && op.has_accelerated_entry()
        {
            KernelPath::Accelerated
        } else {
            KernelPath::Portable
        };
        log::trace!(
            "dispatch {} {} -> {:?} ({})",
            op.name(),
            dtype,
            path,
            self.caps.accelerator()
        );
        path
    }

    /// Kernel table servicing `op` for element type `T`
    ///
    /// Falls back to the portable table when the accelerator named by the
    /// capabilities is not compiled into this build.
    pub fn kernels<T: Element>(&self, op: KernelOp) -> &'static dyn Kernels<T> {
        match self.select(T::DTYPE, op) {
            KernelPath::Accelerated => match T::accelerated(self.caps.accelerator()) {
                Some(kernels) => kernels,
                None => {
                    log::debug!(
                        "{} not compiled in, {} uses portable kernels",
                        self.caps.accelerator(),
                        op.name()
                    );
                    &Portable
                }
            },
            KernelPath::Portable => &Portable,
        }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::detected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Accelerator, SimdLevel};

    #[test]
    fn test_portable_policy_never_accelerates() {
        let dispatch = Dispatch::portable();
        for op in [KernelOp::Axpy, KernelOp::Gemm, KernelOp::Iamax] {
            assert_eq!(dispatch.select(DType::F32, op), KernelPath::Portable);
        }
        assert_eq!(dispatch.kernels::<f64>(KernelOp::Dot).name(), "portable");
    }

    #[test]
    fn test_control_flow_ops_stay_portable() {
        let dispatch = Dispatch::new(Capabilities::with_accelerator(Accelerator::Simd(
            SimdLevel::Avx2Fma,
        )));
        for op in [
            KernelOp::Equals,
            KernelOp::Map,
            KernelOp::Combine,
            KernelOp::Min,
            KernelOp::Max,
            KernelOp::Reshape,
        ] {
            assert_eq!(dispatch.select(DType::F64, op), KernelPath::Portable);
        }
        assert_eq!(
            dispatch.select(DType::F64, KernelOp::Dot),
            KernelPath::Accelerated
        );
    }

    #[cfg(not(feature = "openblas"))]
    #[test]
    fn test_missing_backend_falls_back() {
        let dispatch = Dispatch::new(Capabilities::with_accelerator(Accelerator::Cblas));
        assert_eq!(dispatch.kernels::<f32>(KernelOp::Gemm).name(), "portable");
    }
}
