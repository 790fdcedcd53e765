//! Element trait for mapping Rust types to DType

use super::DType;
use crate::runtime::kernels::Kernels;
use crate::runtime::Accelerator;
use crate::tensor::Buffer;
use bytemuck::{Pod, Zeroable};
use num_traits::Float;
use std::fmt::{Debug, Display};

/// Trait for types that can be elements of a container
///
/// This trait connects Rust's type system to densela's runtime dtype system
/// and to the kernel tables: each element type knows which accelerated entry
/// points exist for it.
///
/// # Bounds
/// - `Pod + Zeroable` - Safe memory transmutation (bytemuck)
/// - `Float` - Arithmetic, `abs`, `sqrt` and comparisons (num-traits)
pub trait Element:
    Copy + Send + Sync + Pod + Zeroable + Float + Debug + Display + Default + 'static
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Widen to f64 (lossless for both supported types)
    fn as_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;

    /// Typed view of a buffer whose dtype is `Self::DTYPE`
    ///
    /// Callers reach this through [`dispatch_dtype!`](crate::dispatch_dtype)
    /// on the owning storage's dtype, so the variant always matches.
    fn slice(buffer: &Buffer) -> &[Self];

    /// Mutable typed view of a buffer whose dtype is `Self::DTYPE`
    fn slice_mut(buffer: &mut Buffer) -> &mut [Self];

    /// Wrap a typed vector into a buffer
    fn into_buffer(data: Vec<Self>) -> Buffer;

    /// Accelerated kernel table for this type, if `accelerator` provides one
    fn accelerated(accelerator: Accelerator) -> Option<&'static dyn Kernels<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $dtype:ident) => {
        impl Element for $ty {
            const DTYPE: DType = DType::$dtype;

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            #[inline]
            fn slice(buffer: &Buffer) -> &[Self] {
                match buffer {
                    Buffer::$dtype(v) => v,
                    other => unreachable!(
                        "{} buffer accessed as {}",
                        other.dtype(),
                        DType::$dtype
                    ),
                }
            }

            #[inline]
            fn slice_mut(buffer: &mut Buffer) -> &mut [Self] {
                match buffer {
                    Buffer::$dtype(v) => v,
                    other => unreachable!(
                        "{} buffer accessed as {}",
                        other.dtype(),
                        DType::$dtype
                    ),
                }
            }

            #[inline]
            fn into_buffer(data: Vec<Self>) -> Buffer {
                Buffer::$dtype(data)
            }

            fn accelerated(accelerator: Accelerator) -> Option<&'static dyn Kernels<Self>> {
                match accelerator {
                    Accelerator::None => None,
                    #[cfg(feature = "simd")]
                    Accelerator::Simd(_) => Some(&crate::runtime::kernels::simd::Simd),
                    #[cfg(not(feature = "simd"))]
                    Accelerator::Simd(_) => None,
                    #[cfg(feature = "openblas")]
                    Accelerator::Cblas => Some(&crate::runtime::kernels::cblas::Cblas),
                    #[cfg(not(feature = "openblas"))]
                    Accelerator::Cblas => None,
                }
            }
        }
    };
}

impl_element!(f32, F32);
impl_element!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_matches_variant() {
        let buffer = f32::into_buffer(vec![1.0, 2.0]);
        assert_eq!(f32::slice(&buffer), &[1.0, 2.0]);
        assert_eq!(buffer.dtype(), DType::F32);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(f32::from_f64(0.5).as_f64(), 0.5);
        assert_eq!(<f64 as Element>::DTYPE, DType::F64);
    }

    #[test]
    fn test_no_accelerator_has_no_table() {
        assert!(f64::accelerated(Accelerator::None).is_none());
    }
}
