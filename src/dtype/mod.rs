//! Data type system for densela containers
//!
//! Containers carry their element type at runtime (`DType`) so that two
//! operands of different precision can meet in one call; the receiver's
//! dtype always wins. Typed code is reached through [`dispatch_dtype!`].

mod element;

pub use element::Element;

use std::fmt;

/// Element types supported by densela containers
///
/// Both variants have an accelerated kernel entry point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point (default)
    #[default]
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 => 4,
        }
    }

    /// Returns true if an accelerated kernel entry point exists for this type
    #[inline]
    pub const fn is_accelerable(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Short lowercase name (`"f32"`, `"f64"`)
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime dtype dispatch to typed code.
///
/// Binds `$T` to the concrete element type matching `$dtype` and evaluates
/// `$body` with it.
///
/// ```ignore
/// let bytes = dispatch_dtype!(dtype, T => { std::mem::size_of::<T>() });
/// ```
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::F32.size_in_bytes(), 4);
    }

    #[test]
    fn test_default_is_f64() {
        assert_eq!(DType::default(), DType::F64);
    }

    #[test]
    fn test_dispatch_binds_type() {
        let size = dispatch_dtype!(DType::F32, T => { std::mem::size_of::<T>() });
        assert_eq!(size, 4);
        let size = dispatch_dtype!(DType::F64, T => { std::mem::size_of::<T>() });
        assert_eq!(size, 8);
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::F32.to_string(), "f32");
    }
}
