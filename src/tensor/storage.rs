//! Storage: typed element buffers with Arc-based sharing

use crate::dtype::{DType, Element};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Owned, homogeneously typed element memory
///
/// The variant always agrees with the `DType` recorded by the owning
/// [`Storage`]; typed access goes through [`Element::slice`] and
/// [`Element::slice_mut`].
#[derive(Clone, Debug, PartialEq)]
pub enum Buffer {
    /// 32-bit float elements
    F32(Vec<f32>),
    /// 64-bit float elements
    F64(Vec<f64>),
}

impl Buffer {
    /// Zero-filled buffer of `len` elements
    pub fn zeros(len: usize, dtype: DType) -> Self {
        match dtype {
            DType::F32 => Self::F32(bytemuck::zeroed_vec(len)),
            DType::F64 => Self::F64(bytemuck::zeroed_vec(len)),
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Check if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the buffer
    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    /// Read element `i` widened to f64
    #[inline]
    pub fn get_f64(&self, i: usize) -> f64 {
        match self {
            Self::F32(v) => v[i] as f64,
            Self::F64(v) => v[i],
        }
    }

    /// Write element `i` from an f64, narrowing if needed
    #[inline]
    pub fn set_f64(&mut self, i: usize, value: f64) {
        match self {
            Self::F32(v) => v[i] = value as f32,
            Self::F64(v) => v[i] = value,
        }
    }
}

/// Storage for container data
///
/// Storage wraps a [`Buffer`] with reference counting, enabling zero-copy
/// views (matrix rows and columns, sub-arrays, vector slices) that share the
/// underlying memory. Cloning a `Storage` creates another alias, never a copy;
/// a write through one alias is visible through every other alias.
///
/// The buffer is released when the last alias is dropped.
pub struct Storage {
    inner: Arc<RwLock<Buffer>>,
    len: usize,
    dtype: DType,
}

impl Storage {
    /// Create zero-filled storage of `len` elements
    pub fn new(len: usize, dtype: DType) -> Self {
        Self::from_buffer(Buffer::zeros(len, dtype))
    }

    /// Wrap an existing buffer, taking exclusive ownership
    pub fn from_buffer(buffer: Buffer) -> Self {
        let len = buffer.len();
        let dtype = buffer.dtype();
        Self {
            inner: Arc::new(RwLock::new(buffer)),
            len,
            dtype,
        }
    }

    /// Create storage from a typed vector; the dtype is inferred from `T`
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        Self::from_buffer(T::into_buffer(data))
    }

    /// Create storage of `dtype` by converting f64 values
    pub fn from_f64_slice(values: &[f64], dtype: DType) -> Self {
        let buffer = match dtype {
            DType::F32 => Buffer::F32(values.iter().map(|&v| v as f32).collect()),
            DType::F64 => Buffer::F64(values.to_vec()),
        };
        Self::from_buffer(buffer)
    }

    /// Create storage filled with `value`
    pub fn filled(len: usize, value: f64, dtype: DType) -> Self {
        if value == 0.0 {
            return Self::new(len, dtype);
        }
        let buffer = match dtype {
            DType::F32 => Buffer::F32(vec![value as f32; len]),
            DType::F64 => Buffer::F64(vec![value; len]),
        };
        Self::from_buffer(buffer)
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }

    /// Get the reference count (number of live aliases)
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check if this is the only reference
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Returns true if both handles alias the same buffer
    #[inline]
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Lock the buffer for reading
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Buffer> {
        self.inner.read()
    }

    /// Lock the buffer for writing
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Buffer> {
        self.inner.write()
    }
}

impl Clone for Storage {
    /// Clone increments the reference count (zero-copy alias)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            len: self.len,
            dtype: self.dtype,
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .field("len", &self.len)
            .field("dtype", &self.dtype)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_aliases() {
        let a = Storage::from_vec(vec![1.0f64, 2.0, 3.0]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.ref_count(), 2);

        b.write().set_f64(1, 20.0);
        assert_eq!(a.read().get_f64(1), 20.0);

        drop(b);
        assert!(a.is_unique());
    }

    #[test]
    fn test_from_f64_slice_narrows() {
        let s = Storage::from_f64_slice(&[0.5, 1.5], DType::F32);
        assert_eq!(s.dtype(), DType::F32);
        assert_eq!(s.size_in_bytes(), 8);
        assert_eq!(&*s.read(), &Buffer::F32(vec![0.5, 1.5]));
    }

    #[test]
    fn test_empty_storage() {
        let s = Storage::new(0, DType::F64);
        assert!(s.is_empty());
        assert_eq!(s.size_in_bytes(), 0);
    }

    #[test]
    fn test_filled_zero_and_nonzero() {
        let z = Storage::filled(3, 0.0, DType::F32);
        assert_eq!(&*z.read(), &Buffer::F32(vec![0.0; 3]));
        let o = Storage::filled(2, 1.5, DType::F64);
        assert_eq!(&*o.read(), &Buffer::F64(vec![1.5; 2]));
    }
}
