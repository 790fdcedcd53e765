//! Shared core of the public containers
//!
//! `Dense` bundles a [`Storage`] handle, the [`Layout`] of the region a
//! container sees and the [`Dispatch`] policy routing its kernels. Vector,
//! Matrix and NDArray wrap one and add their shape discipline.
//!
//! Layout invariant: a `Dense` is either 1-D (any stride) or contiguous
//! (row-major, possibly offset). Its elements therefore always form one
//! strided run `(offset, len, inc)` that BLAS-shaped kernels can take
//! directly.

use std::fmt;

use num_traits::Zero;

use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::runtime::kernels::span;
use crate::runtime::{Dispatch, KernelOp, KernelPath};
use crate::tensor::{Layout, Storage};

pub(crate) struct Dense {
    storage: Storage,
    layout: Layout,
    dispatch: Dispatch,
}

impl Dense {
    pub(crate) fn new(storage: Storage, layout: Layout, dispatch: Dispatch) -> Self {
        debug_assert!(layout.ndim() <= 1 || layout.is_contiguous());
        Self {
            storage,
            layout,
            dispatch,
        }
    }

    /// Fresh contiguous container owning `storage`
    pub(crate) fn owned(storage: Storage, shape: &[usize], dispatch: Dispatch) -> Self {
        debug_assert_eq!(storage.len(), shape.iter().product::<usize>());
        Self::new(storage, Layout::contiguous(shape), dispatch)
    }

    pub(crate) fn from_f64(values: &[f64], shape: &[usize], dtype: DType) -> Self {
        Self::owned(
            Storage::from_f64_slice(values, dtype),
            shape,
            Dispatch::detected(),
        )
    }

    pub(crate) fn filled(shape: &[usize], value: f64, dtype: DType) -> Self {
        let count = shape.iter().product();
        Self::owned(
            Storage::filled(count, value, dtype),
            shape,
            Dispatch::detected(),
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub(crate) fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.layout.elem_count()
    }

    #[inline]
    pub(crate) fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    #[inline]
    pub(crate) fn dispatch(&self) -> Dispatch {
        self.dispatch
    }

    pub(crate) fn set_dispatch(&mut self, dispatch: Dispatch) {
        self.dispatch = dispatch;
    }

    /// The strided run `(offset, len, inc)` covering every element
    #[inline]
    fn run(&self) -> (usize, usize, usize) {
        let inc = if self.layout.ndim() == 1 {
            self.layout.strides()[0]
        } else {
            1
        };
        (self.layout.offset(), self.len(), inc)
    }

    // ========================================================================
    // Aliasing and copies
    // ========================================================================

    /// Another handle over the same region
    pub(crate) fn view(&self) -> Self {
        Self::new(self.storage.clone(), self.layout.clone(), self.dispatch)
    }

    /// Alias a sub-region of this container's buffer
    pub(crate) fn view_with(&self, layout: Layout) -> Self {
        Self::new(self.storage.clone(), layout, self.dispatch)
    }

    /// Exclusive contiguous copy of the visible region
    pub(crate) fn deep_copy(&self) -> Self {
        self.materialize(self.dtype(), self.shape())
    }

    /// Exclusive contiguous copy converted to `dtype`, laid out as `shape`
    pub(crate) fn materialize(&self, dtype: DType, shape: &[usize]) -> Self {
        let storage = dispatch_dtype!(dtype, T => { Storage::from_vec(self.gather::<T>()) });
        Self::owned(storage, shape, self.dispatch)
    }

    /// Elements in logical order, converted to `T`
    pub(crate) fn gather<T: Element>(&self) -> Vec<T> {
        if self.len() == 0 {
            return Vec::new();
        }
        dispatch_dtype!(self.dtype(), S => {
            let buf = self.storage.read();
            let data = S::slice(&buf);
            if S::DTYPE == T::DTYPE {
                let (offset, n, inc) = self.run();
                if inc == 1 {
                    return data[offset..offset + n]
                        .iter()
                        .map(|v| T::from_f64(v.as_f64()))
                        .collect();
                }
            }
            self.layout
                .offsets()
                .map(|o| T::from_f64(data[o].as_f64()))
                .collect()
        })
    }

    /// Elements in logical order, widened to f64
    pub(crate) fn to_vec(&self) -> Vec<f64> {
        self.portable_op(KernelOp::ToArray);
        self.gather::<f64>()
    }

    /// Replace the backing buffer with `storage`, laid out as `shape`
    ///
    /// Other aliases of the old buffer keep it; this container detaches.
    pub(crate) fn replace(&mut self, storage: Storage, shape: &[usize]) {
        self.storage = storage;
        self.layout = Layout::contiguous(shape);
    }

    // ========================================================================
    // Element access
    // ========================================================================

    #[inline]
    pub(crate) fn get_at(&self, offset: usize) -> f64 {
        self.storage.read().get_f64(offset)
    }

    #[inline]
    pub(crate) fn set_at(&self, offset: usize, value: f64) {
        self.storage.write().set_f64(offset, value);
    }

    // ========================================================================
    // Kernel plumbing
    // ========================================================================

    /// Run `f` over this container's strided run, read-only
    ///
    /// `T` must match `self.dtype()`.
    pub(crate) fn with_run<T: Element, R>(&self, f: impl FnOnce(&[T], usize, usize) -> R) -> R {
        let (offset, n, inc) = self.run();
        // An empty view may sit past the end of its buffer
        if n == 0 {
            return f(&[], 0, inc);
        }
        let buf = self.storage.read();
        let data = T::slice(&buf);
        f(&data[offset..offset + span(n, inc)], n, inc)
    }

    /// Run `f` over this container's strided run, mutably
    ///
    /// `T` must match `self.dtype()`.
    pub(crate) fn with_run_mut<T: Element, R>(
        &self,
        f: impl FnOnce(&mut [T], usize, usize) -> R,
    ) -> R {
        let (offset, n, inc) = self.run();
        if n == 0 {
            return f(&mut [], 0, inc);
        }
        let mut buf = self.storage.write();
        let data = T::slice_mut(&mut buf);
        f(&mut data[offset..offset + span(n, inc)], n, inc)
    }

    /// Present `other` to `f` as a `T` run that is safe to read while this
    /// container's buffer is locked
    ///
    /// A same-dtype operand over a different buffer is borrowed in place.
    /// Otherwise (dtype mismatch, or both sides sharing one buffer) the
    /// operand is copied out first.
    pub(crate) fn with_operand<T: Element, R>(
        &self,
        other: &Dense,
        f: impl FnOnce(&[T], usize) -> R,
    ) -> R {
        if other.dtype() == T::DTYPE && !self.storage.ptr_eq(&other.storage) {
            other.with_run::<T, R>(|x, _, inc| f(x, inc))
        } else {
            let copy = other.gather::<T>();
            f(&copy, 1)
        }
    }

    /// Ask the policy about an op that only has a portable implementation
    #[inline]
    pub(crate) fn portable_op(&self, op: KernelOp) {
        let path = self.dispatch.select(self.dtype(), op);
        debug_assert_eq!(path, KernelPath::Portable);
    }

    // ========================================================================
    // Operations shared by every container
    // ========================================================================

    /// `self += alpha * other`; shapes already validated
    pub(crate) fn axpy(&self, alpha: f64, other: &Dense) {
        dispatch_dtype!(self.dtype(), T => {
            let kernels = self.dispatch.kernels::<T>(KernelOp::Axpy);
            let alpha = T::from_f64(alpha);
            self.with_operand::<T, _>(other, |x, incx| {
                self.with_run_mut::<T, _>(|y, n, incy| kernels.axpy(n, alpha, x, incx, y, incy));
            });
        })
    }

    /// `self *= alpha`
    pub(crate) fn scal(&self, alpha: f64) {
        dispatch_dtype!(self.dtype(), T => {
            let kernels = self.dispatch.kernels::<T>(KernelOp::Scal);
            let alpha = T::from_f64(alpha);
            self.with_run_mut::<T, _>(|x, n, inc| kernels.scal(n, alpha, x, inc));
        })
    }

    /// Inner product with `other`; shapes already validated
    pub(crate) fn dot(&self, other: &Dense) -> f64 {
        dispatch_dtype!(self.dtype(), T => {
            let kernels = self.dispatch.kernels::<T>(KernelOp::Dot);
            self.with_operand::<T, _>(other, |y, incy| {
                self.with_run::<T, _>(|x, n, incx| kernels.dot(n, x, incx, y, incy).as_f64())
            })
        })
    }

    /// Euclidean norm
    pub(crate) fn nrm2(&self) -> f64 {
        dispatch_dtype!(self.dtype(), T => {
            let kernels = self.dispatch.kernels::<T>(KernelOp::Nrm2);
            self.with_run::<T, _>(|x, n, inc| kernels.nrm2(n, x, inc).as_f64())
        })
    }

    /// Logical index of the element with greatest magnitude
    pub(crate) fn iamax(&self) -> usize {
        dispatch_dtype!(self.dtype(), T => {
            let kernels = self.dispatch.kernels::<T>(KernelOp::Iamax);
            self.with_run::<T, _>(|x, n, inc| kernels.iamax(n, x, inc))
        })
    }

    /// Exact elementwise equality; shapes already validated
    pub(crate) fn equals(&self, other: &Dense) -> bool {
        self.portable_op(KernelOp::Equals);
        dispatch_dtype!(self.dtype(), T => {
            self.with_operand::<T, _>(other, |y, incy| {
                self.with_run::<T, _>(|x, n, incx| (0..n).all(|i| x[i * incx] == y[i * incy]))
            })
        })
    }

    /// `self[i] *= other[i]`; shapes already validated
    pub(crate) fn hadamard(&self, other: &Dense) {
        self.portable_op(KernelOp::Hadamard);
        dispatch_dtype!(self.dtype(), T => {
            self.with_operand::<T, _>(other, |y, incy| {
                self.with_run_mut::<T, _>(|x, n, incx| {
                    for i in 0..n {
                        let xi = &mut x[i * incx];
                        *xi = *xi * y[i * incy];
                    }
                });
            });
        })
    }

    /// Rewrite every element with `f`, index ascending
    ///
    /// `f` runs on a copy with no lock held, so it may read aliases; it sees
    /// the values from before the call.
    pub(crate) fn map(&self, mut f: impl FnMut(f64) -> f64) {
        self.portable_op(KernelOp::Map);
        dispatch_dtype!(self.dtype(), T => {
            let mapped: Vec<T> = self
                .gather::<T>()
                .into_iter()
                .map(|v| T::from_f64(f(v.as_f64())))
                .collect();
            self.with_run_mut::<T, _>(|x, _, inc| {
                for (i, v) in mapped.into_iter().enumerate() {
                    x[i * inc] = v;
                }
            });
        })
    }

    /// Visit every element with its logical index, index ascending
    ///
    /// Elements are copied out first so `f` may freely touch aliases.
    pub(crate) fn each(&self, mut f: impl FnMut(f64, usize)) {
        self.portable_op(KernelOp::Each);
        for (i, v) in self.to_vec().into_iter().enumerate() {
            f(v, i);
        }
    }

    pub(crate) fn sum(&self) -> f64 {
        self.portable_op(KernelOp::Sum);
        dispatch_dtype!(self.dtype(), T => {
            self.with_run::<T, _>(|x, n, inc| {
                (0..n).fold(T::zero(), |acc, i| acc + x[i * inc]).as_f64()
            })
        })
    }

    /// Smallest element, `None` when empty; NaN elements are skipped
    pub(crate) fn min(&self) -> Option<f64> {
        self.portable_op(KernelOp::Min);
        self.extreme(|candidate, best| candidate < best)
    }

    /// Largest element, `None` when empty; NaN elements are skipped
    pub(crate) fn max(&self) -> Option<f64> {
        self.portable_op(KernelOp::Max);
        self.extreme(|candidate, best| candidate > best)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<f64> {
        let values = self.to_vec();
        let first = *values.first()?;
        Some(values.into_iter().fold(first, |best, v| {
            if best.is_nan() || better(v, best) {
                v
            } else {
                best
            }
        }))
    }

    /// Bracketed, comma-separated rendering of the flat element sequence
    pub(crate) fn fmt_flat(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.portable_op(KernelOp::ToString);
        f.write_str("[")?;
        dispatch_dtype!(self.dtype(), T => {
            for (i, v) in self.gather::<T>().into_iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
        });
        f.write_str("]")
    }
}

impl fmt::Debug for Dense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dense")
            .field("dtype", &self.dtype())
            .field("layout", &self.layout)
            .field("aliases", &self.storage.ref_count())
            .finish()
    }
}
