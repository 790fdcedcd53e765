//! One-dimensional container

use std::fmt;

use super::dense::Dense;
use super::range::RangeSpec;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::{Dispatch, KernelOp};
use crate::tensor::{Layout, Storage};

/// A 1-D numeric sequence
///
/// Arithmetic methods mutate the receiver in place and return it for
/// chaining; [`crate::ops`] has the non-mutating forms.
///
/// A vector either owns its buffer or is a view into another container's
/// buffer ([`Vector::view`], [`Vector::slice`], [`Matrix::row`](super::Matrix::row),
/// [`Matrix::column`](super::Matrix::column)). Writes through a view are
/// visible in every alias. `Clone` always produces an independent copy.
///
/// ```
/// use densela::array::Vector;
/// use densela::dtype::DType;
///
/// let mut v = Vector::from_values(&[1.0, 2.0, 3.0], DType::F64);
/// v.add(&Vector::from_values(&[1.0, 1.0, 1.0], DType::F64))?.scale(2.0);
/// assert_eq!(v.to_vec(), vec![4.0, 6.0, 8.0]);
/// # Ok::<(), densela::error::Error>(())
/// ```
pub struct Vector {
    inner: Dense,
}

fn check_count(count: isize) -> Result<usize> {
    usize::try_from(count).map_err(|_| Error::InvalidSize { size: count })
}

impl Vector {
    pub(crate) fn from_dense(inner: Dense) -> Self {
        debug_assert_eq!(inner.layout().ndim(), 1);
        Self { inner }
    }

    pub(crate) fn dense(&self) -> &Dense {
        &self.inner
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Copy `values` into a new vector of `dtype`
    ///
    /// Non-finite values are stored as-is.
    pub fn from_values(values: &[f64], dtype: DType) -> Self {
        Self::from_dense(Dense::from_f64(values, &[values.len()], dtype))
    }

    /// Take ownership of typed data; the dtype follows `T`
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        let len = data.len();
        Self::from_dense(Dense::owned(
            Storage::from_vec(data),
            &[len],
            Dispatch::detected(),
        ))
    }

    /// `count` zeros; `InvalidSize` when `count < 0`
    pub fn zeros(count: isize, dtype: DType) -> Result<Self> {
        let len = check_count(count)?;
        Ok(Self::from_dense(Dense::filled(&[len], 0.0, dtype)))
    }

    /// `count` ones; `InvalidSize` when `count < 0`
    pub fn ones(count: isize, dtype: DType) -> Result<Self> {
        let len = check_count(count)?;
        Ok(Self::from_dense(Dense::filled(&[len], 1.0, dtype)))
    }

    /// Values from `start` toward `end` (exclusive) in steps of `|step|`
    ///
    /// See [`RangeSpec`] for the direction rule and the failure cases.
    pub fn range(start: f64, step: f64, end: f64, dtype: DType) -> Result<Self> {
        Ok(Self::from_range(&RangeSpec::new(start, step, end)?, dtype))
    }

    /// Materialize a validated range
    pub fn from_range(spec: &RangeSpec, dtype: DType) -> Self {
        Self::from_values(&spec.values(), dtype)
    }

    /// Route this vector's kernels through `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.inner.set_dispatch(dispatch);
        self
    }

    /// The dispatch policy this vector uses
    pub fn dispatch(&self) -> Dispatch {
        self.inner.dispatch()
    }

    // ========================================================================
    // Views and copies
    // ========================================================================

    /// Another vector over the same elements (aliases)
    pub fn view(&self) -> Self {
        Self::from_dense(self.inner.view())
    }

    /// View of elements `start..end` (aliases)
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        let len = self.len();
        if end > len {
            return Err(Error::out_of_bounds(end as isize, len));
        }
        if start > end {
            return Err(Error::invalid_argument(
                "start",
                format!("slice start {start} is past its end {end}"),
            ));
        }
        let layout = self.inner.layout();
        let stride = layout.strides()[0];
        Ok(Self::from_dense(self.inner.view_with(Layout::strided_1d(
            end - start,
            stride,
            layout.offset() + start * stride,
        ))))
    }

    /// Independent copy converted to `dtype`
    pub fn to_dtype(&self, dtype: DType) -> Self {
        Self::from_dense(self.inner.materialize(dtype, &[self.len()]))
    }

    /// The backing storage handle
    pub fn storage(&self) -> &Storage {
        self.inner.storage()
    }

    /// Returns true if `self` and `other` share a buffer
    pub fn shares_storage(&self, other: &Vector) -> bool {
        self.inner.storage().ptr_eq(other.inner.storage())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the vector has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype()
    }

    fn offset_of(&self, index: isize) -> Result<usize> {
        let len = self.len();
        match usize::try_from(index) {
            Ok(i) if i < len => {
                let layout = self.inner.layout();
                Ok(layout.offset() + i * layout.strides()[0])
            }
            _ => Err(Error::out_of_bounds(index, len)),
        }
    }

    /// Element at `index`; `IndexOutOfBounds` outside `[0, len)`
    pub fn get(&self, index: isize) -> Result<f64> {
        let offset = self.offset_of(index)?;
        Ok(self.inner.get_at(offset))
    }

    /// Overwrite the element at `index`; `IndexOutOfBounds` outside `[0, len)`
    pub fn set(&mut self, index: isize, value: f64) -> Result<&mut Self> {
        let offset = self.offset_of(index)?;
        self.inner.set_at(offset, value);
        Ok(self)
    }

    /// Elements in order, widened to f64
    pub fn to_vec(&self) -> Vec<f64> {
        self.inner.to_vec()
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    fn check_same_len(&self, other: &Vector) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::shape_mismatch(&[self.len()], &[other.len()]));
        }
        Ok(())
    }

    /// `self += other`
    pub fn add(&mut self, other: &Vector) -> Result<&mut Self> {
        self.check_same_len(other)?;
        if !self.is_empty() {
            self.inner.axpy(1.0, &other.inner);
        }
        Ok(self)
    }

    /// `self -= other`
    pub fn subtract(&mut self, other: &Vector) -> Result<&mut Self> {
        self.check_same_len(other)?;
        if !self.is_empty() {
            self.inner.axpy(-1.0, &other.inner);
        }
        Ok(self)
    }

    /// `self *= scalar`
    pub fn scale(&mut self, scalar: f64) -> &mut Self {
        self.inner.scal(scalar);
        self
    }

    /// Scale to unit length
    ///
    /// A zero vector divides by zero and ends up full of NaN; check
    /// [`magnitude`](Self::magnitude) first if that matters.
    pub fn normalize(&mut self) -> &mut Self {
        let magnitude = self.magnitude();
        self.scale(1.0 / magnitude)
    }

    /// `self[i] *= other[i]`
    pub fn hadamard(&mut self, other: &Vector) -> Result<&mut Self> {
        self.check_same_len(other)?;
        self.inner.hadamard(&other.inner);
        Ok(self)
    }

    /// Inner product
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_same_len(other)?;
        Ok(self.inner.dot(&other.inner))
    }

    /// Euclidean norm; 0 for an empty vector
    pub fn magnitude(&self) -> f64 {
        self.inner.nrm2()
    }

    /// Projection of `self` onto `onto`
    ///
    /// Returns a new vector `onto * (self·onto / onto·onto)`; neither operand
    /// is modified.
    pub fn project(&self, onto: &Vector) -> Result<Vector> {
        let numerator = self.dot(onto)?;
        let denominator = onto.dot(onto)?;
        let mut projected = onto.clone();
        projected.scale(numerator / denominator);
        Ok(projected)
    }

    /// Angle to `other` in radians: `acos(self·other / (‖self‖‖other‖))`
    pub fn angle(&self, other: &Vector) -> Result<f64> {
        let dot = self.dot(other)?;
        Ok((dot / (self.magnitude() * other.magnitude())).acos())
    }

    /// Exact elementwise equality; false when lengths differ
    pub fn equals(&self, other: &Vector) -> bool {
        self.len() == other.len() && self.inner.equals(&other.inner)
    }

    /// Sum of elements
    pub fn sum(&self) -> f64 {
        self.inner.sum()
    }

    /// Smallest element, `None` when empty
    pub fn min(&self) -> Option<f64> {
        self.inner.min()
    }

    /// Largest element, `None` when empty
    pub fn max(&self) -> Option<f64> {
        self.inner.max()
    }

    /// Element with the greatest magnitude (sign kept), `None` when empty
    ///
    /// Ties go to the lowest index.
    pub fn max_magnitude(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let index = self.inner.iamax();
        self.get(index as isize).ok()
    }

    /// Index of the element with the greatest magnitude, `None` when empty
    pub fn max_magnitude_index(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.inner.iamax())
    }

    // ========================================================================
    // Structural
    // ========================================================================

    /// Append `other`, reallocating
    ///
    /// The receiver moves onto a new buffer of `len + other.len()` elements;
    /// if it was a view, it detaches from the buffer it used to alias.
    pub fn combine(&mut self, other: &Vector) -> &mut Self {
        self.inner.portable_op(KernelOp::Combine);
        let len = self.len() + other.len();
        let storage = crate::dispatch_dtype!(self.dtype(), T => {
            let mut data = self.inner.gather::<T>();
            data.extend(other.inner.gather::<T>());
            Storage::from_vec(data)
        });
        self.inner.replace(storage, &[len]);
        self
    }

    /// Append one element, reallocating
    pub fn push(&mut self, value: f64) -> &mut Self {
        self.inner.portable_op(KernelOp::Push);
        self.combine(&Vector::from_values(&[value], self.dtype()))
    }

    /// Replace every element `x` with `f(x)`, index ascending
    pub fn map(&mut self, f: impl FnMut(f64) -> f64) -> &mut Self {
        self.inner.map(f);
        self
    }

    /// Call `f(x, i)` for every element, index ascending
    pub fn each(&self, f: impl FnMut(f64, usize)) -> &Self {
        self.inner.each(f);
        self
    }
}

impl Clone for Vector {
    fn clone(&self) -> Self {
        Self::from_dense(self.inner.deep_copy())
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_flat(f)
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("dtype", &self.dtype())
            .field("values", &self.to_vec())
            .finish()
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
