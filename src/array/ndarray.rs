//! N-dimensional container

use std::fmt;

use super::dense::Dense;
use super::matrix::Matrix;
use super::vector::Vector;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::{Dispatch, KernelOp};
use crate::tensor::{Layout, Storage};

/// A dense N-dimensional array with a fully resolved, row-major shape
///
/// The product of the axis sizes always equals the element count.
/// [`subarray`](Self::subarray) and [`reshape`](Self::reshape) return views
/// that alias this array's buffer.
///
/// ```
/// use densela::array::NDArray;
/// use densela::dtype::DType;
///
/// let a = NDArray::from_shape_values(&[2, 2, 2], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], DType::F64)?;
/// assert_eq!(a.get(&[1, 0, 1])?, 5.0);
/// assert_eq!(a.subarray(1)?.to_vec(), vec![4.0, 5.0, 6.0, 7.0]);
/// # Ok::<(), densela::error::Error>(())
/// ```
pub struct NDArray {
    inner: Dense,
}

impl NDArray {
    fn from_dense(inner: Dense) -> Self {
        debug_assert!(inner.layout().is_contiguous());
        Self { inner }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Copy row-major `values` into a new array of `shape`
    ///
    /// `InvalidArgument` when the value count is not the product of `shape`.
    pub fn from_shape_values(shape: &[usize], values: &[f64], dtype: DType) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(Error::invalid_argument(
                "values",
                format!(
                    "{} values do not fill shape {:?} ({expected} elements)",
                    values.len(),
                    shape
                ),
            ));
        }
        Ok(Self::from_dense(Dense::from_f64(values, shape, dtype)))
    }

    /// Take ownership of typed row-major data; the dtype follows `T`
    pub fn from_shape_vec<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::invalid_argument(
                "data",
                format!("{} values do not fill shape {:?}", data.len(), shape),
            ));
        }
        Ok(Self::from_dense(Dense::owned(
            Storage::from_vec(data),
            shape,
            Dispatch::detected(),
        )))
    }

    /// Zeros of `shape`
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        Self::from_dense(Dense::filled(shape, 0.0, dtype))
    }

    /// Ones of `shape`
    pub fn ones(shape: &[usize], dtype: DType) -> Self {
        Self::from_dense(Dense::filled(shape, 1.0, dtype))
    }

    /// 1-D array over a vector's elements
    ///
    /// Aliases when the vector is unit-stride, copies otherwise.
    pub fn from_vector(v: &Vector) -> Self {
        let dense = v.dense();
        if dense.layout().is_contiguous() {
            Self::from_dense(dense.view())
        } else {
            Self::from_dense(dense.deep_copy())
        }
    }

    /// 2-D array over a matrix's elements (aliases)
    pub fn from_matrix(m: &Matrix) -> Self {
        Self::from_dense(m.dense().view())
    }

    /// Route this array's kernels through `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.inner.set_dispatch(dispatch);
        self
    }

    /// The dispatch policy this array uses
    pub fn dispatch(&self) -> Dispatch {
        self.inner.dispatch()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Axis sizes
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.inner.shape()
    }

    /// Number of axes
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total element count
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if any axis has size zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype()
    }

    /// The backing storage handle
    pub fn storage(&self) -> &Storage {
        self.inner.storage()
    }

    fn offset_of(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.ndim() {
            return Err(Error::invalid_argument(
                "indices",
                format!("expected {} indices, got {}", self.ndim(), indices.len()),
            ));
        }
        if let Some((&index, &size)) = indices
            .iter()
            .zip(self.shape())
            .find(|&(&index, &size)| index >= size)
        {
            return Err(Error::out_of_bounds(index as isize, size));
        }
        self.inner
            .layout()
            .index(indices)
            .ok_or_else(|| Error::shape_mismatch(self.shape(), indices))
    }

    /// Element at `indices`
    pub fn get(&self, indices: &[usize]) -> Result<f64> {
        let offset = self.offset_of(indices)?;
        Ok(self.inner.get_at(offset))
    }

    /// Overwrite the element at `indices`
    pub fn set(&mut self, indices: &[usize], value: f64) -> Result<&mut Self> {
        let offset = self.offset_of(indices)?;
        self.inner.set_at(offset, value);
        Ok(self)
    }

    /// Elements in row-major order, widened to f64
    pub fn to_vec(&self) -> Vec<f64> {
        self.inner.to_vec()
    }

    // ========================================================================
    // Views, reshapes and conversions
    // ========================================================================

    /// Another array over the same elements (aliases)
    pub fn view(&self) -> Self {
        Self::from_dense(self.inner.view())
    }

    /// The `i`-th sub-array along axis 0 (aliases)
    pub fn subarray(&self, i: usize) -> Result<Self> {
        let axis0 = self.shape().first().copied().unwrap_or(0);
        match self.inner.layout().select_first(i) {
            Some(layout) => Ok(Self::from_dense(self.inner.view_with(layout))),
            None => Err(Error::out_of_bounds(i as isize, axis0)),
        }
    }

    /// The same elements under `shape`
    ///
    /// Returns an aliasing view; `ShapeMismatch` when the element counts
    /// differ.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        self.inner.portable_op(KernelOp::Reshape);
        match self.inner.layout().reshape(shape) {
            Some(layout) => Ok(Self::from_dense(self.inner.view_with(layout))),
            None => {
                let count: usize = shape.iter().product();
                if count == self.len() {
                    Ok(Self::from_dense(self.inner.materialize(self.dtype(), shape)))
                } else {
                    Err(Error::shape_mismatch(self.shape(), shape))
                }
            }
        }
    }

    /// Flatten into a vector view
    pub fn to_vector(&self) -> Vector {
        let layout = Layout::strided_1d(self.len(), 1, self.inner.layout().offset());
        Vector::from_dense(self.inner.view_with(layout))
    }

    /// View a 2-D array as a matrix; `ShapeMismatch` for any other rank
    pub fn to_matrix(&self) -> Result<Matrix> {
        if self.ndim() != 2 {
            return Err(Error::ShapeMismatch {
                expected: vec![self.len(), 1],
                got: self.shape().to_vec(),
            });
        }
        Ok(Matrix::from_dense(self.inner.view()))
    }

    /// Independent copy converted to `dtype`
    pub fn to_dtype(&self, dtype: DType) -> Self {
        Self::from_dense(self.inner.materialize(dtype, self.shape()))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    fn check_same_shape(&self, other: &NDArray) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(self.shape(), other.shape()));
        }
        Ok(())
    }

    /// `self += other`
    pub fn add(&mut self, other: &NDArray) -> Result<&mut Self> {
        self.check_same_shape(other)?;
        if !self.is_empty() {
            self.inner.axpy(1.0, &other.inner);
        }
        Ok(self)
    }

    /// `self -= other`
    pub fn subtract(&mut self, other: &NDArray) -> Result<&mut Self> {
        self.check_same_shape(other)?;
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

    /// Elementwise product in place
    pub fn hadamard(&mut self, other: &NDArray) -> Result<&mut Self> {
        self.check_same_shape(other)?;
        self.inner.hadamard(&other.inner);
        Ok(self)
    }

    /// Sum of elementwise products over every axis
    pub fn dot(&self, other: &NDArray) -> Result<f64> {
        self.check_same_shape(other)?;
        Ok(self.inner.dot(&other.inner))
    }

    /// Euclidean norm of the flattened elements
    pub fn norm(&self) -> f64 {
        self.inner.nrm2()
    }

    /// Sum of elements
    pub fn sum(&self) -> f64 {
        self.inner.sum()
    }

    /// Exact elementwise equality; false when shapes differ
    pub fn equals(&self, other: &NDArray) -> bool {
        self.shape() == other.shape() && self.inner.equals(&other.inner)
    }

    /// Replace every element `x` with `f(x)`, row-major order
    pub fn map(&mut self, f: impl FnMut(f64) -> f64) -> &mut Self {
        self.inner.map(f);
        self
    }

    /// Call `f(x, i)` for every element with its row-major index
    pub fn each(&self, f: impl FnMut(f64, usize)) -> &Self {
        self.inner.each(f);
        self
    }
}

impl Clone for NDArray {
    fn clone(&self) -> Self {
        Self::from_dense(self.inner.deep_copy())
    }
}

impl fmt::Display for NDArray {
    /// Flat row-major rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_flat(f)
    }
}

impl fmt::Debug for NDArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NDArray")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("values", &self.to_vec())
            .finish()
    }
}

impl PartialEq for NDArray {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
