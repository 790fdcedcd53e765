//! Two-dimensional row-major container

use std::fmt;

use super::dense::Dense;
use super::vector::Vector;
use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::{Dispatch, KernelOp};
use crate::tensor::{Layout, Storage};

/// A dense `rows × cols` matrix, row-major
///
/// Element `(r, c)` lives at `r * cols + c` of the visible region.
/// [`row`](Self::row) and [`column`](Self::column) hand out vector views
/// that write through to the matrix.
///
/// ```
/// use densela::array::Matrix;
/// use densela::dtype::DType;
///
/// let a = Matrix::from_values(2, 2, &[1.0, 2.0, 3.0, 4.0], DType::F64)?;
/// let b = Matrix::identity(2, DType::F64);
/// assert!(a.matmul(&b)?.equals(&a));
/// # Ok::<(), densela::error::Error>(())
/// ```
pub struct Matrix {
    inner: Dense,
}

impl Matrix {
    pub(crate) fn from_dense(inner: Dense) -> Self {
        debug_assert_eq!(inner.layout().ndim(), 2);
        debug_assert!(inner.layout().is_contiguous());
        Self { inner }
    }

    pub(crate) fn dense(&self) -> &Dense {
        &self.inner
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Copy row-major `values` into a new `rows × cols` matrix
    ///
    /// `InvalidArgument` when `values.len() != rows * cols`.
    pub fn from_values(rows: usize, cols: usize, values: &[f64], dtype: DType) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(Error::invalid_argument(
                "values",
                format!(
                    "{} values cannot fill a {rows}x{cols} matrix",
                    values.len()
                ),
            ));
        }
        Ok(Self::from_dense(Dense::from_f64(values, &[rows, cols], dtype)))
    }

    /// Take ownership of typed row-major data; the dtype follows `T`
    pub fn from_vec<T: Element>(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::invalid_argument(
                "data",
                format!("{} values cannot fill a {rows}x{cols} matrix", data.len()),
            ));
        }
        Ok(Self::from_dense(Dense::owned(
            Storage::from_vec(data),
            &[rows, cols],
            Dispatch::detected(),
        )))
    }

    /// Stack equal-length rows
    ///
    /// `ShapeMismatch` when a row's length differs from the first row's.
    pub fn from_rows(rows: &[&[f64]], dtype: DType) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut values = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(Error::shape_mismatch(&[cols], &[row.len()]));
            }
            values.extend_from_slice(row);
        }
        Self::from_values(rows.len(), cols, &values, dtype)
    }

    /// `rows × cols` zeros
    pub fn zeros(rows: usize, cols: usize, dtype: DType) -> Self {
        Self::from_dense(Dense::filled(&[rows, cols], 0.0, dtype))
    }

    /// `rows × cols` ones
    pub fn ones(rows: usize, cols: usize, dtype: DType) -> Self {
        Self::from_dense(Dense::filled(&[rows, cols], 1.0, dtype))
    }

    /// `n × n` identity
    pub fn identity(n: usize, dtype: DType) -> Self {
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
        }
        Self::from_dense(Dense::from_f64(&values, &[n, n], dtype))
    }

    /// Build from values whose count is already known to be `rows * cols`
    pub(crate) fn assemble(
        rows: usize,
        cols: usize,
        values: &[f64],
        dtype: DType,
        dispatch: Dispatch,
    ) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self::from_dense(Dense::from_f64(values, &[rows, cols], dtype)).with_dispatch(dispatch)
    }

    /// Route this matrix's kernels through `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.inner.set_dispatch(dispatch);
        self
    }

    /// The dispatch policy this matrix uses
    pub fn dispatch(&self) -> Dispatch {
        self.inner.dispatch()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.inner.shape()[0]
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.inner.shape()[1]
    }

    /// `(rows, cols)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Total element count
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if either dimension is zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `rows == cols`
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
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

    fn offset_of(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows() {
            return Err(Error::out_of_bounds(row as isize, self.rows()));
        }
        if col >= self.cols() {
            return Err(Error::out_of_bounds(col as isize, self.cols()));
        }
        Ok(self.inner.layout().offset() + row * self.cols() + col)
    }

    /// Element at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let offset = self.offset_of(row, col)?;
        Ok(self.inner.get_at(offset))
    }

    /// Overwrite the element at `(row, col)`
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<&mut Self> {
        let offset = self.offset_of(row, col)?;
        self.inner.set_at(offset, value);
        Ok(self)
    }

    /// Elements in row-major order, widened to f64
    pub fn to_vec(&self) -> Vec<f64> {
        self.inner.to_vec()
    }

    // ========================================================================
    // Views and copies
    // ========================================================================

    /// Another matrix over the same elements (aliases)
    pub fn view(&self) -> Self {
        Self::from_dense(self.inner.view())
    }

    /// Row `r` as a vector view
    pub fn row(&self, r: usize) -> Result<Vector> {
        if r >= self.rows() {
            return Err(Error::out_of_bounds(r as isize, self.rows()));
        }
        let offset = self.inner.layout().offset() + r * self.cols();
        let layout = Layout::strided_1d(self.cols(), 1, offset);
        Ok(Vector::from_dense(self.inner.view_with(layout)))
    }

    /// Column `c` as a strided vector view
    pub fn column(&self, c: usize) -> Result<Vector> {
        if c >= self.cols() {
            return Err(Error::out_of_bounds(c as isize, self.cols()));
        }
        let offset = self.inner.layout().offset() + c;
        let layout = Layout::strided_1d(self.rows(), self.cols(), offset);
        Ok(Vector::from_dense(self.inner.view_with(layout)))
    }

    /// Independent copy converted to `dtype`
    pub fn to_dtype(&self, dtype: DType) -> Self {
        Self::from_dense(self.inner.materialize(dtype, &[self.rows(), self.cols()]))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    fn check_same_shape(&self, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(self.inner.shape(), other.inner.shape()));
        }
        Ok(())
    }

    /// `self += other`
    pub fn add(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.check_same_shape(other)?;
        if !self.is_empty() {
            self.inner.axpy(1.0, &other.inner);
        }
        Ok(self)
    }

    /// `self -= other`
    pub fn subtract(&mut self, other: &Matrix) -> Result<&mut Self> {
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
    pub fn hadamard(&mut self, other: &Matrix) -> Result<&mut Self> {
        self.check_same_shape(other)?;
        self.inner.hadamard(&other.inner);
        Ok(self)
    }

    /// Exact elementwise equality; false when shapes differ
    pub fn equals(&self, other: &Matrix) -> bool {
        self.shape() == other.shape() && self.inner.equals(&other.inner)
    }

    /// Frobenius norm (`sqrt` of the sum of squared elements)
    pub fn frobenius_norm(&self) -> f64 {
        self.inner.nrm2()
    }

    /// Sum of elements
    pub fn sum(&self) -> f64 {
        self.inner.sum()
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

    // ========================================================================
    // Products
    // ========================================================================

    /// Matrix product `self · other`, newly allocated
    ///
    /// `ShapeMismatch` unless `self.cols() == other.rows()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        let (m, k) = self.shape();
        let (k2, n) = other.shape();
        if k != k2 {
            return Err(Error::shape_mismatch(&[k], &[k2]));
        }
        let storage = dispatch_dtype!(self.dtype(), T => {
            let kernels = self.inner.dispatch().kernels::<T>(KernelOp::Gemm);
            let mut c = vec![T::from_f64(0.0); m * n];
            self.inner.with_operand::<T, _>(&other.inner, |b, _| {
                self.inner.with_run::<T, _>(|a, _, _| {
                    kernels.gemm(
                        m,
                        n,
                        k,
                        T::from_f64(1.0),
                        a,
                        k,
                        b,
                        n,
                        T::from_f64(0.0),
                        &mut c,
                        n,
                    )
                })
            });
            Storage::from_vec(c)
        });
        Ok(Self::from_dense(Dense::owned(
            storage,
            &[m, n],
            self.inner.dispatch(),
        )))
    }

    /// Matrix-vector product `self · v`, newly allocated
    ///
    /// `ShapeMismatch` unless `v.len() == self.cols()`.
    pub fn matvec(&self, v: &Vector) -> Result<Vector> {
        let (m, n) = self.shape();
        if v.len() != n {
            return Err(Error::shape_mismatch(&[n], &[v.len()]));
        }
        let storage = dispatch_dtype!(self.dtype(), T => {
            let kernels = self.inner.dispatch().kernels::<T>(KernelOp::Gemv);
            let mut y = vec![T::from_f64(0.0); m];
            self.inner.with_operand::<T, _>(v.dense(), |x, incx| {
                self.inner.with_run::<T, _>(|a, _, _| {
                    kernels.gemv(
                        m,
                        n,
                        T::from_f64(1.0),
                        a,
                        n,
                        x,
                        incx,
                        T::from_f64(0.0),
                        &mut y,
                        1,
                    )
                })
            });
            Storage::from_vec(y)
        });
        Ok(Vector::from_dense(Dense::owned(
            storage,
            &[m],
            self.inner.dispatch(),
        )))
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix {
        self.inner.portable_op(KernelOp::Transpose);
        let (m, n) = self.shape();
        let storage = dispatch_dtype!(self.dtype(), T => {
            let src = self.inner.gather::<T>();
            let mut out = vec![T::from_f64(0.0); m * n];
            for r in 0..m {
                for c in 0..n {
                    out[c * m + r] = src[r * n + c];
                }
            }
            Storage::from_vec(out)
        });
        Self::from_dense(Dense::owned(storage, &[n, m], self.inner.dispatch()))
    }
}

impl Clone for Matrix {
    fn clone(&self) -> Self {
        Self::from_dense(self.inner.deep_copy())
    }
}

impl fmt::Display for Matrix {
    /// One bracketed row per line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for r in 0..self.rows() {
            if r > 0 {
                f.write_str(",\n ")?;
            }
            match self.row(r) {
                Ok(row) => write!(f, "{row}")?,
                Err(_) => return Err(fmt::Error),
            }
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .field("values", &self.to_vec())
            .finish()
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, values: &[f64]) -> Matrix {
        Matrix::from_values(rows, cols, values, DType::F64).unwrap()
    }

    #[test]
    fn test_row_view_writes_through() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut row = a.row(1).unwrap();
        row.scale(2.0);
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn test_column_view() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut col = a.column(2).unwrap();
        assert_eq!(col.to_vec(), vec![3.0, 6.0]);
        col.set(0, -1.0).unwrap();
        assert_eq!(a.get(0, 2).unwrap(), -1.0);
        assert!(a.column(3).is_err());
    }

    #[test]
    fn test_matmul_self_alias() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let sq = a.matmul(&a.view()).unwrap();
        assert_eq!(sq.to_vec(), vec![7.0, 10.0, 15.0, 22.0]);
    }

    #[test]
    fn test_matvec_with_column_operand() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let col = a.column(0).unwrap();
        assert_eq!(a.matvec(&col).unwrap().to_vec(), vec![7.0, 15.0]);
    }

    #[test]
    fn test_transpose() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_display() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.to_string(), "[[1, 2],\n [3, 4]]");
    }
}
