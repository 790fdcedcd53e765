//! LU decomposition with partial pivoting

use std::cmp::Ordering;

use crate::array::{Matrix, Vector};
use crate::dispatch_dtype;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::{Dispatch, KernelOp};

/// `P·A = L·U` for a square matrix `A`
///
/// `L` is unit lower triangular and `U` upper triangular; both are packed in
/// one matrix (the unit diagonal of `L` is implicit). Row `k` was swapped
/// with row `pivots()[k]` at elimination step `k`.
#[derive(Clone, Debug)]
pub struct LuDecomposition {
    lu: Matrix,
    pivots: Vec<usize>,
    num_swaps: usize,
}

/// Factor `a` with partial pivoting (Doolittle)
///
/// ```text
/// for k in 0..n:
///   p = argmax |A[k.., k]|              (iamax)
///   swap rows k and p
///   for i in k+1..n:
///     A[i, k] /= A[k, k]
///     A[i, k+1..] -= A[i, k] * A[k, k+1..]   (axpy)
/// ```
///
/// Fails with `ShapeMismatch` for a non-square input and `Singular` when a
/// pivot is exactly zero. Pivot search and row updates run through the
/// matrix's dispatch policy.
pub fn lu(a: &Matrix) -> Result<LuDecomposition> {
    let (rows, cols) = a.shape();
    if rows != cols {
        return Err(Error::shape_mismatch(&[rows, rows], &[rows, cols]));
    }
    dispatch_dtype!(a.dtype(), T => { lu_typed::<T>(a, rows) })
}

fn lu_typed<T: Element>(a: &Matrix, n: usize) -> Result<LuDecomposition> {
    let dispatch = a.dispatch();
    let iamax = dispatch.kernels::<T>(KernelOp::Iamax);
    let axpy = dispatch.kernels::<T>(KernelOp::Axpy);

    let mut lu: Vec<T> = a.dense().gather::<T>();
    let mut pivots = vec![0usize; n];
    let mut num_swaps = 0usize;

    for k in 0..n {
        let pivot_row = k + iamax.iamax(n - k, &lu[k * n + k..], n);
        pivots[k] = pivot_row;
        if pivot_row != k {
            for j in 0..n {
                lu.swap(k * n + j, pivot_row * n + j);
            }
            num_swaps += 1;
        }

        let pivot = lu[k * n + k];
        if pivot == T::zero() {
            return Err(Error::Singular { column: k });
        }

        let tail = n - k - 1;
        for i in (k + 1)..n {
            let (upper, lower) = lu.split_at_mut(i * n);
            let multiplier = lower[k] / pivot;
            lower[k] = multiplier;
            let pivot_tail = &upper[k * n + k + 1..k * n + n];
            axpy.axpy(tail, -multiplier, pivot_tail, 1, &mut lower[k + 1..n], 1);
        }
    }

    log::debug!("lu: {n}x{n} {} with {num_swaps} row swaps", T::DTYPE);
    Ok(LuDecomposition {
        lu: Matrix::from_vec(n, n, lu)?.with_dispatch(dispatch),
        pivots,
        num_swaps,
    })
}

impl LuDecomposition {
    /// Order of the factored matrix
    pub fn order(&self) -> usize {
        self.lu.rows()
    }

    /// Element type of the factors
    pub fn dtype(&self) -> DType {
        self.lu.dtype()
    }

    /// Packed `L` (below the diagonal) and `U` (on and above it)
    pub fn lu(&self) -> &Matrix {
        &self.lu
    }

    /// Row swapped with row `k` at step `k`
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Number of row swaps performed
    pub fn num_swaps(&self) -> usize {
        self.num_swaps
    }

    fn dispatch(&self) -> Dispatch {
        self.lu.dispatch()
    }

    /// Packed factors with `pick(value, row, col)` applied elementwise
    fn unpack(&self, pick: impl Fn(f64, usize, usize) -> f64) -> Matrix {
        let n = self.order();
        let values: Vec<f64> = self
            .lu
            .to_vec()
            .into_iter()
            .enumerate()
            .map(|(i, v)| pick(v, i / n, i % n))
            .collect();
        Matrix::assemble(n, n, &values, self.dtype(), self.dispatch())
    }

    /// Unit lower triangular factor
    pub fn l(&self) -> Matrix {
        self.unpack(|v, r, c| match r.cmp(&c) {
            Ordering::Greater => v,
            Ordering::Equal => 1.0,
            Ordering::Less => 0.0,
        })
    }

    /// Upper triangular factor
    pub fn u(&self) -> Matrix {
        self.unpack(|v, r, c| if r <= c { v } else { 0.0 })
    }

    /// Permutation matrix `P` with `P·A = L·U`
    pub fn permutation(&self) -> Matrix {
        let n = self.order();
        let mut perm: Vec<usize> = (0..n).collect();
        for (k, &p) in self.pivots.iter().enumerate() {
            perm.swap(k, p);
        }
        let mut values = vec![0.0; n * n];
        for (i, &src) in perm.iter().enumerate() {
            values[i * n + src] = 1.0;
        }
        Matrix::assemble(n, n, &values, self.dtype(), self.dispatch())
    }

    /// `det(A)`: product of `U`'s diagonal, sign flipped per row swap
    pub fn determinant(&self) -> f64 {
        let n = self.order();
        let values = self.lu.to_vec();
        let sign = if self.num_swaps % 2 == 0 { 1.0 } else { -1.0 };
        (0..n).fold(sign, |det, i| det * values[i * n + i])
    }

    /// Solve `A·x = b`
    ///
    /// `ShapeMismatch` when `b.len()` differs from the order. The result
    /// takes the factors' dtype.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        let n = self.order();
        if b.len() != n {
            return Err(Error::shape_mismatch(&[n], &[b.len()]));
        }
        let x = dispatch_dtype!(self.dtype(), T => {
            Vector::from_vec(self.solve_typed::<T>(b.dense().gather::<T>()))
        });
        Ok(x.with_dispatch(self.dispatch()))
    }

    fn solve_typed<T: Element>(&self, mut x: Vec<T>) -> Vec<T> {
        let n = self.order();
        let dot = self.dispatch().kernels::<T>(KernelOp::Dot);

        for (k, &p) in self.pivots.iter().enumerate() {
            x.swap(k, p);
        }

        self.lu.dense().with_run::<T, _>(|lu, _, _| {
            // L·y = P·b (unit diagonal)
            for i in 1..n {
                let s = dot.dot(i, &lu[i * n..], 1, &x, 1);
                x[i] = x[i] - s;
            }
            // U·x = y
            for i in (0..n).rev() {
                let tail = n - i - 1;
                let s = dot.dot(tail, &lu[i * n + i + 1..], 1, &x[i + 1..], 1);
                x[i] = (x[i] - s) / lu[i * n + i];
            }
        });
        x
    }

    /// `A⁻¹`, one solve per column of the identity
    pub fn inverse(&self) -> Result<Matrix> {
        let n = self.order();
        let mut values = vec![0.0; n * n];
        let mut e = vec![0.0; n];
        for j in 0..n {
            e[j] = 1.0;
            let col = self.solve(&Vector::from_values(&e, self.dtype()))?;
            for (i, v) in col.to_vec().into_iter().enumerate() {
                values[i * n + j] = v;
            }
            e[j] = 0.0;
        }
        Ok(Matrix::assemble(n, n, &values, self.dtype(), self.dispatch()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, values: &[f64]) -> Matrix {
        Matrix::from_values(rows, cols, values, DType::F64).unwrap()
    }

    #[test]
    fn test_pivoting_picks_largest() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let f = lu(&a).unwrap();
        assert_eq!(f.pivots(), &[1, 1]);
        assert_eq!(f.num_swaps(), 1);
        assert!((f.determinant() - (-2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_singular() {
        let a = m(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(lu(&a).unwrap_err(), Error::Singular { column: 1 });
    }

    #[test]
    fn test_non_square() {
        let a = m(2, 3, &[0.0; 6]);
        assert!(matches!(lu(&a), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_factors_reassemble() {
        let a = m(3, 3, &[2.0, 1.0, 1.0, 4.0, -6.0, 0.0, -2.0, 7.0, 2.0]);
        let f = lu(&a).unwrap();
        let pa = f.permutation().matmul(&a).unwrap();
        let lu_prod = f.l().matmul(&f.u()).unwrap();
        for (x, y) in pa.to_vec().iter().zip(lu_prod.to_vec()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
