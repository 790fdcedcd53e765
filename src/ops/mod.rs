//! Non-mutating operations
//!
//! Container methods mutate their receiver. The functions here copy their
//! first argument (a deep copy, never a view) and run the same method on the
//! copy, so every input is left untouched:
//!
//! ```text
//! ops::add(&a, &b)  ==  { let mut out = a.clone(); out.add(&b)?; out }
//! ```
//!
//! Elementwise functions accept any container through [`Elementwise`];
//! the rest are specific to [`Vector`] or [`Matrix`].

use crate::array::{Matrix, NDArray, Vector};
use crate::error::Result;

/// In-place elementwise operations shared by every container
pub trait Elementwise: Clone {
    /// `self += other`
    fn add_assign(&mut self, other: &Self) -> Result<()>;
    /// `self -= other`
    fn subtract_assign(&mut self, other: &Self) -> Result<()>;
    /// `self *= scalar`
    fn scale_assign(&mut self, scalar: f64);
    /// `self[i] *= other[i]`
    fn hadamard_assign(&mut self, other: &Self) -> Result<()>;
    /// Rewrite every element with `f`
    fn map_assign(&mut self, f: &mut dyn FnMut(f64) -> f64);
    /// Exact structural equality
    fn equals(&self, other: &Self) -> bool;
}

macro_rules! impl_elementwise {
    ($($ty:ty),*) => {
        $(
            impl Elementwise for $ty {
                fn add_assign(&mut self, other: &Self) -> Result<()> {
                    <$ty>::add(self, other).map(|_| ())
                }

                fn subtract_assign(&mut self, other: &Self) -> Result<()> {
                    <$ty>::subtract(self, other).map(|_| ())
                }

                fn scale_assign(&mut self, scalar: f64) {
                    <$ty>::scale(self, scalar);
                }

                fn hadamard_assign(&mut self, other: &Self) -> Result<()> {
                    <$ty>::hadamard(self, other).map(|_| ())
                }

                fn map_assign(&mut self, f: &mut dyn FnMut(f64) -> f64) {
                    <$ty>::map(self, f);
                }

                fn equals(&self, other: &Self) -> bool {
                    <$ty>::equals(self, other)
                }
            }
        )*
    };
}

impl_elementwise!(Vector, Matrix, NDArray);

/// `a + b`
pub fn add<C: Elementwise>(a: &C, b: &C) -> Result<C> {
    let mut out = a.clone();
    out.add_assign(b)?;
    Ok(out)
}

/// `a - b`
pub fn subtract<C: Elementwise>(a: &C, b: &C) -> Result<C> {
    let mut out = a.clone();
    out.subtract_assign(b)?;
    Ok(out)
}

/// `a * scalar`
pub fn scale<C: Elementwise>(a: &C, scalar: f64) -> C {
    let mut out = a.clone();
    out.scale_assign(scalar);
    out
}

/// Elementwise product
pub fn hadamard<C: Elementwise>(a: &C, b: &C) -> Result<C> {
    let mut out = a.clone();
    out.hadamard_assign(b)?;
    Ok(out)
}

/// `f` applied to every element of `a`
pub fn map<C: Elementwise>(a: &C, mut f: impl FnMut(f64) -> f64) -> C {
    let mut out = a.clone();
    out.map_assign(&mut f);
    out
}

/// Exact structural equality
pub fn equals<C: Elementwise>(a: &C, b: &C) -> bool {
    a.equals(b)
}

/// `v / ‖v‖` (NaN elements for a zero vector)
pub fn normalize(v: &Vector) -> Vector {
    let mut out = v.clone();
    out.normalize();
    out
}

/// Inner product
pub fn dot(a: &Vector, b: &Vector) -> Result<f64> {
    a.dot(b)
}

/// Euclidean norm
pub fn magnitude(v: &Vector) -> f64 {
    v.magnitude()
}

/// Projection of `a` onto `b`, as a new vector
pub fn project(a: &Vector, b: &Vector) -> Result<Vector> {
    a.project(b)
}

/// Angle between `a` and `b` in radians
pub fn angle(a: &Vector, b: &Vector) -> Result<f64> {
    a.angle(b)
}

/// `a` followed by `b`
pub fn combine(a: &Vector, b: &Vector) -> Vector {
    let mut out = a.clone();
    out.combine(b);
    out
}

/// `a` followed by `value`
pub fn push(a: &Vector, value: f64) -> Vector {
    let mut out = a.clone();
    out.push(value);
    out
}

/// Matrix product
pub fn matmul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    a.matmul(b)
}

/// Matrix-vector product
pub fn matvec(a: &Matrix, v: &Vector) -> Result<Vector> {
    a.matvec(v)
}

/// Transposed copy
pub fn transpose(a: &Matrix) -> Matrix {
    a.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;

    #[test]
    fn test_inputs_untouched() {
        let a = Vector::from_values(&[1.0, 2.0], DType::F64);
        let b = Vector::from_values(&[3.0, 4.0], DType::F64);
        let sum = add(&a, &b).unwrap();
        assert_eq!(sum.to_vec(), vec![4.0, 6.0]);
        assert_eq!(a.to_vec(), vec![1.0, 2.0]);
        assert_eq!(combine(&a, &b).len(), 4);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_generic_over_containers() {
        let m = Matrix::identity(2, DType::F32);
        let doubled = scale(&m, 2.0);
        assert_eq!(doubled.to_vec(), vec![2.0, 0.0, 0.0, 2.0]);
        let squared = map(&doubled, |x| x * x);
        assert!(equals(&squared, &scale(&m, 4.0)));
    }
}
