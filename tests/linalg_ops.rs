//! LU factorization, solve, determinant and inverse

mod common;

use common::{assert_allclose_f64, portable};
use densela::linalg;
use densela::prelude::*;

fn m64(rows: &[&[f64]]) -> Matrix {
    Matrix::from_rows(rows, DType::F64).unwrap()
}

#[test]
fn test_known_determinants() {
    assert!((linalg::det(&m64(&[&[1.0, 2.0], &[3.0, 4.0]])).unwrap() + 2.0).abs() < 1e-12);
    assert!((linalg::det(&Matrix::identity(4, DType::F64)).unwrap() - 1.0).abs() < 1e-12);
    let a = m64(&[&[2.0, 0.0, 1.0], &[1.0, 3.0, 2.0], &[1.0, 1.0, 2.0]]);
    assert!((linalg::det(&a).unwrap() - 6.0).abs() < 1e-12);
    assert_eq!(linalg::det(&m64(&[&[1.0, 2.0], &[2.0, 4.0]])).unwrap(), 0.0);
}

#[test]
fn test_solve_reproduces_rhs() {
    let a = m64(&[
        &[6.0, -2.0, 1.0, 0.5],
        &[-2.0, 6.0, -2.0, 1.0],
        &[1.0, -2.0, 6.0, -2.0],
        &[0.5, 1.0, -2.0, 6.0],
    ]);
    let b = Vector::from_values(&[11.0, -16.0, 17.0, -3.0], DType::F64);
    let x = linalg::solve(&a, &b).unwrap();
    let ax = a.matvec(&x).unwrap();
    assert_allclose_f64(&ax.to_vec(), &b.to_vec(), 1e-10, 1e-10, "A·x");
}

#[test]
fn test_factors_reassemble() {
    let a = m64(&[&[0.0, 2.0, 1.0], &[3.0, -1.0, 4.0], &[6.0, 1.0, -2.0]]);
    let f = linalg::lu(&a).unwrap();
    let pa = f.permutation().matmul(&a).unwrap();
    let lu = f.l().matmul(&f.u()).unwrap();
    assert_allclose_f64(&pa.to_vec(), &lu.to_vec(), 1e-12, 1e-12, "P·A = L·U");
    assert_eq!(f.order(), 3);
    assert_eq!(f.pivots().len(), 3);
    assert_eq!(f.lu().shape(), (3, 3));
}

#[test]
fn test_inverse() {
    let a = m64(&[&[4.0, 7.0], &[2.0, 6.0]]);
    let inv = linalg::inverse(&a).unwrap();
    assert_allclose_f64(&inv.to_vec(), &[0.6, -0.7, -0.2, 0.4], 1e-12, 1e-12, "inverse");
    let id = a.matmul(&inv).unwrap();
    assert_allclose_f64(&id.to_vec(), &[1.0, 0.0, 0.0, 1.0], 1e-12, 1e-12, "A·A⁻¹");
}

#[test]
fn test_errors() {
    let rect = Matrix::zeros(2, 3, DType::F64);
    assert!(matches!(linalg::lu(&rect), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(linalg::det(&rect), Err(Error::ShapeMismatch { .. })));

    let singular = m64(&[&[1.0, 2.0], &[2.0, 4.0]]);
    assert!(matches!(linalg::lu(&singular), Err(Error::Singular { .. })));
    assert!(matches!(linalg::inverse(&singular), Err(Error::Singular { .. })));

    let f = linalg::lu(&Matrix::identity(2, DType::F64)).unwrap();
    assert!(matches!(
        f.solve(&Vector::zeros(3, DType::F64).unwrap()),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_f32_and_portable_agree() {
    let rows: &[&[f64]] = &[&[3.0, 1.0, 2.0], &[6.0, 3.0, 4.0], &[3.0, 1.0, 5.0]];
    let a64 = Matrix::from_rows(rows, DType::F64).unwrap().with_dispatch(portable());
    let a32 = Matrix::from_rows(rows, DType::F32).unwrap();
    let b = Vector::from_values(&[1.0, 2.0, 3.0], DType::F64);

    let x64 = linalg::solve(&a64, &b).unwrap();
    let x32 = linalg::solve(&a32, &b).unwrap();
    assert_eq!(x32.dtype(), DType::F32);
    assert_allclose_f64(&x32.to_vec(), &x64.to_vec(), 1e-5, 1e-5, "f32 vs f64");
    assert!((linalg::det(&a64).unwrap() - 9.0).abs() < 1e-12);
}
