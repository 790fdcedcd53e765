//! Vector arithmetic and structural operations

mod common;

use common::assert_allclose_f64;
use densela::ops;
use densela::prelude::*;

fn vec64(values: &[f64]) -> Vector {
    Vector::from_values(values, DType::F64)
}

#[test]
fn test_add_then_subtract_restores() {
    for dtype in [DType::F64, DType::F32] {
        let a = Vector::from_values(&[1.5, -2.0, 3.25, 0.0], dtype);
        let b = Vector::from_values(&[0.5, 4.0, -1.0, 2.0], dtype);
        let back = ops::subtract(&ops::add(&a, &b).unwrap(), &b).unwrap();
        assert_allclose_f64(&back.to_vec(), &a.to_vec(), 1e-6, 1e-6, "add/subtract");
    }
}

#[test]
fn test_add_chains_and_mutates() {
    let mut a = vec64(&[1.0, 2.0]);
    a.add(&vec64(&[1.0, 1.0]))
        .unwrap()
        .subtract(&vec64(&[0.5, 0.5]))
        .unwrap()
        .scale(2.0);
    assert_eq!(a.to_vec(), vec![3.0, 5.0]);
}

#[test]
fn test_length_mismatch_leaves_receiver() {
    let mut a = vec64(&[1.0, 2.0, 3.0]);
    let b = vec64(&[1.0, 2.0]);
    assert!(matches!(a.add(&b), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(a.subtract(&b), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(a.dot(&b), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(a.hadamard(&b), Err(Error::ShapeMismatch { .. })));
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_zero_length_is_noop() {
    let mut a = Vector::zeros(0, DType::F64).unwrap();
    let b = Vector::ones(0, DType::F32).unwrap();
    a.add(&b).unwrap().subtract(&b).unwrap();
    assert!(a.is_empty());
    assert_eq!(a.dot(&b).unwrap(), 0.0);
    assert_eq!(a.magnitude(), 0.0);
    assert_eq!(a.max(), None);
    assert_eq!(a.max_magnitude_index(), None);
}

#[test]
fn test_mixed_dtype_keeps_receiver_dtype() {
    let mut a = Vector::from_values(&[1.0, 2.0], DType::F32);
    a.add(&vec64(&[0.5, 0.25])).unwrap();
    assert_eq!(a.dtype(), DType::F32);
    assert_eq!(a.to_vec(), vec![1.5, 2.25]);
}

#[test]
fn test_scale_by_one_is_identity() {
    let a = vec64(&[0.1, -7.3, 1e300, f64::MIN_POSITIVE]);
    assert!(ops::equals(&ops::scale(&a, 1.0), &a));
}

#[test]
fn test_normalize() {
    let v = ops::normalize(&vec64(&[3.0, 4.0]));
    assert_allclose_f64(&v.to_vec(), &[0.6, 0.8], 1e-12, 0.0, "normalize");
    assert!((v.magnitude() - 1.0).abs() < 1e-12);

    let zero = ops::normalize(&vec64(&[0.0, 0.0]));
    assert!(zero.to_vec().iter().all(|x| x.is_nan()));
}

#[test]
fn test_dot_commutes() {
    let a = vec64(&[1.0, 2.0, 3.0]);
    let b = vec64(&[4.0, -5.0, 6.0]);
    assert_eq!(a.dot(&b).unwrap(), 12.0);
    assert_eq!(a.dot(&b).unwrap(), b.dot(&a).unwrap());
}

#[test]
fn test_dot_with_itself_through_view() {
    let a = vec64(&[1.0, 2.0, 2.0]);
    assert_eq!(a.dot(&a.view()).unwrap(), 9.0);
}

#[test]
fn test_add_to_own_view() {
    let mut a = vec64(&[1.0, 2.0, 3.0]);
    let alias = a.view();
    a.add(&alias).unwrap();
    assert_eq!(a.to_vec(), vec![2.0, 4.0, 6.0]);
}

#[test]
fn test_project() {
    let a = vec64(&[2.0, 3.0]);
    let onto = vec64(&[1.0, 0.0]);
    let p = ops::project(&a, &onto).unwrap();
    assert_eq!(p.to_vec(), vec![2.0, 0.0]);
    assert_eq!(onto.to_vec(), vec![1.0, 0.0]);
}

#[test]
fn test_angle() {
    let x = vec64(&[1.0, 0.0]);
    let y = vec64(&[0.0, 2.0]);
    assert!((ops::angle(&x, &y).unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert!(ops::angle(&x, &x).unwrap().abs() < 1e-12);
}

#[test]
fn test_equals() {
    let a = vec64(&[1.0, 2.0]);
    assert!(a.equals(&a));
    assert!(a.equals(&Vector::from_values(&[1.0, 2.0], DType::F32)));
    assert!(!a.equals(&vec64(&[1.0, 2.0, 3.0])));
    assert!(!a.equals(&vec64(&[1.0, 2.5])));
    assert_eq!(a, a.clone());
}

#[test]
fn test_extrema() {
    let v = vec64(&[3.0, -7.0, 7.0, 1.0]);
    assert_eq!(v.max(), Some(7.0));
    assert_eq!(v.min(), Some(-7.0));
    assert_eq!(v.max_magnitude_index(), Some(1));
    assert_eq!(v.max_magnitude(), Some(-7.0));
    assert_eq!(v.sum(), 4.0);
}

#[test]
fn test_extrema_skip_nan() {
    let v = vec64(&[f64::NAN, 2.0, -1.0]);
    assert_eq!(v.max(), Some(2.0));
    assert_eq!(v.min(), Some(-1.0));
    assert_eq!(v.max_magnitude_index(), Some(1));
}

#[test]
fn test_combine_replaces_storage() {
    let mut a = vec64(&[1.0, 2.0, 3.0]);
    let before = a.view();
    a.combine(&vec64(&[4.0, 5.0]));
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!(!a.shares_storage(&before));
    assert_eq!(before.len(), 3);
}

#[test]
fn test_combine_detaches_view() {
    let owner = vec64(&[1.0, 2.0]);
    let mut view = owner.view();
    view.push(3.0);
    view.set(0, 100.0).unwrap();
    assert_eq!(view.to_vec(), vec![100.0, 2.0, 3.0]);
    assert_eq!(owner.to_vec(), vec![1.0, 2.0]);
}

#[test]
fn test_push_and_free_functions() {
    let a = Vector::from_values(&[1.0], DType::F32);
    let b = ops::push(&a, 2.0);
    assert_eq!(b.to_vec(), vec![1.0, 2.0]);
    assert_eq!(b.dtype(), DType::F32);
    assert_eq!(a.len(), 1);
    assert_eq!(ops::combine(&a, &b).to_vec(), vec![1.0, 1.0, 2.0]);
}

#[test]
fn test_map_and_each_in_order() {
    let mut v = vec64(&[1.0, 2.0, 3.0]);
    v.map(|x| x * x);
    assert_eq!(v.to_vec(), vec![1.0, 4.0, 9.0]);

    let mut seen = Vec::new();
    v.each(|x, i| seen.push((i, x)));
    assert_eq!(seen, vec![(0, 1.0), (1, 4.0), (2, 9.0)]);
}

#[test]
fn test_hadamard() {
    let h = ops::hadamard(&vec64(&[1.0, 2.0, 3.0]), &vec64(&[2.0, 0.5, -1.0])).unwrap();
    assert_eq!(h.to_vec(), vec![2.0, 1.0, -3.0]);
}

#[test]
fn test_strided_column_ops() {
    let m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]], DType::F64).unwrap();
    let mut col = m.column(1).unwrap();
    assert_eq!(col.to_vec(), vec![2.0, 4.0, 6.0]);
    assert_eq!(col.dot(&vec64(&[1.0, 1.0, 1.0])).unwrap(), 12.0);
    col.scale(0.5);
    assert_eq!(m.to_vec(), vec![1.0, 1.0, 3.0, 2.0, 5.0, 3.0]);
}

#[test]
fn test_empty_slice_of_strided_column() {
    let m = Matrix::from_values(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], DType::F64).unwrap();
    // Offset of an empty tail slice lands past the end of the buffer
    let mut tail = m.column(2).unwrap().slice(2, 2).unwrap();
    assert_eq!(tail.len(), 0);
    assert_eq!(tail.magnitude(), 0.0);
    assert_eq!(tail.sum(), 0.0);
    assert_eq!(tail.dot(&vec64(&[])).unwrap(), 0.0);
    tail.scale(2.0).map(|x| x + 1.0);
    assert!(tail.to_vec().is_empty());
    assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_column_of_empty_matrix() {
    let m = Matrix::zeros(0, 3, DType::F64);
    let mut col = m.column(2).unwrap();
    assert_eq!(col.len(), 0);
    assert_eq!(col.magnitude(), 0.0);
    assert_eq!(col.sum(), 0.0);
    assert_eq!(col.dot(&vec64(&[])).unwrap(), 0.0);
    col.scale(3.0).map(|x| x * 2.0);

    let mut calls = 0;
    col.each(|_, _| calls += 1);
    assert_eq!(calls, 0);
    assert!(col.to_vec().is_empty());
}

#[test]
fn test_map_reads_alias() {
    let mut v = vec64(&[1.0, 2.0, 3.0]);
    let alias = v.view();
    v.map(|x| x + alias.get(0).unwrap());
    assert_eq!(v.to_vec(), vec![2.0, 3.0, 4.0]);
    assert_eq!(alias.to_vec(), vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_each_writes_alias() {
    let v = vec64(&[1.0, 2.0, 3.0]);
    let mut alias = v.view();
    let mut seen = Vec::new();
    v.each(|x, i| {
        seen.push(x);
        alias.set(i as isize, x * 10.0).unwrap();
    });
    assert_eq!(seen, vec![1.0, 2.0, 3.0]);
    assert_eq!(v.to_vec(), vec![10.0, 20.0, 30.0]);
}
