//! Construction, views and element access

mod common;

use densela::prelude::*;

#[test]
fn test_from_values_round_trip() {
    for dtype in [DType::F64, DType::F32] {
        let v = Vector::from_values(&[1.0, -2.5, 3.0], dtype);
        assert_eq!(v.to_vec(), vec![1.0, -2.5, 3.0]);
        assert_eq!(v.dtype(), dtype);
        assert_eq!(v.len(), 3);
    }
}

#[test]
fn test_non_finite_values_are_kept() {
    let v = Vector::from_values(&[f64::NAN, f64::INFINITY], DType::F64);
    assert!(v.get(0).unwrap().is_nan());
    assert_eq!(v.get(1).unwrap(), f64::INFINITY);
}

#[test]
fn test_zeros_and_ones() {
    assert_eq!(
        Vector::zeros(3, DType::F32).unwrap().to_vec(),
        vec![0.0; 3]
    );
    assert_eq!(Vector::ones(2, DType::F64).unwrap().to_vec(), vec![1.0; 2]);

    let empty = Vector::zeros(0, DType::F64).unwrap();
    assert!(empty.is_empty());
    assert!(Vector::ones(0, DType::F32).unwrap().is_empty());
}

#[test]
fn test_negative_size() {
    assert_eq!(
        Vector::zeros(-1, DType::F64).unwrap_err(),
        Error::InvalidSize { size: -1 }
    );
    assert!(matches!(
        Vector::ones(-4, DType::F32),
        Err(Error::InvalidSize { size: -4 })
    ));
}

#[test]
fn test_range_pinned() {
    let up = Vector::range(0.0, 1.0, 5.0, DType::F64).unwrap();
    assert_eq!(up.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    let down = Vector::range(5.0, 1.0, 0.0, DType::F64).unwrap();
    assert_eq!(down.to_vec(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);

    let stepped = Vector::range(0.0, 2.0, 7.0, DType::F32).unwrap();
    assert_eq!(stepped.to_vec(), vec![0.0, 2.0, 4.0, 6.0]);
}

#[test]
fn test_range_errors() {
    for (start, step, end) in [
        (0.0, 0.0, 5.0),
        (0.0, 6.0, 5.0),
        (f64::NAN, 1.0, 5.0),
        (0.0, 1.0, f64::INFINITY),
        (3.0, 1.0, 3.0),
        (0.0, 1e-300, 1.0),
    ] {
        assert!(
            matches!(
                Vector::range(start, step, end, DType::F64),
                Err(Error::InvalidRange { .. })
            ),
            "({start}, {step}, {end})"
        );
    }
}

#[test]
fn test_range_positional_args() {
    let spec = RangeSpec::from_args(&[2.0, 5.0]).unwrap();
    assert_eq!(spec.values(), vec![2.0, 3.0, 4.0]);
    let spec = RangeSpec::from_args(&[0.0, 0.5, 2.0]).unwrap();
    assert_eq!(
        Vector::from_range(&spec, DType::F32).to_vec(),
        vec![0.0, 0.5, 1.0, 1.5]
    );
    assert!(RangeSpec::from_args(&[1.0]).is_err());
    assert!(RangeSpec::from_args(&[0.0, 1.0, 2.0, 3.0]).is_err());
}

#[test]
fn test_get_set_bounds() {
    let mut v = Vector::from_values(&[1.0, 2.0, 3.0], DType::F64);
    assert_eq!(
        v.get(-1).unwrap_err(),
        Error::IndexOutOfBounds { index: -1, size: 3 }
    );
    assert!(matches!(v.get(3), Err(Error::IndexOutOfBounds { .. })));
    assert!(matches!(v.set(-1, 0.0), Err(Error::IndexOutOfBounds { .. })));
    assert!(matches!(v.set(3, 0.0), Err(Error::IndexOutOfBounds { .. })));
    assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0]);

    v.set(0, 9.0).unwrap().set(2, 7.0).unwrap();
    assert_eq!(v.to_vec(), vec![9.0, 2.0, 7.0]);
}

#[test]
fn test_f32_narrowing_on_set() {
    let mut v = Vector::zeros(1, DType::F32).unwrap();
    v.set(0, 0.1).unwrap();
    assert_eq!(v.get(0).unwrap(), 0.1f32 as f64);
}

#[test]
fn test_view_aliases_clone_copies() {
    let v = Vector::from_values(&[1.0, 2.0, 3.0], DType::F64);
    let mut alias = v.view();
    let mut copy = v.clone();
    assert!(alias.shares_storage(&v));
    assert!(!copy.shares_storage(&v));

    alias.set(0, 10.0).unwrap();
    copy.set(1, 20.0).unwrap();
    assert_eq!(v.to_vec(), vec![10.0, 2.0, 3.0]);
}

#[test]
fn test_slice_view() {
    let v = Vector::range(0.0, 1.0, 6.0, DType::F64).unwrap();
    let mut mid = v.slice(2, 5).unwrap();
    assert_eq!(mid.to_vec(), vec![2.0, 3.0, 4.0]);
    mid.scale(10.0);
    assert_eq!(v.to_vec(), vec![0.0, 1.0, 20.0, 30.0, 40.0, 5.0]);

    assert!(v.slice(4, 7).is_err());
    assert!(v.slice(4, 3).is_err());
    assert!(v.slice(3, 3).unwrap().is_empty());
}

#[test]
fn test_to_dtype() {
    let v = Vector::from_values(&[0.5, 1.5], DType::F64);
    let w = v.to_dtype(DType::F32);
    assert_eq!(w.dtype(), DType::F32);
    assert_eq!(w.to_vec(), v.to_vec());
    assert!(!w.shares_storage(&v));
}

#[test]
fn test_from_vec_follows_type() {
    let v = Vector::from_vec(vec![1.0f32, 2.0]);
    assert_eq!(v.dtype(), DType::F32);
    let m = Matrix::from_vec(1, 2, vec![1.0f64, 2.0]).unwrap();
    assert_eq!(m.dtype(), DType::F64);
    assert!(Matrix::from_vec(2, 2, vec![1.0f64]).is_err());
}

#[test]
fn test_display() {
    let v = Vector::from_values(&[1.0, 2.5, -3.0], DType::F64);
    assert_eq!(v.to_string(), "[1, 2.5, -3]");
    let f = Vector::from_values(&[0.1], DType::F32);
    assert_eq!(f.to_string(), "[0.1]");
    assert_eq!(Vector::zeros(0, DType::F64).unwrap().to_string(), "[]");

    let m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]], DType::F64).unwrap();
    assert_eq!(m.to_string(), "[[1, 2],\n [3, 4]]");
}
