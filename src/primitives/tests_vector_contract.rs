// =========================================================================
// Vector primitives contract
//
// References:
//   - Cauchy-Schwarz inequality: |dot(u,v)| <= norm(u) * norm(v)
// =========================================================================

use super::*;

/// Dot product is commutative: dot(u,v) = dot(v,u)
#[test]
fn vector_dot_commutative() {
    let u = Vector::from_slice(&[1.0, 2.0, 3.0]);
    let v = Vector::from_slice(&[4.0, 5.0, 6.0]);

    let uv = u.dot(&v);
    let vu = v.dot(&u);

    assert!((uv - vu).abs() < 1e-6, "dot(u,v)={uv} != dot(v,u)={vu}");
}

/// Norm is non-negative and matches the 3-4-5 triangle
#[test]
fn vector_norm_nonneg() {
    let v = Vector::from_slice(&[-3.0, 4.0]);
    let n = v.norm();
    assert!(n >= 0.0);
    assert!((n - 5.0).abs() < 1e-6);
    assert!((v.norm_squared() - 25.0).abs() < 1e-6);
}

/// Cauchy-Schwarz holds
#[test]
fn vector_cauchy_schwarz() {
    let u = Vector::from_slice(&[1.0, -2.0, 0.5]);
    let v = Vector::from_slice(&[3.0, 1.0, -4.0]);
    assert!(u.dot(&v).abs() <= u.norm() * v.norm() + 1e-5);
}

#[test]
fn vector_normalized_is_unit() {
    let v = Vector::from_slice(&[2.0, 0.0, 0.0]).normalized();
    assert!((v.norm() - 1.0).abs() < 1e-6);
    assert_eq!(v[0], 1.0);

    let zero = Vector::zeros(3).normalized();
    assert_eq!(zero.as_slice(), &[0.0, 0.0, 0.0]);
}

#[test]
fn vector_sum() {
    let d = Vector::from_slice(&[4.0, 5.0]);
    assert!((d.sum() - 9.0).abs() < 1e-6);
}
