//! This module defines the complex vector-algebra primitives.
//!
//! Krylov subspace methods consume a vector type through a very small set
//! of operations: copy, scaling, axpy, the inner product, and the Euclidean
//! norm. State vectors in this crate are `faer` column matrices (shape
//! N×1), and the Krylov basis is a single contiguous matrix with one basis
//! vector per column, so all primitives here operate on `MatRef`/`MatMut`
//! column views.
//!
//! ## Inner-product convention
//!
//! The inner product implemented by [`inner`] is **conjugate-linear in the
//! first argument** and linear in the second:
//!
//! ⟨x, y⟩ = Σᵢ conj(xᵢ)·yᵢ
//!
//! The Arnoldi engine relies on this convention; mixing conventions would
//! silently produce a transposed Hessenberg projection. Any alternative
//! vector backend must reproduce it exactly.
//!
//! Length mismatches are programming faults and panic via `assert!`, in
//! line with the contract checks performed elsewhere in the crate.

use faer::prelude::*;

/// The complex scalar type used throughout the crate.
pub use faer::c64;

/// Returns the inner product ⟨x, y⟩ = Σᵢ conj(xᵢ)·yᵢ.
///
/// Conjugate-linear in `x`, linear in `y` (see the module documentation).
///
/// # Panics
///
/// Panics if `x` and `y` are not column vectors of the same length.
pub fn inner(x: MatRef<'_, c64>, y: MatRef<'_, c64>) -> c64 {
    assert_eq!(x.ncols(), 1, "inner: `x` must be a column vector.");
    assert_eq!(y.ncols(), 1, "inner: `y` must be a column vector.");
    assert_eq!(
        x.nrows(),
        y.nrows(),
        "inner: vector lengths differ ({} vs {}).",
        x.nrows(),
        y.nrows(),
    );
    let mut acc = c64::new(0.0, 0.0);
    for i in 0..x.nrows() {
        acc += x[(i, 0)].conj() * y[(i, 0)];
    }
    acc
}

/// Returns the Euclidean 2-norm of the column vector `x`.
pub fn norm(x: MatRef<'_, c64>) -> f64 {
    assert_eq!(x.ncols(), 1, "norm: `x` must be a column vector.");
    let mut acc = 0.0_f64;
    for i in 0..x.nrows() {
        acc += x[(i, 0)].norm_sqr();
    }
    acc.sqrt()
}

/// Scales the column vector in place: x ← α·x.
pub fn scale(mut x: MatMut<'_, c64>, alpha: c64) {
    assert_eq!(x.ncols(), 1, "scale: `x` must be a column vector.");
    for i in 0..x.nrows() {
        x[(i, 0)] *= alpha;
    }
}

/// Accumulates a scaled vector in place: y ← y + α·x.
///
/// # Panics
///
/// Panics if `x` and `y` are not column vectors of the same length.
pub fn axpy(mut y: MatMut<'_, c64>, alpha: c64, x: MatRef<'_, c64>) {
    assert_eq!(x.ncols(), 1, "axpy: `x` must be a column vector.");
    assert_eq!(y.ncols(), 1, "axpy: `y` must be a column vector.");
    assert_eq!(
        x.nrows(),
        y.nrows(),
        "axpy: vector lengths differ ({} vs {}).",
        x.nrows(),
        y.nrows(),
    );
    for i in 0..x.nrows() {
        let xi = x[(i, 0)];
        y[(i, 0)] += alpha * xi;
    }
}

// Unit tests pinning down the arithmetic and, critically, the conjugation
// side of the inner product.
#[cfg(test)]
mod tests {
    use super::*;
    use faer::Mat;

    fn col(entries: &[c64]) -> Mat<c64> {
        Mat::from_fn(entries.len(), 1, |i, _| entries[i])
    }

    #[test]
    fn test_inner_is_conjugate_linear_in_first_argument() {
        let x = col(&[c64::new(0.0, 1.0), c64::new(2.0, 0.0)]);
        let y = col(&[c64::new(1.0, 0.0), c64::new(0.0, 3.0)]);
        // conj(i)*1 + conj(2)*3i = -i + 6i = 5i
        let ip = inner(x.as_ref(), y.as_ref());
        assert!((ip - c64::new(0.0, 5.0)).norm() < 1e-15);
        // The reversed order must give the complex conjugate.
        let ip_rev = inner(y.as_ref(), x.as_ref());
        assert!((ip_rev - ip.conj()).norm() < 1e-15);
    }

    #[test]
    fn test_norm_matches_inner_product() {
        let x = col(&[c64::new(3.0, 0.0), c64::new(0.0, 4.0)]);
        assert!((norm(x.as_ref()) - 5.0).abs() < 1e-15);
        let ip = inner(x.as_ref(), x.as_ref());
        assert!((ip.re.sqrt() - 5.0).abs() < 1e-15);
        assert!(ip.im.abs() < 1e-15);
    }

    #[test]
    fn test_scale_and_axpy() {
        let mut y = col(&[c64::new(1.0, 0.0), c64::new(0.0, 1.0)]);
        let x = col(&[c64::new(0.0, 1.0), c64::new(1.0, 0.0)]);
        scale(y.as_mut(), c64::new(2.0, 0.0));
        axpy(y.as_mut(), c64::new(0.0, -1.0), x.as_ref());
        // y = 2*(1, i) + (-i)*(i, 1) = (2 + 1, 2i - i) = (3, i)
        assert!((y.as_ref()[(0, 0)] - c64::new(3.0, 0.0)).norm() < 1e-15);
        assert!((y.as_ref()[(1, 0)] - c64::new(0.0, 1.0)).norm() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "vector lengths differ")]
    fn test_length_mismatch_panics() {
        let x = col(&[c64::new(1.0, 0.0)]);
        let y = col(&[c64::new(1.0, 0.0), c64::new(0.0, 0.0)]);
        inner(x.as_ref(), y.as_ref());
    }
}
