//! Divided-difference coefficients of the scalar function on the Leja
//! sequence.
//!
//! The Newton expansion of f on the nodes L_0, L_1, … uses the divided
//! differences f[L_0], f[L_0,L_1], … as coefficients. Evaluated naively,
//! the triangular recurrence divides by products of node distances that
//! shrink geometrically with the polynomial degree, so every distance is
//! divided by a fixed positive radius r chosen from the spectral extent.
//! The recurrence below absorbs the 1/r^(k−1) normalization into the
//! running product `d`, which keeps both the coefficients and the
//! intermediate quantities representable.
//!
//! The radius MUST be identical across all extensions of one coefficient
//! array; changing it invalidates every previously computed coefficient.

use crate::error::{PropagationError, PropagationErrorKind};
use faer::c64;

/// The running distance product below which the expansion is declared
/// numerically meaningless.
const PRODUCT_UNDERFLOW: f64 = 1e-200;

/// Extends the Newton coefficients of `f` to cover `n_leja` nodes.
///
/// `coeffs` holds `n_a` valid coefficients for the first `n_a` entries of
/// `leja` at the scaling radius `radius`; on success it holds `n_leja`
/// coefficients and the new count is returned. The buffer grows by
/// doubling (zero-filled) like the Leja buffer.
///
/// # Errors
///
/// [`PropagationError`] of the divided-difference-underflow kind when the
/// running product |d| drops below 1e−200 (typically caused by duplicate
/// or near-duplicate nodes, or by a radius far too large for the node
/// spread). The caller should reduce the Krylov dimension or the step.
///
/// # Panics
///
/// Panics if `leja` holds fewer than `n_leja` points or `radius` is not
/// positive.
pub fn extend_newton_coeffs(
    coeffs: &mut Vec<c64>,
    n_a: usize,
    leja: &[c64],
    n_leja: usize,
    radius: f64,
    f: &impl Fn(c64) -> c64,
) -> Result<usize, PropagationError> {
    assert!(
        leja.len() >= n_leja,
        "extend_newton_coeffs: {} nodes requested but only {} available.",
        n_leja,
        leja.len(),
    );
    assert!(
        radius > 0.0,
        "extend_newton_coeffs: the scaling radius must be positive.",
    );

    if n_leja == 0 {
        return Ok(0);
    }
    if coeffs.len() < n_leja {
        coeffs.resize(2 * n_leja, c64::new(0.0, 0.0));
    }

    if n_a == 0 {
        coeffs[0] = f(leja[0]);
    }

    for k in n_a.max(1)..n_leja {
        let mut d = c64::new(1.0, 0.0);
        let mut p = c64::new(0.0, 0.0);
        for n in 1..k {
            let zd = leja[k] - leja[n - 1];
            d = d * zd / radius;
            p += coeffs[n] * d;
        }
        let zd = leja[k] - leja[k - 1];
        d = d * zd / radius;
        if !(d.norm() > PRODUCT_UNDERFLOW) {
            return Err(PropagationErrorKind::DividedDifferenceUnderflow { index: k }.into());
        }
        coeffs[k] = (f(leja[k]) - coeffs[0] - p) / d;
    }

    Ok(n_leja)
}
