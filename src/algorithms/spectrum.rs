//! Ritz values of the leading Hessenberg blocks.
//!
//! The Leja selector treats the Ritz values of every leading k×k block of
//! the projected operator as one unordered candidate pool: the small-k
//! blocks contribute coarse estimates of the spectral extent while the
//! large-k blocks refine the interior. This module extracts that pool.
//!
//! The 1×1 and 2×2 blocks are solved in closed form; larger blocks defer
//! to `faer`'s general complex eigenvalue solver. The ordering of
//! eigenvalues within a block is implementation-defined and must not be
//! relied upon by callers.

use crate::error::{PropagationError, PropagationErrorKind};
use faer::{c64, prelude::*};

/// Computes Ritz values of the Hessenberg projection.
///
/// With `accumulate` false, `out` receives the `m` eigenvalues of the
/// leading m×m block. With `accumulate` true, `out` receives the
/// concatenated eigenvalues of the leading k×k blocks for k = 1..m in that
/// order, a flat array of length m(m+1)/2 in which block k occupies
/// positions (k−1)k/2 .. (k−1)k/2 + k − 1.
///
/// `out` is cleared before being filled.
///
/// # Errors
///
/// Propagates a failure of the general eigenvalue solver on any block of
/// side ≥ 3.
///
/// # Panics
///
/// Panics if the Hessenberg storage is smaller than m×m or `m` is zero.
pub fn hessenberg_spectrum(
    hess: MatRef<'_, c64>,
    m: usize,
    accumulate: bool,
    out: &mut Vec<c64>,
) -> Result<(), PropagationError> {
    assert!(m >= 1, "hessenberg_spectrum: `m` must be positive.");
    assert!(
        hess.nrows() >= m && hess.ncols() >= m,
        "hessenberg_spectrum: storage of side {} is too small for m = {}.",
        hess.nrows(),
        m,
    );

    out.clear();
    if accumulate {
        out.reserve(m * (m + 1) / 2);
        for k in 1..=m {
            block_eigenvalues(hess, k, out)?;
        }
    } else {
        out.reserve(m);
        block_eigenvalues(hess, m, out)?;
    }
    Ok(())
}

/// Appends the eigenvalues of the leading k×k block to `out`.
fn block_eigenvalues(
    hess: MatRef<'_, c64>,
    k: usize,
    out: &mut Vec<c64>,
) -> Result<(), PropagationError> {
    match k {
        1 => {
            out.push(hess[(0, 0)]);
        }
        2 => {
            // Roots of λ² − (a+d)λ + (ad − bc) for the block [[a,b],[c,d]].
            let a = hess[(0, 0)];
            let b = hess[(0, 1)];
            let c = hess[(1, 0)];
            let d = hess[(1, 1)];
            let disc = (a * a + b * c * 4.0 - a * d * 2.0 + d * d).sqrt();
            out.push((a + d + disc) * 0.5);
            out.push((a + d - disc) * 0.5);
        }
        _ => {
            let block = hess.get(0..k, 0..k).to_owned();
            let eigs = block
                .as_ref()
                .eigenvalues()
                .map_err(PropagationErrorKind::EvdError)?;
            out.extend_from_slice(&eigs);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::Mat;

    fn sort_by_re(values: &mut [c64]) {
        values.sort_by(|x, y| x.re.partial_cmp(&y.re).unwrap());
    }

    #[test]
    fn test_single_block_is_diagonal_entry() {
        let mut h = Mat::<c64>::zeros(3, 3);
        h.as_mut()[(0, 0)] = c64::new(2.5, -1.0);
        let mut out = Vec::new();
        hessenberg_spectrum(h.as_ref(), 1, false, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - c64::new(2.5, -1.0)).norm() < 1e-15);
    }

    #[test]
    fn test_two_by_two_closed_form() {
        // [[1, 2], [3, 4]] has eigenvalues (5 ± √33)/2.
        let mut h = Mat::<c64>::zeros(3, 3);
        h.as_mut()[(0, 0)] = c64::new(1.0, 0.0);
        h.as_mut()[(0, 1)] = c64::new(2.0, 0.0);
        h.as_mut()[(1, 0)] = c64::new(3.0, 0.0);
        h.as_mut()[(1, 1)] = c64::new(4.0, 0.0);
        let mut out = Vec::new();
        hessenberg_spectrum(h.as_ref(), 2, false, &mut out).unwrap();
        sort_by_re(&mut out);
        let s = 33.0_f64.sqrt();
        assert!((out[0] - c64::new((5.0 - s) / 2.0, 0.0)).norm() < 1e-12);
        assert!((out[1] - c64::new((5.0 + s) / 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_accumulated_layout() {
        // Upper-triangular Hessenberg: every leading block has the leading
        // diagonal entries as its eigenvalues.
        let m = 4;
        let mut h = Mat::<c64>::zeros(m + 1, m + 1);
        for i in 0..m {
            h.as_mut()[(i, i)] = c64::new(1.0 + i as f64, 0.0);
        }
        let mut out = Vec::new();
        hessenberg_spectrum(h.as_ref(), m, true, &mut out).unwrap();
        assert_eq!(out.len(), m * (m + 1) / 2);
        for k in 1..=m {
            let start = (k - 1) * k / 2;
            let mut block: Vec<c64> = out[start..start + k].to_vec();
            sort_by_re(&mut block);
            for (i, z) in block.iter().enumerate() {
                assert!(
                    (z - c64::new(1.0 + i as f64, 0.0)).norm() < 1e-10,
                    "block {k} entry {i} off: {z}",
                );
            }
        }
    }
}
