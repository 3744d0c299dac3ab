//! Arnoldi iteration with a scaled matrix-free operator.
//!
//! This module implements the single-pass modified Gram–Schmidt Arnoldi
//! process that generates an orthonormal basis for the Krylov subspace
//! K_m(H·dt, ψ) while accumulating the upper-Hessenberg projection of the
//! scaled operator. The basis is stored column-wise in a caller-supplied
//! matrix, which keeps repeated invocations allocation-free: the restart
//! driver reuses the same storage for every cycle.
//!
//! No reorthogonalization is performed. Callers that need orthonormality
//! beyond what a single Gram–Schmidt sweep delivers must work with smaller
//! Krylov dimensions.
//!
//! Breakdown of the iteration (the residual norm dropping below
//! `norm_min`) is not an error: it means the Krylov subspace is invariant
//! and the projection is exact on it.

use crate::vector;
use faer::{
    c64,
    dyn_stack::MemStack,
    matrix_free::LinOp,
    prelude::*,
};

/// Performs up to `m` steps of the Arnoldi iteration on the scaled
/// operator H·dt.
///
/// On return, the first `m'` columns of `basis` (for the returned
/// dimension `m' ≤ m`) are orthonormal and span the same subspace as
/// {ψ, Hψ, …, H^{m'−1}ψ}, and the leading m'×m' block of `hess` equals
/// Qᴴ·(H·dt)·Q. The Hessenberg entries are dt-scaled inner products, so
/// the projection represents H·dt rather than H.
///
/// When `extended` is true (or before the final step), the residual of
/// each step is normalized into the next basis column and its dt-scaled
/// norm is recorded on the subdiagonal; the extended (m'+1)×m' block then
/// satisfies (H·dt)·Q_m' = Q_{m'+1}·H̃. If the residual norm falls below
/// `norm_min`, the iteration stops and returns the step count reached: the
/// unnormalized residual is left in the next basis column and the tiny
/// subdiagonal entry has already been recorded.
///
/// # Arguments
/// * `op`: the operator H, exposed through [`faer::matrix_free::LinOp`].
/// * `dt`: the complex step scaling the operator; the projection is of H·dt.
/// * `seed`: the N×1 starting vector ψ. Must be unit-norm.
/// * `m`: the requested Krylov dimension.
/// * `hess`: Hessenberg storage of side ≥ m+1. Zeroed on entry.
/// * `basis`: basis storage with ≥ m+1 columns of length N.
/// * `work`: an N×1 scratch column.
/// * `extended`: whether to form the (m+1)-st row and column even at j = m.
/// * `norm_min`: the breakdown threshold on the residual norm.
/// * `par`: parallelism handed to the operator.
/// * `stack`: scratch memory for the operator application.
///
/// # Returns
/// The achieved Krylov dimension `m' ≤ m`.
///
/// # Panics
/// Panics if the storage dimensions violate the contract above, or if `m`
/// is zero.
pub fn arnoldi(
    op: &impl LinOp<c64>,
    dt: c64,
    seed: MatRef<'_, c64>,
    m: usize,
    mut hess: MatMut<'_, c64>,
    mut basis: MatMut<'_, c64>,
    mut work: MatMut<'_, c64>,
    extended: bool,
    norm_min: f64,
    par: Par,
    stack: &mut MemStack,
) -> usize {
    let n = op.nrows();
    assert!(m >= 1, "arnoldi: the requested dimension must be positive.");
    assert!(
        hess.nrows() > m && hess.ncols() > m,
        "arnoldi: Hessenberg storage of side {} is too small for m = {}.",
        hess.nrows(),
        m,
    );
    assert!(
        basis.nrows() == n && basis.ncols() > m,
        "arnoldi: basis storage of shape {}x{} cannot hold {} vectors of length {}.",
        basis.nrows(),
        basis.ncols(),
        m + 1,
        n,
    );
    assert_eq!(seed.nrows(), n, "arnoldi: seed length does not match the operator.");
    assert_eq!(work.nrows(), n, "arnoldi: scratch length does not match the operator.");

    hess.rb_mut().fill(c64::new(0.0, 0.0));
    basis.rb_mut().get_mut(.., 0..1).copy_from(seed);

    for j in 0..m {
        // work ← H·q_j. The scaling by dt is folded into the Hessenberg
        // entries rather than the vector, saving one pass over the data.
        op.apply(work.rb_mut(), basis.rb().get(.., j..j + 1), par, stack);

        // Single-pass modified Gram-Schmidt against the basis so far.
        for i in 0..=j {
            let q_i = basis.rb().get(.., i..i + 1);
            let ip = vector::inner(q_i, work.rb());
            hess[(i, j)] = dt * ip;
            vector::axpy(work.rb_mut(), -ip, basis.rb().get(.., i..i + 1));
        }

        if j + 1 < m || extended {
            let h = vector::norm(work.rb());
            hess[(j + 1, j)] = dt * h;
            basis.rb_mut().get_mut(.., j + 1..j + 2).copy_from(work.rb());
            if h < norm_min {
                // Invariant subspace: the residual column stays unnormalized.
                return j + 1;
            }
            vector::scale(
                basis.rb_mut().get_mut(.., j + 1..j + 2),
                c64::new(1.0 / h, 0.0),
            );
        }
    }

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::{
        Mat,
        dyn_stack::{MemBuffer, MemStack},
    };
    use rand::{Rng, SeedableRng, rngs::StdRng};

    const ORTHO_TOL: f64 = 1e-10;

    /// A reproducible random Hermitian matrix (X + Xᴴ)/2.
    fn random_hermitian(n: usize, seed: u64) -> Mat<c64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let x = Mat::from_fn(n, n, |_, _| c64::new(rng.random(), rng.random()));
        let xh = x.adjoint().to_owned();
        Mat::from_fn(n, n, |i, j| {
            (x.as_ref()[(i, j)] + xh.as_ref()[(i, j)]) * 0.5
        })
    }

    fn random_unit(n: usize, seed: u64) -> Mat<c64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut v = Mat::from_fn(n, 1, |_, _| c64::new(rng.random(), rng.random()));
        let nrm = crate::vector::norm(v.as_ref());
        crate::vector::scale(v.as_mut(), c64::new(1.0 / nrm, 0.0));
        v
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let n = 40;
        let m = 8;
        let a = random_hermitian(n, 7);
        let seed = random_unit(n, 11);

        let mut hess = Mat::<c64>::zeros(m + 1, m + 1);
        let mut basis = Mat::<c64>::zeros(n, m + 1);
        let mut work = Mat::<c64>::zeros(n, 1);
        let mut mem = MemBuffer::new(a.as_ref().apply_scratch(1, Par::Seq));
        let mut stack = MemStack::new(&mut mem);

        let achieved = arnoldi(
            &a.as_ref(),
            c64::new(0.3, 0.0),
            seed.as_ref(),
            m,
            hess.as_mut(),
            basis.as_mut(),
            work.as_mut(),
            true,
            1e-14,
            Par::Seq,
            &mut stack,
        );
        assert_eq!(achieved, m);

        // All m+1 columns (extended) must be orthonormal pairwise.
        for i in 0..=m {
            let q_i = basis.as_ref().get(.., i..i + 1);
            assert!((crate::vector::norm(q_i) - 1.0).abs() < ORTHO_TOL);
            for j in (i + 1)..=m {
                let q_j = basis.as_ref().get(.., j..j + 1);
                assert!(crate::vector::inner(q_i, q_j).norm() < ORTHO_TOL);
            }
        }
    }

    #[test]
    fn test_hessenberg_reconstructs_scaled_operator() {
        let n = 30;
        let m = 6;
        let dt = c64::new(0.5, -0.25);
        let a = random_hermitian(n, 3);
        let seed = random_unit(n, 5);

        let mut hess = Mat::<c64>::zeros(m + 1, m + 1);
        let mut basis = Mat::<c64>::zeros(n, m + 1);
        let mut work = Mat::<c64>::zeros(n, 1);
        let mut mem = MemBuffer::new(a.as_ref().apply_scratch(1, Par::Seq));
        let mut stack = MemStack::new(&mut mem);

        let achieved = arnoldi(
            &a.as_ref(),
            dt,
            seed.as_ref(),
            m,
            hess.as_mut(),
            basis.as_mut(),
            work.as_mut(),
            true,
            1e-14,
            Par::Seq,
            &mut stack,
        );
        assert_eq!(achieved, m);

        // (H·dt)·Q_m must equal Q_{m+1}·H̃ with H̃ the (m+1)×m block.
        let q_m = basis.as_ref().get(.., 0..m).to_owned();
        let q_ext = basis.as_ref().get(.., 0..m + 1).to_owned();
        let h_ext = hess.as_ref().get(0..m + 1, 0..m).to_owned();
        let lhs = &a * &q_m;
        let mut residual = &q_ext * &h_ext;
        for jc in 0..m {
            for i in 0..n {
                let lv = lhs.as_ref()[(i, jc)] * dt;
                residual.as_mut()[(i, jc)] -= lv;
            }
        }
        assert!(residual.norm_l2() < ORTHO_TOL);
    }

    #[test]
    fn test_breakdown_on_eigenvector_seed() {
        // Seed with an exact eigenvector of a diagonal matrix: the first
        // residual is zero, so the iteration must stop at dimension 1 with
        // a tiny recorded subdiagonal entry.
        let n = 4;
        let a = Mat::from_fn(n, n, |i, j| {
            if i == j {
                c64::new(1.0 + i as f64, 0.0)
            } else {
                c64::new(0.0, 0.0)
            }
        });
        let seed = Mat::from_fn(n, 1, |i, _| {
            if i == 0 {
                c64::new(1.0, 0.0)
            } else {
                c64::new(0.0, 0.0)
            }
        });

        let m = 3;
        let mut hess = Mat::<c64>::zeros(m + 1, m + 1);
        let mut basis = Mat::<c64>::zeros(n, m + 1);
        let mut work = Mat::<c64>::zeros(n, 1);
        let mut mem = MemBuffer::new(a.as_ref().apply_scratch(1, Par::Seq));
        let mut stack = MemStack::new(&mut mem);

        let achieved = arnoldi(
            &a.as_ref(),
            c64::new(1.0, 0.0),
            seed.as_ref(),
            m,
            hess.as_mut(),
            basis.as_mut(),
            work.as_mut(),
            true,
            1e-14,
            Par::Seq,
            &mut stack,
        );
        assert_eq!(achieved, 1);
        assert!((hess.as_ref()[(0, 0)] - c64::new(1.0, 0.0)).norm() < 1e-14);
        assert!(hess.as_ref()[(1, 0)].norm() < 1e-14);
    }
}
