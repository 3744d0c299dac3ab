//! High-level driver for evaluating Ψ ← f(H·dt)·Ψ.
//!
//! This module provides the user-facing API for the restarted-Arnoldi
//! Newton propagation. Each restart projects the scaled operator onto a
//! fresh Krylov subspace, harvests the Ritz values of the projection as
//! interpolation-node candidates, extends the global Leja sequence and the
//! Newton divided differences, and accumulates the Newton-polynomial image
//! of the restart seed into the solution. The component of the result
//! outside the current Krylov subspace is captured exactly by one extra
//! Newton-basis step and becomes the next restart seed, so the polynomial
//! degree keeps growing across restarts while the basis stays small.
//!
//! The expansion converges for any scalar function analytic on (a
//! neighborhood of) the spectrum of H·dt. The default function is the
//! quantum-mechanical propagator f(z) = exp(−i·z).

use crate::algorithms::{arnoldi, extend_leja, extend_newton_coeffs, hessenberg_spectrum};
use crate::error::{PropagationError, PropagationErrorKind};
use crate::vector;
use crate::workspace::NewtonWorkspace;
use faer::{
    c64,
    dyn_stack::MemStack,
    matrix_free::LinOp,
    prelude::*,
};

/// Default breakdown threshold on residual norms.
pub const DEFAULT_NORM_MIN: f64 = 1e-14;
/// Default relative accuracy of the propagated state.
pub const DEFAULT_RELERR: f64 = 1e-12;
/// Default restart budget.
pub const DEFAULT_MAX_RESTARTS: usize = 50;

/// The quantum-mechanical propagator function f(z) = exp(−i·z).
pub fn exp_minus_iz(z: c64) -> c64 {
    (z * c64::new(0.0, -1.0)).exp()
}

/// Tunable parameters of the restart loop.
#[derive(Debug, Clone, Copy)]
pub struct PropagationOptions {
    /// Norm threshold below which a residual is treated as zero, both for
    /// Arnoldi breakdown and for the restart seed.
    pub norm_min: f64,
    /// Target relative error of the accumulated state.
    pub relerr: f64,
    /// Maximum number of restarts before the call fails.
    pub max_restarts: usize,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            norm_min: DEFAULT_NORM_MIN,
            relerr: DEFAULT_RELERR,
            max_restarts: DEFAULT_MAX_RESTARTS,
        }
    }
}

/// Evaluates Ψ ← exp(−i·H·dt)·Ψ with default options.
///
/// Convenience wrapper around [`propagate_with`] for the quantum
/// propagator function. See there for the full contract.
pub fn propagate<O>(
    op: &O,
    psi: MatMut<'_, c64>,
    dt: c64,
    wrk: &mut NewtonWorkspace,
    stack: &mut MemStack,
) -> Result<(), PropagationError>
where
    O: LinOp<c64>,
{
    propagate_with(
        op,
        psi,
        dt,
        exp_minus_iz,
        &PropagationOptions::default(),
        wrk,
        stack,
    )
}

/// Evaluates Ψ ← f(H·dt)·Ψ by restarted-Arnoldi Newton interpolation.
///
/// The state vector `psi` is overwritten in place with the result. The
/// operator is consumed only through its matrix-vector product; `f` must
/// be analytic on the convex hull of the spectrum of H·dt (it is sampled
/// at the selected Leja nodes and nowhere else). The workspace must have
/// been constructed for vectors of the same length as `psi`; its
/// diagnostics (`restarts`, `n_leja`, `n_a`, `radius`) describe this call
/// after a successful return.
///
/// A unit-norm input that is an eigenvector of `H` (more generally, a
/// seed spanning an invariant subspace found on the first Arnoldi pass)
/// short-circuits without any interpolation.
///
/// # Errors
///
/// - input errors for `dt = 0` or a workspace of the wrong shape;
/// - dimension mismatch between the operator and the state vector;
/// - numerical failure of the Hessenberg eigendecomposition;
/// - divided-difference underflow (reduce `m_max` or `dt`);
/// - failure to converge within the restart budget, after which the
///   content of `psi` is undefined: callers needing rollback must copy
///   the state beforehand.
pub fn propagate_with<O, F>(
    op: &O,
    mut psi: MatMut<'_, c64>,
    dt: c64,
    f: F,
    opts: &PropagationOptions,
    wrk: &mut NewtonWorkspace,
    stack: &mut MemStack,
) -> Result<(), PropagationError>
where
    O: LinOp<c64>,
    F: Fn(c64) -> c64,
{
    let zero = c64::new(0.0, 0.0);
    if dt == zero {
        return Err(PropagationErrorKind::InputError(
            "The time step `dt` must be nonzero.".to_string(),
        )
        .into());
    }
    assert_eq!(psi.ncols(), 1, "propagate: `psi` must be a column vector.");
    if op.nrows() != psi.nrows() {
        return Err(PropagationErrorKind::DimensionMismatch {
            operator_rows: op.nrows(),
            vector_rows: psi.nrows(),
        }
        .into());
    }
    if wrk.dim != psi.nrows() {
        return Err(PropagationErrorKind::InputError(format!(
            "The workspace is shaped for dimension {} but the state vector has dimension {}.",
            wrk.dim,
            psi.nrows(),
        ))
        .into());
    }

    wrk.reset();
    let par = Par::Seq;

    let mut m = wrk.m_max;
    let mut beta = vector::norm(psi.rb());
    if beta <= opts.norm_min {
        // f(H·dt)·0 = 0: nothing to do.
        return Ok(());
    }
    wrk.seed.as_mut().copy_from(psi.rb());
    vector::scale(wrk.seed.as_mut(), c64::new(1.0 / beta, 0.0));

    let mut s = 0usize;
    loop {
        if beta <= opts.norm_min {
            break;
        }

        m = arnoldi(
            op,
            dt,
            wrk.seed.as_ref(),
            m,
            wrk.hess.as_mut(),
            wrk.basis.as_mut(),
            wrk.work.as_mut(),
            true,
            opts.norm_min,
            par,
            stack,
        );

        // An invariant subspace on the first pass means the seed is an
        // eigenvector of H with eigenvalue Hess[0,0]/dt, and the exact
        // result is a pure phase/amplitude factor. The subdiagonal entry
        // distinguishes a genuine breakdown from m_max = 1.
        let broke_down = wrk.hess.as_ref()[(1, 0)].norm() < dt.norm() * opts.norm_min;
        if s == 0 && m == 1 && broke_down {
            let fz = f(wrk.hess.as_ref()[(0, 0)]);
            vector::scale(psi.rb_mut(), fz);
            break;
        }

        // Ritz values of every leading block form the candidate pool.
        hessenberg_spectrum(wrk.hess.as_ref(), m, true, &mut wrk.ritz)?;

        if s == 0 {
            let rho = wrk.ritz.iter().map(|z| z.norm()).fold(0.0, f64::max);
            if !(rho > 0.0) {
                return Err(PropagationErrorKind::InputError(
                    "The Ritz spectrum collapsed to zero; no scaling radius can be fixed."
                        .to_string(),
                )
                .into());
            }
            wrk.radius = 1.2 * rho;
        }

        let n_s = wrk.n_leja;
        wrk.n_leja = extend_leja(&mut wrk.leja, wrk.n_leja, &mut wrk.ritz, m);
        wrk.n_a = extend_newton_coeffs(
            &mut wrk.coeffs,
            wrk.n_a,
            &wrk.leja,
            wrk.n_leja,
            wrk.radius,
            &f,
        )?;

        // Newton polynomial of the extended Hessenberg applied to β·e₁,
        // evaluated through the Newton-basis recurrence
        //   R₀ = β·e₁,  R_{k+1} = (H̃ − L_{n_s+k}·I)·R_k / r.
        let width = m + 1;
        wrk.poly_r.resize(width, zero);
        wrk.poly_tmp.resize(width, zero);
        wrk.poly_p.resize(width, zero);
        wrk.poly_r.fill(zero);
        wrk.poly_p.fill(zero);
        wrk.poly_r[0] = c64::new(beta, 0.0);
        wrk.poly_p[0] = wrk.coeffs[n_s] * beta;
        for k in 0..m - 1 {
            shifted_step(
                wrk.hess.as_ref(),
                m,
                wrk.leja[n_s + k],
                wrk.radius,
                &wrk.poly_r,
                &mut wrk.poly_tmp,
            );
            std::mem::swap(&mut wrk.poly_r, &mut wrk.poly_tmp);
            let a_k = wrk.coeffs[n_s + k + 1];
            for i in 0..width {
                wrk.poly_p[i] += a_k * wrk.poly_r[i];
            }
        }

        // Accumulate the polynomial image into Ψ. The last component
        // P[m] is deliberately excluded: it lives on the truncation row
        // of the extended Hessenberg and is captured by the restart seed
        // below, not by the solution update.
        if s == 0 {
            psi.rb_mut().fill(zero);
        }
        for i in 0..m {
            vector::axpy(psi.rb_mut(), wrk.poly_p[i], wrk.basis.as_ref().get(.., i..i + 1));
        }

        // One more Newton-basis step yields the residual component, which
        // becomes the next restart seed.
        shifted_step(
            wrk.hess.as_ref(),
            m,
            wrk.leja[n_s + m - 1],
            wrk.radius,
            &wrk.poly_r,
            &mut wrk.poly_tmp,
        );
        std::mem::swap(&mut wrk.poly_r, &mut wrk.poly_tmp);
        let beta_new = slice_norm(&wrk.poly_r);
        if beta_new > opts.norm_min {
            let inv = 1.0 / beta_new;
            for x in wrk.poly_r.iter_mut() {
                *x *= inv;
            }
            // Reconstruct the seed in scratch storage: the previous seed
            // appears on the right-hand side, so building in place would
            // alias.
            wrk.work.as_mut().copy_from(wrk.seed.as_ref());
            vector::scale(wrk.work.as_mut(), wrk.poly_r[0]);
            for i in 1..=m {
                vector::axpy(
                    wrk.work.as_mut(),
                    wrk.poly_r[i],
                    wrk.basis.as_ref().get(.., i..i + 1),
                );
            }
            // Renormalize so the seed invariant ‖v‖ = 1 holds exactly,
            // folding the correction into β.
            let nv = vector::norm(wrk.work.as_ref());
            wrk.seed.as_mut().copy_from(wrk.work.as_ref());
            vector::scale(wrk.seed.as_mut(), c64::new(1.0 / nv, 0.0));
            beta = beta_new * nv;
        } else {
            beta = 0.0;
        }

        // The magnitude of the last Newton coefficient bounds the
        // last-added term of the series; against 1 + ‖Ψ‖ this yields a
        // dimensionless relative error estimate.
        let psi_norm = vector::norm(psi.rb());
        let estimate = beta * wrk.coeffs[wrk.n_a - 1].norm() / (1.0 + psi_norm);
        if estimate < opts.relerr {
            break;
        }
        s += 1;
        if s > opts.max_restarts {
            wrk.restarts = s - 1;
            return Err(PropagationErrorKind::NoConvergence {
                max_restarts: opts.max_restarts,
            }
            .into());
        }
    }

    wrk.restarts = s.saturating_sub(1);
    Ok(())
}

/// Applies one Newton-basis step on the projected level:
/// y ← (H̃ − shift·I)·x / radius over the leading (m+1)×(m+1) block.
///
/// Only the Hessenberg band of each row contributes; the column past the
/// (m+1)-st is zero by the Arnoldi contract.
fn shifted_step(
    hess: MatRef<'_, c64>,
    m: usize,
    shift: c64,
    radius: f64,
    x: &[c64],
    y: &mut [c64],
) {
    debug_assert_eq!(x.len(), m + 1);
    debug_assert_eq!(y.len(), m + 1);
    for i in 0..=m {
        let mut acc = -shift * x[i];
        for j in i.saturating_sub(1)..=m {
            acc += hess[(i, j)] * x[j];
        }
        y[i] = acc / radius;
    }
}

/// Euclidean norm of a complex slice.
fn slice_norm(x: &[c64]) -> f64 {
    x.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}
