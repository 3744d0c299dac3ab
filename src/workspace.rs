//! Preallocated storage for repeated propagator calls.
//!
//! Every call to the restart driver needs the same set of buffers: the
//! Krylov basis, the extended Hessenberg projection, the restart seed and
//! a scratch column, the global Leja and coefficient arrays, and a handful
//! of small recurrence vectors. [`NewtonWorkspace`] owns all of them, so a
//! workspace constructed once per problem shape makes every subsequent
//! propagation allocation-free along the hot path. The Leja, coefficient
//! and Ritz buffers grow on demand (by doubling) and never shrink until
//! the workspace is dropped.
//!
//! A workspace is exclusively owned by one driver call for its entire
//! duration; Rust's borrow rules enforce this at compile time. Distinct
//! workspaces of the same shape may run on different threads, as they
//! share no state.

use faer::{Mat, c64};

/// Aggregate owner of all per-problem storage plus the diagnostics of the
/// most recent propagation.
///
/// The diagnostics (`restarts`, `n_leja`, `n_a`, `radius`) remain readable
/// after a successful call and are reset at the start of the next one.
pub struct NewtonWorkspace {
    /// Krylov basis, one vector per column, `dim × (m_max + 1)`.
    pub(crate) basis: Mat<c64>,
    /// Extended Hessenberg storage of side `m_max + 1`.
    pub(crate) hess: Mat<c64>,
    /// The current restart seed (unit norm between restarts).
    pub(crate) seed: Mat<c64>,
    /// Scratch column for the Arnoldi residual and seed reconstruction.
    pub(crate) work: Mat<c64>,
    /// The global Leja sequence across all restarts of one call.
    pub(crate) leja: Vec<c64>,
    /// Newton coefficients aligned with the Leja sequence.
    pub(crate) coeffs: Vec<c64>,
    /// Ritz-value candidate pool, rebuilt every restart.
    pub(crate) ritz: Vec<c64>,
    /// Newton-basis state vector of the projected recurrence.
    pub(crate) poly_r: Vec<c64>,
    /// Double buffer for applying the shifted Hessenberg to `poly_r`.
    pub(crate) poly_tmp: Vec<c64>,
    /// Accumulated Newton-polynomial image of β·e₁.
    pub(crate) poly_p: Vec<c64>,
    /// Scaling radius fixed from the first restart's Ritz spectrum.
    pub(crate) radius: f64,
    /// Number of valid Newton coefficients.
    pub(crate) n_a: usize,
    /// Number of selected Leja points.
    pub(crate) n_leja: usize,
    /// Restart count of the last call.
    pub(crate) restarts: usize,
    pub(crate) m_max: usize,
    pub(crate) dim: usize,
}

impl NewtonWorkspace {
    /// Creates a workspace for vectors shaped like `prototype` and Krylov
    /// dimensions up to `m_max`.
    ///
    /// A Krylov dimension equal to the problem dimension would be
    /// ill-posed (the basis already spans the whole space), so `m_max` is
    /// clamped to `len − 1`. Problems of dimension one and two are exempt:
    /// they need the full dimension to drive the expansion, and the
    /// Arnoldi extension step terminates them through an immediate
    /// invariant-subspace breakdown instead.
    ///
    /// # Panics
    ///
    /// Panics if `prototype` is not a nonempty column vector or `m_max`
    /// is zero.
    pub fn new(prototype: faer::MatRef<'_, c64>, m_max: usize) -> Self {
        assert_eq!(
            prototype.ncols(),
            1,
            "NewtonWorkspace: the prototype must be a column vector.",
        );
        let dim = prototype.nrows();
        assert!(dim > 0, "NewtonWorkspace: the prototype must be nonempty.");
        assert!(m_max > 0, "NewtonWorkspace: m_max must be positive.");

        let cap = if dim <= 2 { dim } else { dim - 1 };
        let m_max = m_max.min(cap);
        let zero = c64::new(0.0, 0.0);
        Self {
            basis: Mat::zeros(dim, m_max + 1),
            hess: Mat::zeros(m_max + 1, m_max + 1),
            seed: Mat::zeros(dim, 1),
            work: Mat::zeros(dim, 1),
            leja: vec![zero; 10 * m_max + 1],
            coeffs: vec![zero; 10 * m_max + 1],
            ritz: Vec::with_capacity(m_max * (m_max + 1) / 2),
            poly_r: vec![zero; m_max + 1],
            poly_tmp: vec![zero; m_max + 1],
            poly_p: vec![zero; m_max + 1],
            radius: 0.0,
            n_a: 0,
            n_leja: 0,
            restarts: 0,
            m_max,
            dim,
        }
    }

    /// The clamped maximum Krylov dimension.
    pub fn m_max(&self) -> usize {
        self.m_max
    }

    /// The problem dimension the workspace was shaped for.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Restarts performed by the last propagation.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Leja points accumulated by the last propagation.
    pub fn n_leja(&self) -> usize {
        self.n_leja
    }

    /// Newton coefficients accumulated by the last propagation.
    pub fn n_a(&self) -> usize {
        self.n_a
    }

    /// Scaling radius fixed by the last propagation.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Zero-resets all state carried over from a previous call.
    pub(crate) fn reset(&mut self) {
        let zero = c64::new(0.0, 0.0);
        self.basis.as_mut().fill(zero);
        self.hess.as_mut().fill(zero);
        self.leja.fill(zero);
        self.coeffs.fill(zero);
        self.ritz.clear();
        self.poly_r.fill(zero);
        self.poly_tmp.fill(zero);
        self.poly_p.fill(zero);
        self.radius = 0.0;
        self.n_a = 0;
        self.n_leja = 0;
        self.restarts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prototype(n: usize) -> Mat<c64> {
        Mat::zeros(n, 1)
    }

    #[test]
    fn test_buffer_shapes() {
        let p = prototype(32);
        let wrk = NewtonWorkspace::new(p.as_ref(), 10);
        assert_eq!(wrk.m_max(), 10);
        assert_eq!(wrk.dim(), 32);
        assert_eq!(wrk.basis.nrows(), 32);
        assert_eq!(wrk.basis.ncols(), 11);
        assert_eq!(wrk.hess.nrows(), 11);
        assert_eq!(wrk.leja.len(), 101);
        assert_eq!(wrk.coeffs.len(), 101);
    }

    #[test]
    fn test_m_max_clamped_to_dimension_minus_one() {
        let p = prototype(8);
        let wrk = NewtonWorkspace::new(p.as_ref(), 8);
        assert_eq!(wrk.m_max(), 7);
        let wrk = NewtonWorkspace::new(p.as_ref(), 100);
        assert_eq!(wrk.m_max(), 7);
    }

    #[test]
    fn test_tiny_problems_keep_their_full_dimension() {
        let p = prototype(1);
        let wrk = NewtonWorkspace::new(p.as_ref(), 10);
        assert_eq!(wrk.m_max(), 1);
        let p = prototype(2);
        let wrk = NewtonWorkspace::new(p.as_ref(), 10);
        assert_eq!(wrk.m_max(), 2);
        let wrk = NewtonWorkspace::new(p.as_ref(), 1);
        assert_eq!(wrk.m_max(), 1);
    }

    #[test]
    fn test_reset_clears_diagnostics() {
        let p = prototype(4);
        let mut wrk = NewtonWorkspace::new(p.as_ref(), 3);
        wrk.n_a = 5;
        wrk.n_leja = 5;
        wrk.restarts = 2;
        wrk.radius = 1.5;
        wrk.reset();
        assert_eq!(wrk.n_a(), 0);
        assert_eq!(wrk.n_leja(), 0);
        assert_eq!(wrk.restarts(), 0);
        assert_eq!(wrk.radius(), 0.0);
    }
}
