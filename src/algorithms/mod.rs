//! Low-level building blocks of the restarted Newton propagation.
//!
//! ** NOTE: We recommend using the high-level driver in
//! [`crate::propagator`] instead. These modules are intended for use cases
//! where fine-grained control over the individual algorithmic stages is
//! required, and for testing the stages in isolation.
//!
//! The stages, in the order the driver invokes them on every restart:
//!
//! - [`arnoldi`]: builds the orthonormal Krylov basis and the (extended)
//!   upper-Hessenberg projection of the scaled operator H·dt.
//! - [`spectrum`]: extracts the Ritz values of the leading Hessenberg
//!   blocks, which serve as interpolation-node candidates.
//! - [`leja`]: greedily appends candidates to the global Leja sequence by
//!   product-distance maximization.
//! - [`newton`]: extends the divided-difference coefficients of the scalar
//!   function on the Leja sequence.

pub mod arnoldi;
pub mod leja;
pub mod newton;
pub mod spectrum;

pub use arnoldi::arnoldi;
pub use leja::extend_leja;
pub use newton::extend_newton_coeffs;
pub use spectrum::hessenberg_spectrum;
