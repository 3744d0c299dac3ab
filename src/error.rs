//! This module defines the custom error types for the library.
//!
//! This module centralizes all failure conditions of the restarted-Arnoldi
//! Newton propagator into a single, comprehensive enum:
//! [`PropagationError`].
//!
//! Using the [`thiserror`] crate allows us to create idiomatic error types
//! with minimal boilerplate. Note that [`faer::linalg::evd::EvdError`] does
//! not implement the standard [`std::error::Error`] trait, so we wrap it
//! manually to provide a compatible error type.
//!
//! An Arnoldi breakdown (invariant Krylov subspace) is deliberately NOT an
//! error anywhere in this crate: it is a successful short-circuit.
use thiserror::Error;

/// Represents all possible errors that can occur during a propagation.
///
#[derive(Error, Debug)]
#[error(transparent)]
pub struct PropagationError(#[from] PropagationErrorKind);

/// Private enum containing the distinct kinds of errors.
/// This separation allows for a clean `Display` implementation via
/// [`thiserror`] while handling non-standard error types manually.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum PropagationErrorKind {
    /// Indicates that the dimensions of the operator and the state vector
    /// are incompatible for a matrix-vector product.
    #[error(
        "Dimension mismatch: operator has {operator_rows} rows but state vector has {vector_rows} rows."
    )]
    DimensionMismatch {
        operator_rows: usize,
        vector_rows: usize,
    },

    /// Indicates that an invalid input parameter was provided to a function.
    #[error("Invalid input parameter: {0}")]
    InputError(String),

    /// The running product of scaled node distances underflowed while
    /// extending the Newton divided differences. The coefficients are
    /// numerically meaningless; the caller should reduce the Krylov
    /// dimension or the time step.
    #[error(
        "Divided differences underflowed at coefficient {index}: the Newton expansion is numerically meaningless."
    )]
    DividedDifferenceUnderflow { index: usize },

    /// The restart loop exceeded its iteration budget without satisfying
    /// the convergence criterion. The state vector is undefined on exit.
    #[error("Propagation failed to converge within {max_restarts} restarts.")]
    NoConvergence { max_restarts: usize },

    /// Wraps an error originating from [`faer`]'s eigendecomposition module.
    #[error("A numerical error occurred during the Hessenberg eigendecomposition: {0:?}")]
    EvdError(faer::linalg::evd::EvdError),
}

// Manually implement PartialEq for the public error type.
// We compare the inner `PropagationErrorKind`.
impl PartialEq for PropagationError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
