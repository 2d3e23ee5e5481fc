//! Error types for solver operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The integrator could not certify a step within its tolerance and
    /// sub-step budget.
    #[error("Integration failure: {message}")]
    IntegrationFailure { message: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Invalid input: {what}")]
    InvalidInput { what: &'static str },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<bop_core::BopError> for SolverError {
    fn from(e: bop_core::BopError) -> Self {
        SolverError::Numeric {
            what: e.to_string(),
        }
    }
}
