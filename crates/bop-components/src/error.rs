//! Error types for component physics.

use bop_core::BopError;
use bop_fluids::{FluidError, FluidPhase};
use bop_solver::SolverError;
use thiserror::Error;

/// Errors raised while advancing a component model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// A single-phase model left its phase envelope.
    #[error("Phase violation in {what}: expected liquid, found {found:?} at T={t_k:.3} K, P={p_pa:.1} Pa")]
    PhaseViolation {
        what: &'static str,
        found: FluidPhase,
        t_k: f64,
        p_pa: f64,
    },

    /// An input fell outside a hard validity bound of the model.
    #[error("{what} = {value} outside [{min}, {max}]")]
    OutOfEnvelope {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The ODE step engine could not certify the step.
    #[error("Integration failure: {message}")]
    Integration { message: String },

    #[error("Fluid property error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<SolverError> for ComponentError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::IntegrationFailure { message } => ComponentError::Integration { message },
            other => ComponentError::Integration {
                message: other.to_string(),
            },
        }
    }
}

impl From<BopError> for ComponentError {
    fn from(e: BopError) -> Self {
        match e {
            BopError::OutOfRange {
                what,
                value,
                min,
                max,
            } => ComponentError::OutOfEnvelope {
                what,
                value,
                min,
                max,
            },
            BopError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            BopError::InvalidArg { what } => ComponentError::InvalidArg { what },
            BopError::Invariant { what } => ComponentError::NonPhysical { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::PhaseViolation {
            what: "water heater",
            found: FluidPhase::Vapor,
            t_k: 500.0,
            p_pa: 2.0e6,
        };
        let text = err.to_string();
        assert!(text.contains("water heater"));
        assert!(text.contains("Vapor"));
    }

    #[test]
    fn solver_failure_keeps_diagnostic() {
        let err: ComponentError = SolverError::IntegrationFailure {
            message: "excess work: 1000 steps".into(),
        }
        .into();
        assert_eq!(
            err,
            ComponentError::Integration {
                message: "excess work: 1000 steps".into()
            }
        );
    }

    #[test]
    fn range_error_becomes_out_of_envelope() {
        let err: ComponentError = BopError::OutOfRange {
            what: "turbine inlet pressure",
            value: 2.0e8,
            min: 1.0,
            max: 1.0e8,
        }
        .into();
        assert!(matches!(err, ComponentError::OutOfEnvelope { .. }));
    }
}
