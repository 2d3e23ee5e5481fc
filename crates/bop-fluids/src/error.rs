//! Fluid property errors.

use bop_core::BopError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during property lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of the backend's valid range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<BopError> for FluidError {
    fn from(err: BopError) -> Self {
        match err {
            BopError::NonFinite { what, .. } => FluidError::NonPhysical { what },
            BopError::OutOfRange { what, .. } => FluidError::OutOfRange { what },
            BopError::InvalidArg { what } => FluidError::InvalidArg { what },
            BopError::Invariant { what } => FluidError::NonPhysical { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "pressure" };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }

    #[test]
    fn core_error_maps_to_fluid_error() {
        let err: FluidError = BopError::OutOfRange {
            what: "quality",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        }
        .into();
        assert_eq!(err, FluidError::OutOfRange { what: "quality" });
    }
}
