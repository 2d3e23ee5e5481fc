//! Error types for port synchronization and module runs.

use crate::boundary::Field;
use bop_components::ComponentError;
use bop_fluids::FluidError;
use bop_results::HistoryError;
use thiserror::Error;

/// Errors encountered while wiring or running a module network.
#[derive(Error, Debug, Clone)]
pub enum SimError {
    /// A port handshake was out of tolerance or out of causal order.
    #[error("Synchronization mismatch on {module}.{port}: {message}")]
    SynchronizationMismatch {
        module: String,
        port: String,
        message: String,
    },

    #[error("Boundary record on {module}.{port} is missing required field {field}")]
    MissingField {
        module: String,
        port: String,
        field: Field,
    },

    #[error("Invalid boundary record on {module}.{port}: {what}")]
    InvalidRecord {
        module: String,
        port: String,
        what: &'static str,
    },

    /// The peer of a bound port stopped before the handshake completed.
    #[error("Peer of {module}.{port} disconnected")]
    PeerDisconnected { module: String, port: String },

    #[error("Integration failure: {message}")]
    Integration { message: String },

    #[error("Component error: {0}")]
    Component(ComponentError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Fluid property error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Unknown module: {name}")]
    UnknownModule { name: String },

    #[error("Duplicate module name: {name}")]
    DuplicateModule { name: String },

    #[error("Module {module} has no port named {port}")]
    UnknownPort { module: String, port: String },

    #[error("Cannot connect {from} to {to}: {what}")]
    InvalidConnection {
        from: String,
        to: String,
        what: &'static str,
    },

    #[error("Port {module}.{port} is already bound")]
    PortAlreadyBound { module: String, port: String },

    #[error("Connected modules {a} ({a_steps} steps) and {b} ({b_steps} steps) run different schedules")]
    ScheduleMismatch {
        a: String,
        a_steps: usize,
        b: String,
        b_steps: usize,
    },

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Module {module} panicked")]
    ModulePanicked { module: String },

    #[error("Module {module} failed: {source}")]
    ModuleFailed {
        module: String,
        #[source]
        source: Box<SimError>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ComponentError> for SimError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::Integration { message } => SimError::Integration { message },
            other => SimError::Component(other),
        }
    }
}

impl SimError {
    /// Secondary failures caused by another module stopping first.
    pub fn is_disconnect(&self) -> bool {
        match self {
            SimError::PeerDisconnected { .. } => true,
            SimError::ModuleFailed { source, .. } => source.is_disconnect(),
            _ => false,
        }
    }

    /// The innermost error, unwrapping per-module context.
    pub fn root(&self) -> &SimError {
        match self {
            SimError::ModuleFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_failure_is_surfaced_directly() {
        let err: SimError = ComponentError::Integration {
            message: "excess work".into(),
        }
        .into();
        assert!(matches!(err, SimError::Integration { .. }));
    }

    #[test]
    fn disconnect_detection_sees_through_context() {
        let err = SimError::ModuleFailed {
            module: "turbine".into(),
            source: Box::new(SimError::PeerDisconnected {
                module: "turbine".into(),
                port: "inflow".into(),
            }),
        };
        assert!(err.is_disconnect());
        assert!(matches!(err.root(), SimError::PeerDisconnected { .. }));
    }
}
