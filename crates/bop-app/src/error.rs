//! Error types for the bop-app service layer.

use std::path::PathBuf;

/// Unified error for the service layer. Backend errors are flattened to
/// strings so frontends only ever match on this enum.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Network compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bop-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<bop_project::ProjectError> for AppError {
    fn from(err: bop_project::ProjectError) -> Self {
        match err {
            bop_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<bop_project::ValidationError> for AppError {
    fn from(err: bop_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<bop_sim::SimError> for AppError {
    fn from(err: bop_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<bop_results::ResultsError> for AppError {
    fn from(err: bop_results::ResultsError) -> Self {
        match err {
            bop_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<bop_results::HistoryError> for AppError {
    fn from(err: bop_results::HistoryError) -> Self {
        AppError::Results(err.to_string())
    }
}
