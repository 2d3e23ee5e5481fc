//! bop-results: per-module state histories and the on-disk run store.
//!
//! A `Phase` is the append-only, time-indexed table of named quantities that
//! each module owns. Rows are created by copying the previous row forward and
//! then overwriting the values a step recomputed, so every row is complete.

pub mod hash;
pub mod phase;
pub mod quantity;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use phase::{HistoryError, HistoryResult, Phase, Row};
pub use quantity::Quantity;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}
