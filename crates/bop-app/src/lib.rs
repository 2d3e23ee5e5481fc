//! Shared application service layer for the balance-of-plant simulator.
//!
//! Turns a project file into a running module network, persists the
//! resulting histories and answers queries against stored runs. The CLI is a
//! thin shell over this crate.

pub mod compile;
pub mod error;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use compile::{build_module, build_oracle, compile_network, ode_options, run_config};
pub use error::{AppError, AppResult};
pub use project_service::{ModuleSummary, list_modules, load_project, validate_project};
pub use query::{extract_series, list_series, series_to_csv};
pub use run_service::{RunOptions, RunRequest, RunResponse, ensure_run, list_runs, load_run};
