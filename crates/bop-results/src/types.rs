//! Result data types.

use crate::quantity::Quantity;
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: f64,
    pub value: f64,
}

/// Full ordered history of one quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Definition, with `value` set to the latest value.
    pub quantity: Quantity,
    pub time_unit: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub modules: Vec<ModuleSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    pub kind: String,
    pub initial_time_s: f64,
    /// Last time actually reached, after end-time correction.
    pub end_time_s: f64,
    pub time_step_s: f64,
    pub steps: usize,
}

/// One line of `histories.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub module: String,
    pub phase: String,
    pub series: TimeSeries,
}

/// Current UTC time as RFC 3339, the manifest timestamp format.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
