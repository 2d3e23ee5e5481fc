//! Query helpers for extracting data from loaded runs.

use bop_results::{HistoryRecord, TimeSeries};
use std::fmt::Write;

use crate::error::{AppError, AppResult};

/// `(module, phase, quantity)` for every stored series, in store order.
pub fn list_series(records: &[HistoryRecord]) -> Vec<(String, String, String)> {
    records
        .iter()
        .map(|r| {
            (
                r.module.clone(),
                r.phase.clone(),
                r.series.quantity.name.clone(),
            )
        })
        .collect()
}

pub fn extract_series<'a>(
    records: &'a [HistoryRecord],
    module: &str,
    phase: &str,
    quantity: &str,
) -> AppResult<&'a TimeSeries> {
    if !records.iter().any(|r| r.module == module) {
        return Err(AppError::InvalidInput(format!("Unknown module: {}", module)));
    }
    records
        .iter()
        .find(|r| r.module == module && r.phase == phase && r.series.quantity.name == quantity)
        .map(|r| &r.series)
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "No series {} in phase {} of module {}",
                quantity, phase, module
            ))
        })
}

/// Two-column CSV with a header naming both units.
pub fn series_to_csv(series: &TimeSeries) -> String {
    let mut csv = format!("time [{}],{}\n", series.time_unit, series.quantity.label());
    for point in &series.points {
        let _ = writeln!(csv, "{},{}", point.time, point.value);
    }
    csv
}
