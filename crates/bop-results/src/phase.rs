//! Append-only state history table.

use crate::quantity::Quantity;
use crate::types::{SeriesPoint, TimeSeries};
use std::collections::HashMap;
use thiserror::Error;

/// Row times closer than this are the same row.
const ROW_TIME_EPS: f64 = 1e-9;

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("No history row at time {time}")]
    NoRowAtTime { time: f64 },

    #[error("No history row at or before time {time} (history starts at {first})")]
    NoRowAtOrBefore { time: f64, first: f64 },

    #[error("Unknown quantity: {name}")]
    UnknownQuantity { name: String },

    #[error("Duplicate quantity: {name}")]
    DuplicateQuantity { name: String },

    #[error("Row time {time} must be after latest time {latest}")]
    NonIncreasingTime { time: f64, latest: f64 },

    #[error("Row has {got} values, phase declares {expected}")]
    RowShape { expected: usize, got: usize },

    #[error("Non-finite time stamp: {time}")]
    NonFiniteTime { time: f64 },
}

/// One complete row of values, ordered like the phase's quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<f64>);

impl Row {
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Time-indexed table of named quantities owned by one module.
///
/// Invariants:
/// - time stamps strictly increase in insertion order
/// - every row holds a value for every declared quantity
/// - `get_value`/`set_value` address an existing row by time
#[derive(Debug, Clone)]
pub struct Phase {
    time_unit: String,
    quantities: Vec<Quantity>,
    index: HashMap<String, usize>,
    times: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl Phase {
    /// Create a phase whose first row at `time_stamp` holds each quantity's value.
    pub fn new(
        time_stamp: f64,
        time_unit: impl Into<String>,
        quantities: Vec<Quantity>,
    ) -> HistoryResult<Self> {
        if !time_stamp.is_finite() {
            return Err(HistoryError::NonFiniteTime { time: time_stamp });
        }
        let mut index = HashMap::with_capacity(quantities.len());
        for (i, q) in quantities.iter().enumerate() {
            if index.insert(q.name.clone(), i).is_some() {
                return Err(HistoryError::DuplicateQuantity {
                    name: q.name.clone(),
                });
            }
        }
        let first = quantities.iter().map(|q| q.value).collect();
        Ok(Self {
            time_unit: time_unit.into(),
            quantities,
            index,
            times: vec![time_stamp],
            rows: vec![first],
        })
    }

    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    pub fn quantity(&self, name: &str) -> Option<&Quantity> {
        self.index.get(name).map(|&i| &self.quantities[i])
    }

    pub fn quantity_names(&self) -> impl Iterator<Item = &str> {
        self.quantities.iter().map(|q| q.name.as_str())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn first_time(&self) -> f64 {
        self.times[0]
    }

    pub fn latest_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    fn column(&self, name: &str) -> HistoryResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| HistoryError::UnknownQuantity {
                name: name.to_string(),
            })
    }

    fn row_index(&self, time: f64) -> HistoryResult<usize> {
        let i = self.times.partition_point(|&t| t < time - ROW_TIME_EPS);
        match self.times.get(i) {
            Some(&t) if (t - time).abs() <= ROW_TIME_EPS => Ok(i),
            _ => Err(HistoryError::NoRowAtTime { time }),
        }
    }

    /// Append a row at `time`, normally a copy of the previous row.
    pub fn add_row(&mut self, time: f64, row: Row) -> HistoryResult<()> {
        if !time.is_finite() {
            return Err(HistoryError::NonFiniteTime { time });
        }
        let latest = self.latest_time();
        if time <= latest + ROW_TIME_EPS {
            return Err(HistoryError::NonIncreasingTime { time, latest });
        }
        if row.0.len() != self.quantities.len() {
            return Err(HistoryError::RowShape {
                expected: self.quantities.len(),
                got: row.0.len(),
            });
        }
        self.times.push(time);
        self.rows.push(row.0);
        Ok(())
    }

    /// Copy the row at `from` forward to a new row at `to`.
    pub fn carry_forward(&mut self, from: f64, to: f64) -> HistoryResult<()> {
        let row = self.get_row(from)?;
        self.add_row(to, row)
    }

    /// Overwrite `name` in the existing row at `time`.
    pub fn set_value(&mut self, name: &str, value: f64, time: f64) -> HistoryResult<()> {
        let col = self.column(name)?;
        let i = self.row_index(time)?;
        self.rows[i][col] = value;
        Ok(())
    }

    pub fn get_value(&self, name: &str, time: f64) -> HistoryResult<f64> {
        let col = self.column(name)?;
        let i = self.row_index(time)?;
        Ok(self.rows[i][col])
    }

    pub fn get_row(&self, time: f64) -> HistoryResult<Row> {
        let i = self.row_index(time)?;
        Ok(Row(self.rows[i].clone()))
    }

    /// Value of `name` in the latest row.
    pub fn latest_value(&self, name: &str) -> HistoryResult<f64> {
        self.get_value(name, self.latest_time())
    }

    /// Time of the latest row at or before `time`.
    pub fn time_at_or_before(&self, time: f64) -> HistoryResult<f64> {
        let i = self.times.partition_point(|&t| t <= time + ROW_TIME_EPS);
        if i == 0 {
            return Err(HistoryError::NoRowAtOrBefore {
                time,
                first: self.first_time(),
            });
        }
        Ok(self.times[i - 1])
    }

    /// Ordered `(time, value)` series for one quantity.
    pub fn history(&self, name: &str) -> HistoryResult<TimeSeries> {
        let col = self.column(name)?;
        let q = &self.quantities[col];
        Ok(TimeSeries {
            quantity: Quantity {
                value: self.rows[self.rows.len() - 1][col],
                ..q.clone()
            },
            time_unit: self.time_unit.clone(),
            points: self
                .times
                .iter()
                .zip(&self.rows)
                .map(|(&time, row)| SeriesPoint {
                    time,
                    value: row[col],
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn outflow_phase() -> Phase {
        Phase::new(
            0.0,
            "s",
            vec![
                Quantity::new("flowrate", "kg/s", 67.0),
                Quantity::new("temp", "K", 293.15),
                Quantity::new("pressure", "Pa", 3.4e6),
            ],
        )
        .unwrap()
    }

    #[test]
    fn first_row_holds_initial_values() {
        let phase = outflow_phase();
        assert_eq!(phase.len(), 1);
        assert_eq!(phase.get_value("temp", 0.0).unwrap(), 293.15);
        assert_eq!(phase.latest_time(), 0.0);
    }

    #[test]
    fn copy_forward_then_overwrite() {
        let mut phase = outflow_phase();
        let row = phase.get_row(0.0).unwrap();
        phase.add_row(10.0, row).unwrap();
        phase.set_value("temp", 300.0, 10.0).unwrap();

        assert_eq!(phase.get_value("temp", 10.0).unwrap(), 300.0);
        assert_eq!(phase.get_value("flowrate", 10.0).unwrap(), 67.0);
        assert_eq!(phase.get_value("temp", 0.0).unwrap(), 293.15);
    }

    #[test]
    fn set_value_without_row_fails() {
        let mut phase = outflow_phase();
        let err = phase.set_value("temp", 300.0, 10.0).unwrap_err();
        assert_eq!(err, HistoryError::NoRowAtTime { time: 10.0 });
        assert!(phase.get_value("temp", 5.0).is_err());
    }

    #[test]
    fn unknown_quantity_fails() {
        let mut phase = outflow_phase();
        assert!(matches!(
            phase.set_value("quality", 1.0, 0.0),
            Err(HistoryError::UnknownQuantity { .. })
        ));
    }

    #[test]
    fn non_increasing_time_rejected() {
        let mut phase = outflow_phase();
        phase.carry_forward(0.0, 10.0).unwrap();
        let row = phase.get_row(10.0).unwrap();
        assert!(matches!(
            phase.add_row(10.0, row.clone()),
            Err(HistoryError::NonIncreasingTime { .. })
        ));
        assert!(phase.add_row(5.0, row).is_err());
    }

    #[test]
    fn duplicate_quantity_rejected() {
        let err = Phase::new(
            0.0,
            "s",
            vec![Quantity::new("temp", "K", 1.0), Quantity::new("temp", "K", 2.0)],
        )
        .unwrap_err();
        assert!(matches!(err, HistoryError::DuplicateQuantity { .. }));
    }

    #[test]
    fn wrong_row_shape_rejected() {
        let mut phase = outflow_phase();
        let err = phase.add_row(1.0, Row(vec![1.0])).unwrap_err();
        assert_eq!(err, HistoryError::RowShape { expected: 3, got: 1 });
    }

    #[test]
    fn at_or_before_lookup() {
        let mut phase = outflow_phase();
        phase.carry_forward(0.0, 10.0).unwrap();
        assert_eq!(phase.time_at_or_before(15.0).unwrap(), 10.0);
        assert_eq!(phase.time_at_or_before(10.0).unwrap(), 10.0);
        assert_eq!(phase.time_at_or_before(9.0).unwrap(), 0.0);
        assert!(matches!(
            phase.time_at_or_before(-1.0),
            Err(HistoryError::NoRowAtOrBefore { .. })
        ));
    }

    #[test]
    fn history_is_ordered_series() {
        let mut phase = outflow_phase();
        for (i, t) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            phase.carry_forward(t - 10.0, t).unwrap();
            phase.set_value("temp", 290.0 + i as f64, t).unwrap();
        }
        let series = phase.history("temp").unwrap();
        let times: Vec<f64> = series.points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(series.points[3].value, 292.0);
        assert_eq!(series.quantity.value, 292.0);
        assert_eq!(series.time_unit, "s");
    }

    proptest! {
        #[test]
        fn appended_times_strictly_increase(steps in proptest::collection::vec(-5.0f64..5.0, 1..40)) {
            let mut phase = outflow_phase();
            for dt in steps {
                let t = phase.latest_time() + dt;
                let row = phase.get_row(phase.latest_time()).unwrap();
                let accepted = phase.add_row(t, row).is_ok();
                prop_assert_eq!(accepted, dt > ROW_TIME_EPS);
            }
            let times = phase.times();
            prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
