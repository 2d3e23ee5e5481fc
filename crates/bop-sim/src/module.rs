//! The interface every simulated plant module implements.

use crate::boundary::BoundaryCondition;
use crate::error::{SimError, SimResult};
use crate::port::{PortSpec, Reply};
use crate::run::RunConfig;
use bop_core::UnitSystem;
use bop_results::Phase;

/// One plant component driven by the run loop.
///
/// A module owns its histories exclusively. It is moved onto its own thread
/// for a network run and talks to its neighbors only through ports.
pub trait Module: Send {
    fn name(&self) -> &str;

    /// Short type tag for reports ("water_heater", "turbine", ...).
    fn kind(&self) -> &'static str;

    /// Expected ports in visiting order.
    fn ports(&self) -> &'static [PortSpec];

    fn config(&self) -> &RunConfig;

    fn config_mut(&mut self) -> &mut RunConfig;

    fn units(&self) -> &UnitSystem;

    /// Record published on outflow `port`, from the latest history row at or
    /// before `time`.
    fn publish(&self, port: &str, time: f64) -> SimResult<Reply>;

    /// Apply a record received on inflow `port`.
    fn accept(&mut self, port: &str, record: BoundaryCondition) -> SimResult<()>;

    /// Advance internal state from `time` to `time + dt`, appending one row
    /// at `time + dt` to every phase.
    fn step(&mut self, time: f64, dt: f64) -> SimResult<()>;

    /// Named histories for reporting.
    fn phases(&self) -> Vec<(&'static str, &Phase)>;
}

pub(crate) fn unknown_port(module: &str, port: &str) -> SimError {
    SimError::UnknownPort {
        module: module.to_string(),
        port: port.to_string(),
    }
}

/// Build a reply from a phase holding `temp`, `pressure`, `flowrate` and
/// optionally `quality` and `power`.
pub fn publish_from_phase(phase: &Phase, time: f64) -> SimResult<Reply> {
    let row_time = phase.time_at_or_before(time)?;
    let mut record = BoundaryCondition::from_si(
        phase.get_value("temp", row_time)?,
        phase.get_value("pressure", row_time)?,
        phase.get_value("flowrate", row_time)?,
    );
    if phase.quantity("quality").is_some() {
        record = record.with_quality(phase.get_value("quality", row_time)?);
    }
    if phase.quantity("power").is_some() {
        record = record.with_power(phase.get_value("power", row_time)?);
    }
    Ok(Reply {
        time: row_time,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::quantities;

    #[test]
    fn publishes_latest_row_at_or_before() {
        let bc = BoundaryCondition::from_si(300.0, 1.0e5, 5.0);
        let mut defs = quantities::stream_quantities(&bc, "test");
        defs.push(quantities::power(2.0, "test power"));
        let mut phase = Phase::new(0.0, quantities::TIME_UNIT, defs).unwrap();
        phase.carry_forward(0.0, 10.0).unwrap();
        phase.set_value("temp", 310.0, 10.0).unwrap();

        let reply = publish_from_phase(&phase, 15.0).unwrap();
        assert_eq!(reply.time, 10.0);
        assert_eq!(reply.record.temperature.value, 310.0);
        assert_eq!(reply.record.power.map(|p| p.value), Some(2.0));
        assert_eq!(reply.record.quality, None);

        assert!(publish_from_phase(&phase, -1.0).is_err());
    }
}
