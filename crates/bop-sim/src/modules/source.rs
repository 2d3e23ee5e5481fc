//! Fixed boundary source; stands in for the reactor in plant runs.

use super::quantities::{self, TIME_UNIT, carry_forward_all};
use crate::boundary::BoundaryCondition;
use crate::error::{SimError, SimResult};
use crate::module::{Module, publish_from_phase, unknown_port};
use crate::port::{PortSpec, Reply};
use crate::run::RunConfig;
use bop_core::UnitSystem;
use bop_results::Phase;

pub const OUTFLOW: &str = "outflow";

static PORTS: [PortSpec; 1] = [PortSpec::outflow(OUTFLOW)];

/// Replace the published record from `time` [s] on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepChange {
    pub time: f64,
    pub record: BoundaryCondition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceParams {
    pub record: BoundaryCondition,
    pub step_change: Option<StepChange>,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            record: BoundaryCondition::from_si(594.15, 12.8e6, 666.0),
            step_change: None,
        }
    }
}

pub struct Source {
    name: String,
    units: UnitSystem,
    config: RunConfig,
    params: SourceParams,
    outflow: Phase,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        params: SourceParams,
        config: RunConfig,
        units: UnitSystem,
    ) -> SimResult<Self> {
        config.validate()?;
        let records = std::iter::once(&params.record)
            .chain(params.step_change.as_ref().map(|s| &s.record));
        let mut carries_power = false;
        for record in records {
            record.check(&[]).map_err(|_| SimError::InvalidConfig {
                what: "source record must be physical",
            })?;
            carries_power |= record.power.is_some();
        }

        let t0 = config.initial_time;
        let first = params.record;
        let mut defs = quantities::stream_quantities(&first, "source");
        if carries_power {
            let p = first.power.map(|p| p.value).unwrap_or(0.0);
            defs.push(quantities::power(p, "source power"));
        }
        Ok(Self {
            name: name.into(),
            units,
            config,
            params,
            outflow: Phase::new(t0, TIME_UNIT, defs)?,
        })
    }

    /// Record in force at `time`.
    pub fn record_at(&self, time: f64) -> BoundaryCondition {
        match self.params.step_change {
            Some(change) if time >= change.time => change.record,
            _ => self.params.record,
        }
    }

    pub fn outflow_phase(&self) -> &Phase {
        &self.outflow
    }
}

impl Module for Source {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "source"
    }

    fn ports(&self) -> &'static [PortSpec] {
        &PORTS
    }

    fn config(&self) -> &RunConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut RunConfig {
        &mut self.config
    }

    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn publish(&self, port: &str, time: f64) -> SimResult<Reply> {
        match port {
            OUTFLOW => publish_from_phase(&self.outflow, time),
            _ => Err(unknown_port(&self.name, port)),
        }
    }

    fn accept(&mut self, port: &str, _record: BoundaryCondition) -> SimResult<()> {
        Err(unknown_port(&self.name, port))
    }

    fn step(&mut self, time: f64, dt: f64) -> SimResult<()> {
        let next = time + dt;
        let mut record = self.record_at(next);
        if record.power.is_none() && self.outflow.quantity("power").is_some() {
            record = record.with_power(0.0);
        }
        carry_forward_all(&mut [&mut self.outflow], time, next)?;
        quantities::write_record(&mut self.outflow, &record, next)
    }

    fn phases(&self) -> Vec<(&'static str, &Phase)> {
        vec![("outflow", &self.outflow)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::run_module;
    use crate::sync::PortSet;

    #[test]
    fn step_change_applies_from_its_time() {
        let params = SourceParams {
            record: BoundaryCondition::from_si(594.15, 12.8e6, 666.0).with_power(1.0e8),
            step_change: Some(StepChange {
                time: 50.0,
                record: BoundaryCondition::from_si(560.0, 12.8e6, 666.0),
            }),
        };
        let config = RunConfig {
            end_time: 100.0,
            ..RunConfig::default()
        };
        let mut m = Source::new("reactor", params, config, UnitSystem::default()).unwrap();
        run_module(&mut m, &PortSet::new()).unwrap();

        let before = m.publish(OUTFLOW, 45.0).unwrap();
        assert_eq!(before.time, 40.0);
        assert_eq!(before.record.temperature.value, 594.15);
        assert_eq!(before.record.power.map(|p| p.value), Some(1.0e8));

        let after = m.publish(OUTFLOW, 50.0).unwrap();
        assert_eq!(after.record.temperature.value, 560.0);
        assert_eq!(after.record.power.map(|p| p.value), Some(0.0));
    }

    #[test]
    fn source_has_no_inflow() {
        let mut m = Source::new(
            "reactor",
            SourceParams::default(),
            RunConfig::default(),
            UnitSystem::default(),
        )
        .unwrap();
        assert!(m.accept("inflow", SourceParams::default().record).is_err());
        assert!(m.outflow_phase().quantity("power").is_none());
    }
}
