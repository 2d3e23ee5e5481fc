//! Cooling tower module: closed-form outflow at a fixed state, mass flow
//! passed through. Advances before synchronizing, like the pipe.

use super::quantities::{self, apply_to_latest, carry_forward_all, read_record, stream_phase};
use crate::boundary::BoundaryCondition;
use crate::error::SimResult;
use crate::module::{Module, publish_from_phase, unknown_port};
use crate::port::{PortSpec, Reply};
use crate::run::{LoopOrder, RunConfig};
use bop_components::CoolingTower;
use bop_core::UnitSystem;
use bop_core::units::{k, pa};
use bop_results::Phase;

pub const INFLOW: &str = "inflow";
pub const OUTFLOW: &str = "outflow";

static PORTS: [PortSpec; 2] = [PortSpec::inflow(INFLOW).lagging(), PortSpec::outflow(OUTFLOW)];

#[derive(Debug, Clone)]
pub struct CoolingTowerParams {
    pub outflow_temperature_k: f64,
    pub outflow_pressure_pa: f64,
    pub inflow: BoundaryCondition,
}

impl Default for CoolingTowerParams {
    fn default() -> Self {
        Self {
            outflow_temperature_k: 50.0 + 273.15,
            outflow_pressure_pa: 34.0e5,
            inflow: BoundaryCondition::from_si(293.0, 0.008066866e6, 67.0),
        }
    }
}

pub struct CoolingTowerModule {
    name: String,
    units: UnitSystem,
    config: RunConfig,
    model: CoolingTower,
    inflow: Phase,
    outflow: Phase,
}

impl CoolingTowerModule {
    /// The loop order is forced to `StepThenSync`.
    pub fn new(
        name: impl Into<String>,
        params: CoolingTowerParams,
        config: RunConfig,
        units: UnitSystem,
    ) -> SimResult<Self> {
        let config = config.with_order(LoopOrder::StepThenSync);
        config.validate()?;
        let model = CoolingTower::new(
            k(params.outflow_temperature_k),
            pa(params.outflow_pressure_pa),
        )?;
        let first = BoundaryCondition::from(model.update(&params.inflow.stream())?);
        let t0 = config.initial_time;
        Ok(Self {
            name: name.into(),
            units,
            config,
            model,
            inflow: stream_phase(t0, &params.inflow, "inflow")?,
            outflow: stream_phase(t0, &first, "outflow")?,
        })
    }

    pub fn outflow_phase(&self) -> &Phase {
        &self.outflow
    }
}

impl Module for CoolingTowerModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "cooling_tower"
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

    fn accept(&mut self, port: &str, record: BoundaryCondition) -> SimResult<()> {
        match port {
            INFLOW => apply_to_latest(&mut self.inflow, &record),
            _ => Err(unknown_port(&self.name, port)),
        }
    }

    fn step(&mut self, time: f64, dt: f64) -> SimResult<()> {
        let next = time + dt;
        let inflow = read_record(&self.inflow, time)?;
        let outflow = BoundaryCondition::from(self.model.update(&inflow.stream())?);
        carry_forward_all(&mut [&mut self.inflow, &mut self.outflow], time, next)?;
        quantities::write_record(&mut self.outflow, &outflow, next)
    }

    fn phases(&self) -> Vec<(&'static str, &Phase)> {
        vec![("inflow", &self.inflow), ("outflow", &self.outflow)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outflow_is_fixed_and_flow_passes_through() {
        let mut m = CoolingTowerModule::new(
            "tower",
            CoolingTowerParams::default(),
            RunConfig::default(),
            UnitSystem::default(),
        )
        .unwrap();
        m.accept(INFLOW, BoundaryCondition::from_si(320.0, 9.0e3, 42.0)).unwrap();
        m.step(0.0, 10.0).unwrap();
        let reply = m.publish(OUTFLOW, 10.0).unwrap();
        assert_eq!(reply.time, 10.0);
        assert_eq!(reply.record.temperature.value, 323.15);
        assert_eq!(reply.record.pressure.value, 34.0e5);
        assert_eq!(reply.record.mass_flowrate.value, 42.0);
    }
}
