//! Turbine module: algebraic expansion every step, no ODE.

use super::quantities::{
    self, TIME_UNIT, apply_to_latest, carry_forward_all, read_record, stream_phase,
};
use crate::boundary::BoundaryCondition;
use crate::error::SimResult;
use crate::module::{Module, publish_from_phase, unknown_port};
use crate::port::{PortSpec, Reply};
use crate::run::RunConfig;
use bop_components::turbine::DEFAULT_EFFICIENCY;
use bop_components::{Expansion, Turbine};
use bop_core::UnitSystem;
use bop_core::units::pa;
use bop_fluids::PropertyOracle;
use bop_results::{Phase, Quantity};
use std::sync::Arc;

pub const INFLOW: &str = "inflow";
pub const OUTFLOW: &str = "outflow";
pub const PROCESS_HEAT: &str = "process-heat";

static PORTS: [PortSpec; 3] = [
    PortSpec::inflow(INFLOW),
    PortSpec::outflow(OUTFLOW),
    PortSpec::outflow(PROCESS_HEAT),
];

#[derive(Debug, Clone)]
pub struct TurbineParams {
    pub efficiency: f64,
    pub outflow_pressure_pa: f64,
    pub inflow: BoundaryCondition,
}

impl Default for TurbineParams {
    fn default() -> Self {
        Self {
            efficiency: DEFAULT_EFFICIENCY,
            outflow_pressure_pa: 0.008066866e6,
            inflow: BoundaryCondition::from_si(580.0, 3.4e6, 67.0),
        }
    }
}

pub struct TurbineModule {
    name: String,
    oracle: Arc<dyn PropertyOracle>,
    units: UnitSystem,
    config: RunConfig,
    model: Turbine,
    inflow: Phase,
    outflow: Phase,
    state: Phase,
}

impl TurbineModule {
    pub fn new(
        name: impl Into<String>,
        oracle: Arc<dyn PropertyOracle>,
        params: TurbineParams,
        config: RunConfig,
        units: UnitSystem,
    ) -> SimResult<Self> {
        config.validate()?;
        let model = Turbine::new(params.efficiency, pa(params.outflow_pressure_pa))?;
        let t0 = config.initial_time;
        let first = model.expand(oracle.as_ref(), &params.inflow.stream())?;
        let exit = exit_record(&model, &params.inflow, &first);

        let mut outflow_quantities = quantities::stream_quantities(&exit, "outflow");
        outflow_quantities.push(quantities::quality(first.quality, "exit vapor quality"));
        outflow_quantities.push(quantities::power(first.power.value, "shaft power"));

        let state = Phase::new(
            t0,
            TIME_UNIT,
            vec![
                Quantity::new("process_heat", "W", first.process_heat.value)
                    .formal("Q_proc")
                    .latex(r"$\dot{Q}_{proc}$")
                    .info("heat rejected by the real expansion"),
                Quantity::new("w_ideal", "J/kg", first.w_ideal)
                    .formal("w_s")
                    .latex(r"$w_s$")
                    .info("isentropic specific work"),
                Quantity::new("w_real", "J/kg", first.w_real)
                    .formal("w")
                    .latex(r"$w$")
                    .info("real specific work"),
                Quantity::new("bypassed", "", bypass_flag(&first))
                    .info("1 when the inlet was below saturation"),
            ],
        )?;

        Ok(Self {
            name: name.into(),
            oracle,
            units,
            config,
            inflow: stream_phase(t0, &params.inflow, "inflow")?,
            outflow: Phase::new(t0, TIME_UNIT, outflow_quantities)?,
            state,
            model,
        })
    }

    pub fn outflow_phase(&self) -> &Phase {
        &self.outflow
    }

    pub fn state_phase(&self) -> &Phase {
        &self.state
    }
}

fn exit_record(model: &Turbine, inflow: &BoundaryCondition, expansion: &Expansion) -> BoundaryCondition {
    BoundaryCondition::new(
        expansion.outflow_temperature,
        model.outflow_pressure,
        inflow.mass_flowrate,
    )
    .with_quality(expansion.quality)
    .with_power(expansion.power.value)
}

fn bypass_flag(expansion: &Expansion) -> f64 {
    if expansion.bypassed { 1.0 } else { 0.0 }
}

impl Module for TurbineModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "turbine"
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
            PROCESS_HEAT => {
                let mut reply = publish_from_phase(&self.outflow, time)?;
                let heat = self.state.get_value("process_heat", reply.time)?;
                reply.record.quality = None;
                reply.record = reply.record.with_power(heat);
                Ok(reply)
            }
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
        let expansion = self.model.expand(self.oracle.as_ref(), &inflow.stream())?;

        carry_forward_all(&mut [&mut self.inflow, &mut self.outflow, &mut self.state], time, next)?;
        quantities::write_record(
            &mut self.outflow,
            &exit_record(&self.model, &inflow, &expansion),
            next,
        )?;
        self.state.set_value("process_heat", expansion.process_heat.value, next)?;
        self.state.set_value("w_ideal", expansion.w_ideal, next)?;
        self.state.set_value("w_real", expansion.w_real, next)?;
        self.state.set_value("bypassed", bypass_flag(&expansion), next)?;

        if expansion.bypassed {
            tracing::debug!(module = %self.name, time = next, "inlet below saturation, no work extracted");
        }
        Ok(())
    }

    fn phases(&self) -> Vec<(&'static str, &Phase)> {
        vec![
            ("inflow", &self.inflow),
            ("outflow", &self.outflow),
            ("state", &self.state),
        ]
    }
}
