//! Pipe module: friction diagnostics on a pass-through stream.
//!
//! Advances before synchronizing, so its inflow port accepts records that
//! trail the local time by one step.

use super::quantities::{
    self, TIME_UNIT, apply_to_latest, carry_forward_all, read_record, stream_phase,
};
use crate::boundary::BoundaryCondition;
use crate::error::{SimError, SimResult};
use crate::module::{Module, publish_from_phase, unknown_port};
use crate::port::{PortSpec, Reply};
use crate::run::{LoopOrder, RunConfig};
use bop_components::{CORRELATIONS, Pipe, ramped_flow};
use bop_core::UnitSystem;
use bop_core::units::{kgps, m};
use bop_fluids::PropertyOracle;
use bop_results::{Phase, Quantity};
use std::sync::Arc;

pub const INFLOW: &str = "inflow";
pub const OUTFLOW: &str = "outflow";

static PORTS: [PortSpec; 2] = [PortSpec::inflow(INFLOW).lagging(), PortSpec::outflow(OUTFLOW)];

#[derive(Debug, Clone)]
pub struct PipeParams {
    pub diameter_m: f64,
    pub roughness_m: f64,
    /// Sweep the mass flow linearly from 0 at t = 0 to this peak [kg/s] at
    /// the end time, ignoring the inflow rate.
    pub flow_ramp: Option<f64>,
    pub inflow: BoundaryCondition,
}

impl Default for PipeParams {
    fn default() -> Self {
        Self {
            diameter_m: 0.2,
            roughness_m: 0.061e-3,
            flow_ramp: None,
            inflow: BoundaryCondition::from_si(400.0, 12.8e6, 666.0),
        }
    }
}

pub struct PipeModule {
    name: String,
    oracle: Arc<dyn PropertyOracle>,
    units: UnitSystem,
    config: RunConfig,
    flow_ramp: Option<f64>,
    model: Pipe,
    inflow: Phase,
    outflow: Phase,
    state: Phase,
}

fn factor_name(key: &str) -> String {
    format!("{key}_f")
}

fn drop_name(key: &str) -> String {
    format!("{key}_dp")
}

impl PipeModule {
    /// The loop order is forced to `StepThenSync`.
    pub fn new(
        name: impl Into<String>,
        oracle: Arc<dyn PropertyOracle>,
        params: PipeParams,
        config: RunConfig,
        units: UnitSystem,
    ) -> SimResult<Self> {
        let config = config.with_order(LoopOrder::StepThenSync);
        config.validate()?;
        let model = Pipe::new(m(params.diameter_m), m(params.roughness_m))?;
        if let Some(peak) = params.flow_ramp {
            if !(peak.is_finite() && peak >= 0.0) {
                return Err(SimError::InvalidConfig {
                    what: "pipe flow ramp peak must be non-negative",
                });
            }
        }
        let t0 = config.initial_time;

        let mut diagnostics = vec![
            Quantity::new("reynolds", "", 0.0)
                .formal("Re")
                .latex(r"$Re$")
                .info("Reynolds number"),
            Quantity::new("velocity", "m/s", 0.0)
                .formal("v")
                .latex(r"$v$")
                .info("mean flow velocity"),
        ];
        for c in CORRELATIONS.iter() {
            diagnostics.push(
                Quantity::new(factor_name(c.key), "", 0.0)
                    .formal("f")
                    .latex(r"$f$")
                    .info(format!("{} friction factor", c.label)),
            );
            diagnostics.push(
                Quantity::new(drop_name(c.key), "Pa/m", 0.0)
                    .formal("dP")
                    .latex(r"$\Delta P$")
                    .info(format!("{} pressure drop per unit length", c.label)),
            );
        }

        Ok(Self {
            name: name.into(),
            oracle,
            units,
            flow_ramp: params.flow_ramp,
            model,
            inflow: stream_phase(t0, &params.inflow, "inflow")?,
            outflow: stream_phase(t0, &params.inflow, "outflow")?,
            state: Phase::new(t0, TIME_UNIT, diagnostics)?,
            config,
        })
    }

    pub fn state_phase(&self) -> &Phase {
        &self.state
    }

    pub fn outflow_phase(&self) -> &Phase {
        &self.outflow
    }
}

impl Module for PipeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "pipe"
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
        let mut stream = read_record(&self.inflow, time)?;
        if let Some(peak) = self.flow_ramp {
            stream.mass_flowrate = kgps(ramped_flow(next, self.config.end_time, peak));
        }
        let diagnostics = self.model.evaluate(self.oracle.as_ref(), &stream.stream())?;

        carry_forward_all(&mut [&mut self.inflow, &mut self.outflow, &mut self.state], time, next)?;
        quantities::write_record(&mut self.outflow, &stream, next)?;
        self.state.set_value("reynolds", diagnostics.reynolds, next)?;
        self.state.set_value("velocity", diagnostics.velocity, next)?;
        for estimate in &diagnostics.estimates {
            self.state.set_value(&factor_name(estimate.key), estimate.factor, next)?;
            self.state.set_value(&drop_name(estimate.key), estimate.pressure_drop, next)?;
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
