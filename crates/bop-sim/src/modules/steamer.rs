//! Steam generator module: counter-flow exchanger between the primary loop
//! and the boiling secondary.
//!
//! The secondary volume temperature is integrated past saturation while the
//! stream boils; that bulk value is kept in the state history so the next step
//! resumes from it, and the outflow reports `T_sat` with a vapor quality.

use super::quantities::{
    self, TIME_UNIT, apply_to_latest, carry_forward_all, read_record, stream_phase,
};
use crate::boundary::BoundaryCondition;
use crate::error::SimResult;
use crate::module::{Module, publish_from_phase, unknown_port};
use crate::port::{PortSpec, Reply};
use crate::run::RunConfig;
use bop_components::CounterflowExchanger;
use bop_components::heat_exchanger::DEFAULT_NTU;
use bop_core::UnitSystem;
use bop_core::units::{k, m3};
use bop_fluids::PropertyOracle;
use bop_results::{Phase, Quantity};
use bop_solver::OdeOptions;
use std::sync::Arc;

pub const PRIMARY_INFLOW: &str = "primary-inflow";
pub const SECONDARY_INFLOW: &str = "secondary-inflow";
pub const PRIMARY_OUTFLOW: &str = "primary-outflow";
pub const SECONDARY_OUTFLOW: &str = "secondary-outflow";

static PORTS: [PortSpec; 4] = [
    PortSpec::inflow(PRIMARY_INFLOW),
    PortSpec::inflow(SECONDARY_INFLOW),
    PortSpec::outflow(PRIMARY_OUTFLOW),
    PortSpec::outflow(SECONDARY_OUTFLOW),
];

#[derive(Debug, Clone)]
pub struct SteamerParams {
    pub primary_volume_m3: f64,
    pub secondary_volume_m3: f64,
    pub ntu: f64,
    pub primary_inflow: BoundaryCondition,
    pub secondary_inflow: BoundaryCondition,
    pub initial_primary_outflow_temperature_k: f64,
    pub ode: OdeOptions,
}

impl Default for SteamerParams {
    fn default() -> Self {
        Self {
            primary_volume_m3: 1.0,
            secondary_volume_m3: 0.5,
            ntu: DEFAULT_NTU,
            primary_inflow: BoundaryCondition::from_si(594.15, 12.8e6, 666.0),
            secondary_inflow: BoundaryCondition::from_si(422.0, 3.4e6, 67.0),
            initial_primary_outflow_temperature_k: 565.0,
            ode: OdeOptions::default(),
        }
    }
}

pub struct Steamer {
    name: String,
    oracle: Arc<dyn PropertyOracle>,
    units: UnitSystem,
    config: RunConfig,
    params: SteamerParams,
    model: CounterflowExchanger,
    primary_inflow: Phase,
    secondary_inflow: Phase,
    primary_outflow: Phase,
    secondary_outflow: Phase,
    state: Phase,
}

impl Steamer {
    pub fn new(
        name: impl Into<String>,
        oracle: Arc<dyn PropertyOracle>,
        params: SteamerParams,
        config: RunConfig,
        units: UnitSystem,
    ) -> SimResult<Self> {
        config.validate()?;
        let model = CounterflowExchanger::new(
            m3(params.primary_volume_m3),
            m3(params.secondary_volume_m3),
            params.ntu,
        )?;
        let t0 = config.initial_time;
        let primary_in = params.primary_inflow;
        let secondary_in = params.secondary_inflow;

        let primary_outflow = stream_phase(
            t0,
            &BoundaryCondition::from_si(
                params.initial_primary_outflow_temperature_k,
                primary_in.pressure.value,
                primary_in.mass_flowrate.value,
            ),
            "primary outflow",
        )?;
        let mut secondary_quantities = quantities::stream_quantities(&secondary_in, "secondary outflow");
        secondary_quantities.push(quantities::quality(0.0, "secondary outflow vapor quality"));
        let secondary_outflow = Phase::new(t0, TIME_UNIT, secondary_quantities)?;

        let state = Phase::new(
            t0,
            TIME_UNIT,
            vec![
                Quantity::new("heat_flux", "W", 0.0)
                    .formal("Q")
                    .latex(r"$\dot{Q}$")
                    .info("heat rate into the primary (negative when cooling)"),
                Quantity::new("tau_p", "s", 0.0)
                    .formal("tau_p")
                    .latex(r"$\tau_p$")
                    .info("primary residence time"),
                Quantity::new("tau_s", "s", 0.0)
                    .formal("tau_s")
                    .latex(r"$\tau_s$")
                    .info("secondary residence time"),
                Quantity::new("secondary_bulk_temp", "K", secondary_in.temperature.value)
                    .formal("T_s")
                    .latex(r"$T_s$")
                    .info("integrated secondary volume temperature"),
            ],
        )?;

        Ok(Self {
            name: name.into(),
            oracle,
            units,
            config,
            model,
            primary_inflow: stream_phase(t0, &primary_in, "primary inflow")?,
            secondary_inflow: stream_phase(t0, &secondary_in, "secondary inflow")?,
            primary_outflow,
            secondary_outflow,
            state,
            params,
        })
    }

    pub fn primary_outflow_phase(&self) -> &Phase {
        &self.primary_outflow
    }

    pub fn secondary_outflow_phase(&self) -> &Phase {
        &self.secondary_outflow
    }

    pub fn state_phase(&self) -> &Phase {
        &self.state
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

impl Module for Steamer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "steamer"
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
            PRIMARY_OUTFLOW => publish_from_phase(&self.primary_outflow, time),
            SECONDARY_OUTFLOW => publish_from_phase(&self.secondary_outflow, time),
            _ => Err(unknown_port(&self.name, port)),
        }
    }

    fn accept(&mut self, port: &str, record: BoundaryCondition) -> SimResult<()> {
        match port {
            PRIMARY_INFLOW => apply_to_latest(&mut self.primary_inflow, &record),
            SECONDARY_INFLOW => apply_to_latest(&mut self.secondary_inflow, &record),
            _ => Err(unknown_port(&self.name, port)),
        }
    }

    fn step(&mut self, time: f64, dt: f64) -> SimResult<()> {
        let next = time + dt;
        let primary = read_record(&self.primary_inflow, time)?;
        let secondary = read_record(&self.secondary_inflow, time)?;
        let tp = self.primary_outflow.get_value("temp", time)?;
        let ts = self.state.get_value("secondary_bulk_temp", time)?;

        let result = self.model.step(
            self.oracle.as_ref(),
            k(tp),
            k(ts),
            &primary.stream(),
            &secondary.stream(),
            time,
            dt,
            &self.params.ode,
        )?;

        carry_forward_all(
            &mut [
                &mut self.primary_inflow,
                &mut self.secondary_inflow,
                &mut self.primary_outflow,
                &mut self.secondary_outflow,
                &mut self.state,
            ],
            time,
            next,
        )?;

        let primary_out = BoundaryCondition::new(
            result.primary_outflow_temperature,
            primary.pressure,
            primary.mass_flowrate,
        );
        quantities::write_record(&mut self.primary_outflow, &primary_out, next)?;
        let secondary_out = BoundaryCondition::new(
            result.secondary_outflow_temperature,
            secondary.pressure,
            secondary.mass_flowrate,
        )
        .with_quality(result.secondary_quality);
        quantities::write_record(&mut self.secondary_outflow, &secondary_out, next)?;

        self.state.set_value("heat_flux", result.heat_rate.value, next)?;
        self.state.set_value("tau_p", finite_or_zero(result.tau_primary), next)?;
        self.state.set_value("tau_s", finite_or_zero(result.tau_secondary), next)?;
        self.state.set_value(
            "secondary_bulk_temp",
            result.secondary_bulk_temperature.value,
            next,
        )?;

        tracing::trace!(
            module = %self.name,
            time = next,
            tp = result.primary_outflow_temperature.value,
            ts = result.secondary_outflow_temperature.value,
            quality = result.secondary_quality,
            boiling = result.boiling,
            "steamer step"
        );
        Ok(())
    }

    fn phases(&self) -> Vec<(&'static str, &Phase)> {
        vec![
            ("primary_inflow", &self.primary_inflow),
            ("secondary_inflow", &self.secondary_inflow),
            ("primary_outflow", &self.primary_outflow),
            ("secondary_outflow", &self.secondary_outflow),
            ("state", &self.state),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::run_module;
    use crate::sync::PortSet;
    use bop_fluids::SurrogateWater;

    fn params() -> SteamerParams {
        SteamerParams {
            primary_inflow: BoundaryCondition::from_si(580.0, 12.8e6, 666.0),
            initial_primary_outflow_temperature_k: 560.0,
            ..SteamerParams::default()
        }
    }

    #[test]
    fn primary_cools_and_secondary_heats() {
        let config = RunConfig {
            end_time: 300.0,
            ..RunConfig::default()
        };
        let mut m = Steamer::new(
            "steamer",
            Arc::new(SurrogateWater::new()),
            params(),
            config,
            UnitSystem::default(),
        )
        .unwrap();
        run_module(&mut m, &PortSet::new()).unwrap();

        let tp = m.primary_outflow_phase().latest_value("temp").unwrap();
        assert!(tp < 580.0, "primary outflow {tp}");
        let q = m.state_phase().latest_value("heat_flux").unwrap();
        assert!(q < 0.0, "heat flux {q}");
        let ts = m.secondary_outflow_phase().latest_value("temp").unwrap();
        assert!(ts > 422.0, "secondary outflow {ts}");
        let x = m.secondary_outflow_phase().latest_value("quality").unwrap();
        assert!((0.0..=1.0).contains(&x));
    }

    #[test]
    fn secondary_outflow_publishes_quality() {
        let m = Steamer::new(
            "steamer",
            Arc::new(SurrogateWater::new()),
            params(),
            RunConfig::default(),
            UnitSystem::default(),
        )
        .unwrap();
        let reply = m.publish(SECONDARY_OUTFLOW, 0.0).unwrap();
        assert_eq!(reply.record.quality, Some(0.0));
        let reply = m.publish(PRIMARY_OUTFLOW, 0.0).unwrap();
        assert_eq!(reply.record.quality, None);
    }
}
