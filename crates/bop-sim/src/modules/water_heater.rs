//! Water heater module.
//!
//! A single liquid volume heated electrically and through the `external-heat`
//! port (turbine process heat in the plant wiring). During a malfunction
//! window the external input is lost and only the electric heat remains.

use super::quantities::{
    self, TIME_UNIT, apply_to_latest, carry_forward_all, read_record, stream_phase,
};
use crate::boundary::{BoundaryCondition, Field};
use crate::error::{SimError, SimResult};
use crate::module::{Module, publish_from_phase, unknown_port};
use crate::port::{PortSpec, Reply};
use crate::run::RunConfig;
use bop_components::SingleVolume;
use bop_core::UnitSystem;
use bop_core::units::{k, m3, pa, w};
use bop_fluids::PropertyOracle;
use bop_results::{Phase, Quantity};
use bop_solver::OdeOptions;
use std::sync::Arc;

pub const INFLOW: &str = "inflow";
pub const EXTERNAL_HEAT: &str = "external-heat";
pub const OUTFLOW: &str = "outflow";

static PORTS: [PortSpec; 3] = [
    PortSpec::inflow(INFLOW),
    PortSpec::inflow(EXTERNAL_HEAT).requiring(&[Field::Power]),
    PortSpec::outflow(OUTFLOW),
];

#[derive(Debug, Clone)]
pub struct WaterHeaterParams {
    pub volume_m3: f64,
    pub outflow_pressure_pa: f64,
    /// Constant electric heat input [W].
    pub electric_heat_w: f64,
    /// `(start, end)` [s] during which the external heat input is ignored.
    pub malfunction: Option<(f64, f64)>,
    pub initial_outflow_temperature_k: f64,
    /// Inflow used until a neighbor supplies one.
    pub inflow: BoundaryCondition,
    pub ode: OdeOptions,
}

impl Default for WaterHeaterParams {
    fn default() -> Self {
        Self {
            volume_m3: 15.0,
            outflow_pressure_pa: 34.0e5,
            electric_heat_w: 0.0,
            malfunction: None,
            initial_outflow_temperature_k: 293.15,
            inflow: BoundaryCondition::from_si(293.0, 20.0e5, 67.0),
            ode: OdeOptions::default(),
        }
    }
}

pub struct WaterHeater {
    name: String,
    oracle: Arc<dyn PropertyOracle>,
    units: UnitSystem,
    config: RunConfig,
    params: WaterHeaterParams,
    model: SingleVolume,
    inflow: Phase,
    outflow: Phase,
    state: Phase,
}

impl WaterHeater {
    pub fn new(
        name: impl Into<String>,
        oracle: Arc<dyn PropertyOracle>,
        params: WaterHeaterParams,
        config: RunConfig,
        units: UnitSystem,
    ) -> SimResult<Self> {
        config.validate()?;
        let model = SingleVolume::new(m3(params.volume_m3))?;
        if !(params.outflow_pressure_pa.is_finite() && params.outflow_pressure_pa > 0.0) {
            return Err(SimError::InvalidConfig {
                what: "water heater outflow pressure must be positive",
            });
        }
        if let Some((start, end)) = params.malfunction {
            if end < start {
                return Err(SimError::InvalidConfig {
                    what: "malfunction window ends before it starts",
                });
            }
        }
        let t0 = config.initial_time;
        let inflow = stream_phase(t0, &params.inflow, "inflow")?;
        let outflow_record = BoundaryCondition::from_si(
            params.initial_outflow_temperature_k,
            params.outflow_pressure_pa,
            params.inflow.mass_flowrate.value,
        );
        let outflow = stream_phase(t0, &outflow_record, "outflow")?;
        let state = Phase::new(
            t0,
            TIME_UNIT,
            vec![
                Quantity::new("heat", "W", params.electric_heat_w)
                    .formal("Q")
                    .latex(r"$\dot{Q}$")
                    .info("total heat input"),
                Quantity::new("external_heat", "W", 0.0)
                    .formal("Q_ext")
                    .latex(r"$\dot{Q}_{ext}$")
                    .info("heat received on the external-heat port"),
                Quantity::new("tau", "s", 0.0)
                    .formal("tau")
                    .latex(r"$\tau$")
                    .info("residence time, 0 without flow"),
            ],
        )?;
        Ok(Self {
            name: name.into(),
            oracle,
            units,
            config,
            params,
            model,
            inflow,
            outflow,
            state,
        })
    }

    /// Total heat rate [W] applied over a step starting at `time`.
    pub fn heat_input(&self, time: f64, external_w: f64) -> f64 {
        let lost = self
            .params
            .malfunction
            .is_some_and(|(start, end)| time >= start && time < end);
        if lost {
            self.params.electric_heat_w
        } else {
            self.params.electric_heat_w + external_w
        }
    }

    pub fn outflow_phase(&self) -> &Phase {
        &self.outflow
    }

    pub fn state_phase(&self) -> &Phase {
        &self.state
    }
}

impl Module for WaterHeater {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "water_heater"
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
            EXTERNAL_HEAT => {
                let watts = record
                    .power
                    .ok_or_else(|| SimError::MissingField {
                        module: self.name.clone(),
                        port: port.to_string(),
                        field: Field::Power,
                    })?
                    .value;
                let latest = self.state.latest_time();
                self.state.set_value("external_heat", watts, latest)?;
                Ok(())
            }
            _ => Err(unknown_port(&self.name, port)),
        }
    }

    fn step(&mut self, time: f64, dt: f64) -> SimResult<()> {
        let next = time + dt;
        let inflow = read_record(&self.inflow, time)?;
        let external = self.state.get_value("external_heat", time)?;
        let heat = self.heat_input(time, external);
        let t_out = self.outflow.get_value("temp", time)?;

        let result = self.model.step(
            self.oracle.as_ref(),
            k(t_out),
            &inflow.stream(),
            w(heat),
            pa(self.params.outflow_pressure_pa),
            time,
            dt,
            &self.params.ode,
        )?;

        carry_forward_all(&mut [&mut self.inflow, &mut self.outflow, &mut self.state], time, next)?;
        let outflow = BoundaryCondition::new(
            result.outflow_temperature,
            pa(self.params.outflow_pressure_pa),
            inflow.mass_flowrate,
        );
        quantities::write_record(&mut self.outflow, &outflow, next)?;
        self.state.set_value("heat", heat, next)?;
        let tau = if result.residence_time.is_finite() { result.residence_time } else { 0.0 };
        self.state.set_value("tau", tau, next)?;

        tracing::trace!(module = %self.name, time = next, t_out = result.outflow_temperature.value, heat, "water heater step");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::run_module;
    use crate::sync::PortSet;
    use bop_fluids::SurrogateWater;

    fn heater(params: WaterHeaterParams, end_time: f64) -> WaterHeater {
        let config = RunConfig {
            end_time,
            ..RunConfig::default()
        };
        WaterHeater::new(
            "heater",
            Arc::new(SurrogateWater::new()),
            params,
            config,
            UnitSystem::default(),
        )
        .unwrap()
    }

    #[test]
    fn electric_heat_warms_the_outflow() {
        let mut m = heater(
            WaterHeaterParams {
                electric_heat_w: 5.0e6,
                ..WaterHeaterParams::default()
            },
            600.0,
        );
        run_module(&mut m, &PortSet::new()).unwrap();
        let t_end = m.outflow_phase().latest_value("temp").unwrap();
        assert!(t_end > 293.15, "outflow {t_end}");
        assert_eq!(m.outflow_phase().len(), 61);
        assert_eq!(m.outflow_phase().latest_value("pressure").unwrap(), 34.0e5);
    }

    #[test]
    fn malfunction_drops_external_heat() {
        let m = heater(
            WaterHeaterParams {
                electric_heat_w: 1.0e3,
                malfunction: Some((100.0, 200.0)),
                ..WaterHeaterParams::default()
            },
            600.0,
        );
        assert_eq!(m.heat_input(50.0, 2.0e6), 2.001e6);
        assert_eq!(m.heat_input(100.0, 2.0e6), 1.0e3);
        assert_eq!(m.heat_input(200.0, 2.0e6), 2.001e6);
    }

    #[test]
    fn external_heat_requires_power() {
        let mut m = heater(WaterHeaterParams::default(), 600.0);
        let err = m
            .accept(EXTERNAL_HEAT, BoundaryCondition::from_si(300.0, 1.0e5, 1.0))
            .unwrap_err();
        assert!(matches!(err, SimError::MissingField { field: Field::Power, .. }));

        m.accept(
            EXTERNAL_HEAT,
            BoundaryCondition::from_si(300.0, 1.0e5, 1.0).with_power(4.0e5),
        )
        .unwrap();
        assert_eq!(m.state_phase().latest_value("external_heat").unwrap(), 4.0e5);
    }

    #[test]
    fn unknown_port_is_rejected() {
        let m = heater(WaterHeaterParams::default(), 600.0);
        assert!(matches!(
            m.publish("secondary", 0.0),
            Err(SimError::UnknownPort { .. })
        ));
    }
}
