//! Project → module network compilation.
//!
//! Every module receives its own copy of the run configuration and display
//! units. Parameters omitted in the project file fall back to the module's
//! `Default` parameters.

use bop_core::UnitSystem;
use bop_fluids::{CoolPropWater, PropertyOracle, SurrogateWater};
use bop_project::schema::{
    FluidDef, ModuleDef, ModuleKind, OdeMethodDef, Project, RunDef, SolverDef, StreamDef,
};
use bop_sim::modules::{
    CoolingTowerModule, CoolingTowerParams, PipeModule, PipeParams, Source, SourceParams,
    Steamer, SteamerParams, StepChange, TurbineModule, TurbineParams, WaterHeater,
    WaterHeaterParams,
};
use bop_sim::{BoundaryCondition, Module, Network, RunConfig, ShowTime};
use bop_solver::{OdeMethod, OdeOptions};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

pub fn build_oracle(fluid: FluidDef) -> Arc<dyn PropertyOracle> {
    match fluid {
        FluidDef::CoolProp => Arc::new(CoolPropWater::new()),
        FluidDef::Surrogate => Arc::new(SurrogateWater::new()),
    }
}

pub fn ode_options(solver: Option<&SolverDef>) -> OdeOptions {
    let mut options = OdeOptions::default();
    if let Some(solver) = solver {
        if let Some(rtol) = solver.rtol {
            options.rtol = rtol;
        }
        if let Some(atol) = solver.atol {
            options.atol = atol;
        }
        if let Some(max_steps) = solver.max_steps {
            options.max_steps = max_steps;
        }
        options.method = match solver.method {
            OdeMethodDef::BackwardEuler => OdeMethod::BackwardEuler,
            OdeMethodDef::DormandPrince => OdeMethod::DormandPrince,
        };
    }
    options
}

pub fn run_config(run: &RunDef) -> RunConfig {
    let defaults = RunConfig::default();
    RunConfig {
        initial_time: run.initial_time_s,
        end_time: run.end_time_s,
        time_step: run.time_step_s,
        show_time: ShowTime {
            enabled: run.show_time,
            interval: run
                .show_time_interval_s
                .unwrap_or(defaults.show_time.interval),
        },
        ..defaults
    }
}

fn record(stream: &StreamDef, power_w: Option<f64>) -> BoundaryCondition {
    let record =
        BoundaryCondition::from_si(stream.temperature_k, stream.pressure_pa, stream.mass_flow_kg_s);
    match power_w {
        Some(watts) => record.with_power(watts),
        None => record,
    }
}

fn inflow_or(stream: &Option<StreamDef>, default: BoundaryCondition) -> BoundaryCondition {
    stream.as_ref().map_or(default, |s| record(s, None))
}

/// Instantiate one module from its project definition.
pub fn build_module(
    def: &ModuleDef,
    oracle: &Arc<dyn PropertyOracle>,
    config: &RunConfig,
    units: UnitSystem,
    ode: &OdeOptions,
) -> AppResult<Box<dyn Module>> {
    let id = def.id.as_str();
    let config = config.clone();
    let module: Box<dyn Module> = match &def.kind {
        ModuleKind::Source {
            stream,
            power_w,
            step_change,
        } => {
            let params = SourceParams {
                record: record(stream, *power_w),
                step_change: step_change.as_ref().map(|change| StepChange {
                    time: change.time_s,
                    record: record(&change.stream, change.power_w),
                }),
            };
            Box::new(Source::new(id, params, config, units)?)
        }
        ModuleKind::WaterHeater {
            volume_m3,
            outflow_pressure_pa,
            electric_heat_w,
            malfunction,
            initial_outflow_temperature_k,
            inflow,
        } => {
            let d = WaterHeaterParams::default();
            let params = WaterHeaterParams {
                volume_m3: volume_m3.unwrap_or(d.volume_m3),
                outflow_pressure_pa: outflow_pressure_pa.unwrap_or(d.outflow_pressure_pa),
                electric_heat_w: electric_heat_w.unwrap_or(d.electric_heat_w),
                malfunction: malfunction.map(|w| (w.start_s, w.end_s)),
                initial_outflow_temperature_k: initial_outflow_temperature_k
                    .unwrap_or(d.initial_outflow_temperature_k),
                inflow: inflow_or(inflow, d.inflow),
                ode: ode.clone(),
            };
            Box::new(WaterHeater::new(id, oracle.clone(), params, config, units)?)
        }
        ModuleKind::Steamer {
            primary_volume_m3,
            secondary_volume_m3,
            ntu,
            primary_inflow,
            secondary_inflow,
            initial_primary_outflow_temperature_k,
        } => {
            let d = SteamerParams::default();
            let params = SteamerParams {
                primary_volume_m3: primary_volume_m3.unwrap_or(d.primary_volume_m3),
                secondary_volume_m3: secondary_volume_m3.unwrap_or(d.secondary_volume_m3),
                ntu: ntu.unwrap_or(d.ntu),
                primary_inflow: inflow_or(primary_inflow, d.primary_inflow),
                secondary_inflow: inflow_or(secondary_inflow, d.secondary_inflow),
                initial_primary_outflow_temperature_k: initial_primary_outflow_temperature_k
                    .unwrap_or(d.initial_primary_outflow_temperature_k),
                ode: ode.clone(),
            };
            Box::new(Steamer::new(id, oracle.clone(), params, config, units)?)
        }
        ModuleKind::Turbine {
            efficiency,
            outflow_pressure_pa,
            inflow,
        } => {
            let d = TurbineParams::default();
            let params = TurbineParams {
                efficiency: efficiency.unwrap_or(d.efficiency),
                outflow_pressure_pa: outflow_pressure_pa.unwrap_or(d.outflow_pressure_pa),
                inflow: inflow_or(inflow, d.inflow),
            };
            Box::new(TurbineModule::new(id, oracle.clone(), params, config, units)?)
        }
        ModuleKind::Pipe {
            diameter_m,
            roughness_m,
            flow_ramp_peak_kg_s,
            inflow,
        } => {
            let d = PipeParams::default();
            let params = PipeParams {
                diameter_m: diameter_m.unwrap_or(d.diameter_m),
                roughness_m: roughness_m.unwrap_or(d.roughness_m),
                flow_ramp: flow_ramp_peak_kg_s.or(d.flow_ramp),
                inflow: inflow_or(inflow, d.inflow),
            };
            Box::new(PipeModule::new(id, oracle.clone(), params, config, units)?)
        }
        ModuleKind::CoolingTower {
            outflow_temperature_k,
            outflow_pressure_pa,
            inflow,
        } => {
            let d = CoolingTowerParams::default();
            let params = CoolingTowerParams {
                outflow_temperature_k: outflow_temperature_k.unwrap_or(d.outflow_temperature_k),
                outflow_pressure_pa: outflow_pressure_pa.unwrap_or(d.outflow_pressure_pa),
                inflow: inflow_or(inflow, d.inflow),
            };
            Box::new(CoolingTowerModule::new(id, params, config, units)?)
        }
    };
    Ok(module)
}

/// Build the full network: one module per definition, then every connection.
pub fn compile_network(project: &Project) -> AppResult<Network> {
    let oracle = build_oracle(project.fluid);
    let config = run_config(&project.run);
    let ode = ode_options(project.solver.as_ref());

    let mut network = Network::new();
    for def in &project.modules {
        let module = build_module(def, &oracle, &config, project.units, &ode)
            .map_err(|e| AppError::Compile(format!("module '{}': {}", def.id, e)))?;
        network.add_module(module)?;
    }
    for connection in &project.connections {
        network
            .connect(
                (connection.from.module.as_str(), connection.from.port.as_str()),
                (connection.to.module.as_str(), connection.to.port.as_str()),
            )
            .map_err(|e| AppError::Compile(e.to_string()))?;
    }
    tracing::debug!(
        modules = network.len(),
        connections = network.connections().len(),
        "compiled network"
    );
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bop_project::schema::PortRef;

    fn pipe_def(id: &str) -> ModuleDef {
        ModuleDef {
            id: id.to_string(),
            kind: ModuleKind::Pipe {
                diameter_m: None,
                roughness_m: None,
                flow_ramp_peak_kg_s: None,
                inflow: None,
            },
        }
    }

    #[test]
    fn run_config_maps_schedule_and_progress() {
        let run = RunDef {
            initial_time_s: 5.0,
            end_time_s: 65.0,
            time_step_s: 20.0,
            show_time: true,
            show_time_interval_s: None,
        };
        let config = run_config(&run);
        assert_eq!(config.initial_time, 5.0);
        assert_eq!(config.end_time, 65.0);
        assert_eq!(config.time_step, 20.0);
        assert!(config.show_time.enabled);
        assert_eq!(config.show_time.interval, RunConfig::default().show_time.interval);
    }

    #[test]
    fn solver_overrides_apply() {
        let options = ode_options(Some(&SolverDef {
            rtol: Some(1e-6),
            atol: None,
            max_steps: Some(50),
            method: OdeMethodDef::DormandPrince,
        }));
        assert_eq!(options.rtol, 1e-6);
        assert_eq!(options.atol, OdeOptions::default().atol);
        assert_eq!(options.max_steps, 50);
        assert!(matches!(options.method, OdeMethod::DormandPrince));
    }

    #[test]
    fn bad_connection_is_a_compile_error() {
        let project = Project {
            version: 1,
            name: "bad".to_string(),
            run: RunDef::default(),
            units: UnitSystem::default(),
            fluid: FluidDef::Surrogate,
            solver: None,
            modules: vec![pipe_def("a"), pipe_def("b")],
            connections: vec![bop_project::schema::ConnectionDef {
                from: PortRef {
                    module: "a".to_string(),
                    port: "inflow".to_string(),
                },
                to: PortRef {
                    module: "b".to_string(),
                    port: "inflow".to_string(),
                },
            }],
        };
        assert!(matches!(compile_network(&project), Err(AppError::Compile(_))));
    }
}
