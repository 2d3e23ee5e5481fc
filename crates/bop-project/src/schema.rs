//! Project schema definitions.

use bop_core::UnitSystem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub run: RunDef,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub fluid: FluidDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverDef>,
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

/// Time schedule shared by every module of the project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default)]
    pub initial_time_s: f64,
    pub end_time_s: f64,
    pub time_step_s: f64,
    #[serde(default)]
    pub show_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_time_interval_s: Option<f64>,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            initial_time_s: 0.0,
            end_time_s: 3600.0,
            time_step_s: 10.0,
            show_time: false,
            show_time_interval_s: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FluidDef {
    #[default]
    CoolProp,
    Surrogate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OdeMethodDef {
    #[default]
    BackwardEuler,
    DormandPrince,
}

/// Overrides for the per-step integrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SolverDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    #[serde(default)]
    pub method: OdeMethodDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StreamDef {
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub mass_flow_kg_s: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowDef {
    pub start_s: f64,
    pub end_s: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StepChangeDef {
    pub time_s: f64,
    #[serde(flatten)]
    pub stream: StreamDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleDef {
    pub id: String,
    pub kind: ModuleKind,
}

/// Module parameters. Omitted optional values take the module defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ModuleKind {
    Source {
        #[serde(flatten)]
        stream: StreamDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        power_w: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step_change: Option<StepChangeDef>,
    },
    WaterHeater {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume_m3: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outflow_pressure_pa: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        electric_heat_w: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        malfunction: Option<WindowDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_outflow_temperature_k: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inflow: Option<StreamDef>,
    },
    Steamer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        primary_volume_m3: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secondary_volume_m3: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ntu: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        primary_inflow: Option<StreamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secondary_inflow: Option<StreamDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_primary_outflow_temperature_k: Option<f64>,
    },
    Turbine {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        efficiency: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outflow_pressure_pa: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inflow: Option<StreamDef>,
    },
    Pipe {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diameter_m: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        roughness_m: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_ramp_peak_kg_s: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inflow: Option<StreamDef>,
    },
    CoolingTower {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outflow_temperature_k: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outflow_pressure_pa: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inflow: Option<StreamDef>,
    },
}

impl ModuleKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ModuleKind::Source { .. } => "Source",
            ModuleKind::WaterHeater { .. } => "WaterHeater",
            ModuleKind::Steamer { .. } => "Steamer",
            ModuleKind::Turbine { .. } => "Turbine",
            ModuleKind::Pipe { .. } => "Pipe",
            ModuleKind::CoolingTower { .. } => "CoolingTower",
        }
    }

    pub fn inflow_ports(&self) -> &'static [&'static str] {
        match self {
            ModuleKind::Source { .. } => &[],
            ModuleKind::WaterHeater { .. } => &["inflow", "external-heat"],
            ModuleKind::Steamer { .. } => &["primary-inflow", "secondary-inflow"],
            ModuleKind::Turbine { .. } | ModuleKind::Pipe { .. } | ModuleKind::CoolingTower { .. } => {
                &["inflow"]
            }
        }
    }

    pub fn outflow_ports(&self) -> &'static [&'static str] {
        match self {
            ModuleKind::Steamer { .. } => &["primary-outflow", "secondary-outflow"],
            ModuleKind::Turbine { .. } => &["outflow", "process-heat"],
            _ => &["outflow"],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortRef {
    pub module: String,
    pub port: String,
}

/// Directed binding from an outflow port to an inflow port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionDef {
    pub from: PortRef,
    pub to: PortRef,
}
