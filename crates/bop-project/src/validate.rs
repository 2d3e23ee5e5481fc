//! Project validation logic.

use crate::schema::{ConnectionDef, ModuleDef, ModuleKind, Project, RunDef, StreamDef};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Port {port} already bound in {context}")]
    PortAlreadyBound { port: String, context: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn optional(
    field: &str,
    value: Option<f64>,
    check: fn(&str, f64) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| check(field, v))
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_run(&project.run)?;
    if let Some(solver) = &project.solver {
        optional("solver.rtol", solver.rtol, positive)?;
        optional("solver.atol", solver.atol, positive)?;
        if solver.max_steps == Some(0) {
            return Err(invalid("solver.max_steps", 0.0, "must be at least 1"));
        }
    }

    let mut modules = HashMap::new();
    for module in &project.modules {
        if modules.insert(module.id.as_str(), module).is_some() {
            return Err(ValidationError::DuplicateId {
                id: module.id.clone(),
                context: "modules".to_string(),
            });
        }
        validate_module(module)?;
    }

    let mut bound = HashSet::new();
    for connection in &project.connections {
        validate_connection(connection, &modules, &mut bound)?;
    }

    Ok(())
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    if !run.initial_time_s.is_finite() {
        return Err(invalid("run.initial_time_s", run.initial_time_s, "must be finite"));
    }
    positive("run.time_step_s", run.time_step_s)?;
    if !run.end_time_s.is_finite() || run.end_time_s < run.initial_time_s {
        return Err(invalid(
            "run.end_time_s",
            run.end_time_s,
            "must not precede the initial time",
        ));
    }
    optional("run.show_time_interval_s", run.show_time_interval_s, positive)
}

fn validate_stream(context: &str, stream: &StreamDef) -> Result<(), ValidationError> {
    positive(&format!("{context}.temperature_k"), stream.temperature_k)?;
    positive(&format!("{context}.pressure_pa"), stream.pressure_pa)?;
    non_negative(&format!("{context}.mass_flow_kg_s"), stream.mass_flow_kg_s)
}

fn validate_module(module: &ModuleDef) -> Result<(), ValidationError> {
    let id = module.id.as_str();
    let field = |name: &str| format!("{id}.{name}");
    let stream = |name: &str, s: &Option<StreamDef>| match s {
        Some(s) => validate_stream(&field(name), s),
        None => Ok(()),
    };

    match &module.kind {
        ModuleKind::Source {
            stream: record,
            power_w,
            step_change,
        } => {
            validate_stream(id, record)?;
            optional(&field("power_w"), *power_w, non_negative)?;
            if let Some(change) = step_change {
                validate_stream(&field("step_change"), &change.stream)?;
                optional(&field("step_change.power_w"), change.power_w, non_negative)?;
                if !change.time_s.is_finite() {
                    return Err(invalid(field("step_change.time_s"), change.time_s, "must be finite"));
                }
            }
        }
        ModuleKind::WaterHeater {
            volume_m3,
            outflow_pressure_pa,
            electric_heat_w,
            malfunction,
            initial_outflow_temperature_k,
            inflow,
        } => {
            optional(&field("volume_m3"), *volume_m3, positive)?;
            optional(&field("outflow_pressure_pa"), *outflow_pressure_pa, positive)?;
            optional(&field("electric_heat_w"), *electric_heat_w, non_negative)?;
            optional(
                &field("initial_outflow_temperature_k"),
                *initial_outflow_temperature_k,
                positive,
            )?;
            if let Some(window) = malfunction {
                if !(window.start_s.is_finite() && window.end_s >= window.start_s) {
                    return Err(invalid(
                        field("malfunction.end_s"),
                        window.end_s,
                        "window must end after it starts",
                    ));
                }
            }
            stream("inflow", inflow)?;
        }
        ModuleKind::Steamer {
            primary_volume_m3,
            secondary_volume_m3,
            ntu,
            primary_inflow,
            secondary_inflow,
            initial_primary_outflow_temperature_k,
        } => {
            optional(&field("primary_volume_m3"), *primary_volume_m3, positive)?;
            optional(&field("secondary_volume_m3"), *secondary_volume_m3, positive)?;
            optional(&field("ntu"), *ntu, non_negative)?;
            optional(
                &field("initial_primary_outflow_temperature_k"),
                *initial_primary_outflow_temperature_k,
                positive,
            )?;
            stream("primary_inflow", primary_inflow)?;
            stream("secondary_inflow", secondary_inflow)?;
        }
        ModuleKind::Turbine {
            efficiency,
            outflow_pressure_pa,
            inflow,
        } => {
            if let Some(eta) = efficiency {
                if !(*eta > 0.0 && *eta <= 1.0) {
                    return Err(invalid(field("efficiency"), *eta, "must be in (0, 1]"));
                }
            }
            optional(&field("outflow_pressure_pa"), *outflow_pressure_pa, positive)?;
            stream("inflow", inflow)?;
        }
        ModuleKind::Pipe {
            diameter_m,
            roughness_m,
            flow_ramp_peak_kg_s,
            inflow,
        } => {
            optional(&field("diameter_m"), *diameter_m, positive)?;
            optional(&field("roughness_m"), *roughness_m, non_negative)?;
            optional(&field("flow_ramp_peak_kg_s"), *flow_ramp_peak_kg_s, non_negative)?;
            stream("inflow", inflow)?;
        }
        ModuleKind::CoolingTower {
            outflow_temperature_k,
            outflow_pressure_pa,
            inflow,
        } => {
            optional(&field("outflow_temperature_k"), *outflow_temperature_k, positive)?;
            optional(&field("outflow_pressure_pa"), *outflow_pressure_pa, positive)?;
            stream("inflow", inflow)?;
        }
    }
    Ok(())
}

fn validate_connection<'a>(
    connection: &'a ConnectionDef,
    modules: &HashMap<&str, &ModuleDef>,
    bound: &mut HashSet<(&'a str, &'a str)>,
) -> Result<(), ValidationError> {
    let from = &connection.from;
    let to = &connection.to;
    let producer = modules
        .get(from.module.as_str())
        .ok_or_else(|| ValidationError::MissingReference {
            id: from.module.clone(),
            context: "connection from".to_string(),
        })?;
    let consumer = modules
        .get(to.module.as_str())
        .ok_or_else(|| ValidationError::MissingReference {
            id: to.module.clone(),
            context: "connection to".to_string(),
        })?;

    if !producer.kind.outflow_ports().contains(&from.port.as_str()) {
        return Err(ValidationError::MissingReference {
            id: format!("{}.{}", from.module, from.port),
            context: format!("outflow ports of {}", producer.kind.type_name()),
        });
    }
    if !consumer.kind.inflow_ports().contains(&to.port.as_str()) {
        return Err(ValidationError::MissingReference {
            id: format!("{}.{}", to.module, to.port),
            context: format!("inflow ports of {}", consumer.kind.type_name()),
        });
    }
    if from.module == to.module {
        return Err(ValidationError::InvalidValue {
            field: "connection".to_string(),
            value: from.module.clone(),
            reason: "a module cannot feed itself".to_string(),
        });
    }

    for end in [from, to] {
        if !bound.insert((end.module.as_str(), end.port.as_str())) {
            return Err(ValidationError::PortAlreadyBound {
                port: format!("{}.{}", end.module, end.port),
                context: "connections".to_string(),
            });
        }
    }
    Ok(())
}
