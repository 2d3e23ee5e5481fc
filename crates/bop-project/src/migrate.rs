//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Project;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files wrote connections in either direction; v1 always stores
/// `from` as the producing module. Direction is resolved against the port
/// tables, so only pairs whose `from` end is an inflow port are swapped.
fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    for connection in &mut project.connections {
        let from_is_inflow = project
            .modules
            .iter()
            .find(|m| m.id == connection.from.module)
            .is_some_and(|m| m.kind.inflow_ports().contains(&connection.from.port.as_str()));
        if from_is_inflow {
            std::mem::swap(&mut connection.from, &mut connection.to);
        }
    }
    project.version = 1;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    #[test]
    fn v0_connections_are_normalized() {
        let project = Project {
            version: 0,
            name: "legacy".to_string(),
            run: RunDef::default(),
            units: Default::default(),
            fluid: FluidDef::Surrogate,
            solver: None,
            modules: vec![
                ModuleDef {
                    id: "tower".to_string(),
                    kind: ModuleKind::CoolingTower {
                        outflow_temperature_k: None,
                        outflow_pressure_pa: None,
                        inflow: None,
                    },
                },
                ModuleDef {
                    id: "pipe".to_string(),
                    kind: ModuleKind::Pipe {
                        diameter_m: None,
                        roughness_m: None,
                        flow_ramp_peak_kg_s: None,
                        inflow: None,
                    },
                },
            ],
            connections: vec![ConnectionDef {
                from: PortRef {
                    module: "pipe".to_string(),
                    port: "inflow".to_string(),
                },
                to: PortRef {
                    module: "tower".to_string(),
                    port: "outflow".to_string(),
                },
            }],
        };
        let migrated = migrate_to_latest(project).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.connections[0].from.module, "tower");
        assert_eq!(migrated.connections[0].to.port, "inflow");
    }
}
