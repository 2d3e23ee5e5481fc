use bop_project::schema::*;
use bop_project::{load_json, load_yaml, save_json, save_yaml, validate_project};

fn heater_project() -> Project {
    Project {
        version: 1,
        name: "Heater Loop".to_string(),
        run: RunDef {
            initial_time_s: 0.0,
            end_time_s: 600.0,
            time_step_s: 10.0,
            show_time: true,
            show_time_interval_s: Some(60.0),
        },
        units: Default::default(),
        fluid: FluidDef::Surrogate,
        solver: Some(SolverDef {
            rtol: Some(1e-5),
            atol: None,
            max_steps: Some(500),
            method: OdeMethodDef::DormandPrince,
        }),
        modules: vec![
            ModuleDef {
                id: "feed".to_string(),
                kind: ModuleKind::Source {
                    stream: StreamDef {
                        temperature_k: 293.0,
                        pressure_pa: 2.0e6,
                        mass_flow_kg_s: 67.0,
                    },
                    power_w: None,
                    step_change: Some(StepChangeDef {
                        time_s: 300.0,
                        stream: StreamDef {
                            temperature_k: 310.0,
                            pressure_pa: 2.0e6,
                            mass_flow_kg_s: 60.0,
                        },
                        power_w: None,
                    }),
                },
            },
            ModuleDef {
                id: "heater".to_string(),
                kind: ModuleKind::WaterHeater {
                    volume_m3: Some(15.0),
                    outflow_pressure_pa: None,
                    electric_heat_w: Some(1.0e6),
                    malfunction: Some(WindowDef {
                        start_s: 100.0,
                        end_s: 200.0,
                    }),
                    initial_outflow_temperature_k: None,
                    inflow: None,
                },
            },
        ],
        connections: vec![ConnectionDef {
            from: PortRef {
                module: "feed".to_string(),
                port: "outflow".to_string(),
            },
            to: PortRef {
                module: "heater".to_string(),
                port: "inflow".to_string(),
            },
        }],
    }
}

#[test]
fn roundtrip_yaml_empty_project() {
    let project = Project {
        version: 1,
        name: "Empty Project".to_string(),
        run: RunDef::default(),
        units: Default::default(),
        fluid: FluidDef::default(),
        solver: None,
        modules: vec![],
        connections: vec![],
    };

    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("bop_project_roundtrip_empty.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_yaml_heater_loop() {
    let project = heater_project();
    let path = std::env::temp_dir().join("bop_project_roundtrip_heater.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_heater_loop() {
    let project = heater_project();
    let path = std::env::temp_dir().join("bop_project_roundtrip_heater.json");
    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn save_refuses_invalid_project() {
    let mut project = heater_project();
    project.connections[0].to.port = "outflow".to_string();
    let path = std::env::temp_dir().join("bop_project_invalid.yaml");
    assert!(save_yaml(&path, &project).is_err());
}

#[test]
fn missing_optional_fields_take_defaults() {
    let yaml = r#"
version: 1
name: Minimal
modules:
  - id: tower
    kind:
      type: CoolingTower
"#;
    let project: Project = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(project.run, RunDef::default());
    assert_eq!(project.fluid, FluidDef::CoolProp);
    assert!(matches!(
        project.modules[0].kind,
        ModuleKind::CoolingTower {
            outflow_temperature_k: None,
            ..
        }
    ));
    validate_project(&project).unwrap();
}
