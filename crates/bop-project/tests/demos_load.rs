use std::path::Path;

#[test]
fn demos_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let demos = [
        "plant.yaml",
        "water_heater.yaml",
        "pipe.yaml",
        "cooling_tower.yaml",
    ];

    for name in demos {
        let path = root.join(name);
        let project = bop_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        assert_eq!(project.version, bop_project::LATEST_VERSION, "{name}");
        assert!(!project.modules.is_empty(), "{name}");
    }
}

#[test]
fn plant_demo_closes_the_secondary_loop() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/plant.yaml");
    let project = bop_project::load_yaml(&path).unwrap();
    assert_eq!(project.modules.len(), 5);
    assert_eq!(project.connections.len(), 6);
    assert_eq!(project.fluid, bop_project::FluidDef::Surrogate);
}
