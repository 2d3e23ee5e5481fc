use approx::assert_relative_eq;
use bop_app::{compile_network, load_project};
use bop_sim::NetworkReport;
use std::path::Path;

fn run_demo(name: &str) -> NetworkReport {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name);
    let project = load_project(&path).unwrap_or_else(|e| panic!("{name}: {e}"));
    compile_network(&project)
        .and_then(|network| Ok(network.run()?))
        .unwrap_or_else(|e| panic!("{name}: {e}"))
}

fn value(report: &NetworkReport, module: &str, phase: &str, quantity: &str, time: f64) -> f64 {
    report
        .module(module)
        .unwrap()
        .phase(phase)
        .unwrap()
        .get_value(quantity, time)
        .unwrap()
}

#[test]
fn plant_demo_runs_every_module_to_the_end() {
    let report = run_demo("plant.yaml");
    assert_eq!(report.modules.len(), 5);
    for module in &report.modules {
        assert_eq!(module.summary.steps, 60, "{}", module.name);
        assert_eq!(module.summary.end_time, 600.0);
    }
    let power = value(&report, "turbine", "outflow", "power", 600.0);
    assert!(power > 0.0);
    let received = value(&report, "heater", "state", "external_heat", 600.0);
    assert!(received > 0.0);
}

#[test]
fn water_heater_demo_drops_process_heat_during_malfunction() {
    let report = run_demo("water_heater.yaml");
    let heat = |t| value(&report, "heater", "state", "heat", t);
    assert_relative_eq!(heat(600.0), 6.0e6);
    assert_relative_eq!(heat(900.0), 1.0e6);
    assert_relative_eq!(heat(1500.0), 11.0e6);
}

#[test]
fn pipe_demo_ramps_flow() {
    let report = run_demo("pipe.yaml");
    let flow = |t| value(&report, "pipe", "outflow", "flowrate", t);
    assert_relative_eq!(flow(1800.0), 333.0, epsilon = 1e-9);
    assert_relative_eq!(flow(3600.0), 666.0, epsilon = 1e-9);
    assert!(value(&report, "pipe", "state", "reynolds", 3600.0) > 4000.0);
}
