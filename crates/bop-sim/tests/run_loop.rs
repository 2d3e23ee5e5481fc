use bop_core::UnitSystem;
use bop_sim::modules::{CoolingTowerModule, CoolingTowerParams};
use bop_sim::{Module, PortSet, RunConfig, ShowTime, run_module};
use proptest::prelude::*;

fn tower(config: RunConfig) -> CoolingTowerModule {
    CoolingTowerModule::new("tower", CoolingTowerParams::default(), config, UnitSystem::default())
        .unwrap()
}

#[test]
fn short_run_takes_exactly_one_step() {
    let mut m = tower(RunConfig {
        initial_time: 0.0,
        end_time: 3.0,
        time_step: 10.0,
        ..RunConfig::default()
    });
    let summary = run_module(&mut m, &PortSet::new()).unwrap();
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.end_time, 10.0);
    assert_eq!(m.config().end_time, 10.0);
    assert_eq!(m.outflow_phase().times(), &[0.0, 10.0]);
}

#[test]
fn end_time_is_truncated_to_last_time_reached() {
    let mut m = tower(RunConfig {
        initial_time: 0.0,
        end_time: 25.0,
        time_step: 10.0,
        show_time: ShowTime {
            enabled: true,
            interval: 1.0,
        },
        ..RunConfig::default()
    });
    let summary = run_module(&mut m, &PortSet::new()).unwrap();
    assert_eq!(summary.steps, 3);
    assert_eq!(m.config().end_time, 30.0);
}

proptest! {
    #[test]
    fn loop_matches_planned_step_count(
        initial in -100.0f64..100.0,
        span in 0.0f64..500.0,
        dt in 0.5f64..50.0,
    ) {
        let config = RunConfig {
            initial_time: initial,
            end_time: initial + span,
            time_step: dt,
            ..RunConfig::default()
        };
        let planned = config.step_count();
        let mut m = tower(config);
        let summary = run_module(&mut m, &PortSet::new()).unwrap();
        prop_assert_eq!(summary.steps, planned);
        prop_assert!(summary.steps >= 1);
        prop_assert_eq!(m.outflow_phase().len(), planned + 1);
        prop_assert!(summary.end_time >= initial + span - 1e-6);
        prop_assert!(summary.end_time < initial + span.max(dt) + dt);
    }
}
