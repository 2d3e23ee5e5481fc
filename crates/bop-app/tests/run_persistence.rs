use bop_app::{AppError, RunOptions, RunRequest, query, run_service};
use std::path::{Path, PathBuf};

fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

/// Copy a demo into its own scratch directory so the run store lands there.
fn scratch_project(demo: &str, tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bop_app_{tag}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(demo);
    std::fs::copy(demos_dir().join(demo), &path).unwrap();
    path
}

#[test]
fn run_persists_and_is_cached() {
    let project_path = scratch_project("cooling_tower.yaml", "persist");
    let request = RunRequest {
        project_path: &project_path,
        options: RunOptions::default(),
    };

    let first = run_service::ensure_run(&request).expect("run failed");
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.project_name, "Cooling Tower");
    assert_eq!(first.manifest.modules.len(), 2);
    for module in &first.manifest.modules {
        assert_eq!(module.steps, 10, "{}", module.name);
        assert_eq!(module.end_time_s, 600.0);
    }

    let second = run_service::ensure_run(&request).expect("cached run failed");
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);

    let runs = run_service::list_runs(&project_path).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, first.run_id);

    let (_, records) = run_service::load_run(&project_path, &first.run_id).unwrap();
    let outflow = query::extract_series(&records, "tower", "outflow", "temp").unwrap();
    assert_eq!(outflow.points.len(), 11);
    assert!(outflow.points.iter().all(|p| (p.value - 303.15).abs() < 1e-9));
    let flow = query::extract_series(&records, "tower", "outflow", "flowrate").unwrap();
    assert_eq!(flow.points.last().unwrap().value, 67.0);
}

#[test]
fn no_cache_reruns() {
    let project_path = scratch_project("pipe.yaml", "nocache");
    let mut request = RunRequest {
        project_path: &project_path,
        options: RunOptions::default(),
    };
    let first = run_service::ensure_run(&request).unwrap();
    request.options.use_cache = false;
    let second = run_service::ensure_run(&request).unwrap();
    assert!(!second.loaded_from_cache);
    assert_eq!(first.run_id, second.run_id);
}

#[test]
fn unknown_run_is_reported() {
    let project_path = scratch_project("pipe.yaml", "missing");
    assert!(matches!(
        run_service::load_run(&project_path, "does-not-exist"),
        Err(AppError::RunNotFound(_))
    ));
}
