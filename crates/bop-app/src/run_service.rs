//! Run execution and caching service.

use bop_results::{HistoryRecord, ModuleSummary, RunManifest, RunStore};
use bop_sim::NetworkReport;
use std::path::Path;
use std::time::Instant;

use crate::compile;
use crate::error::AppResult;
use crate::project_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: "0.1.0".to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

/// Wall-clock breakdown of one `ensure_run` call.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub simulate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// Execute a project, or load its cached result when the project and solver
/// version hash to a run already in the store.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    let project = project_service::load_project(request.project_path)?;
    project_service::validate_project(&project)?;

    let run_id = bop_results::compute_run_id(&project, &request.options.solver_version)?;
    let store = RunStore::for_project(request.project_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        tracing::info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let compile_started = Instant::now();
    let network = compile::compile_network(&project)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    let simulate_started = Instant::now();
    let report = network.run()?;
    timing.simulate_time_s = simulate_started.elapsed().as_secs_f64();

    let save_started = Instant::now();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        project_name: project.name.clone(),
        timestamp: bop_results::timestamp_now(),
        solver_version: request.options.solver_version.clone(),
        modules: module_summaries(&report),
    };
    let records = history_records(&report)?;
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    tracing::info!(
        run_id = %run_id,
        series = records.len(),
        total_s = timing.total_time_s,
        "run complete"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

pub fn module_summaries(report: &NetworkReport) -> Vec<ModuleSummary> {
    report
        .modules
        .iter()
        .map(|m| ModuleSummary {
            name: m.name.clone(),
            kind: m.kind.clone(),
            initial_time_s: m.summary.initial_time,
            end_time_s: m.summary.end_time,
            time_step_s: m.summary.time_step,
            steps: m.summary.steps,
        })
        .collect()
}

/// Flatten every module's phases into one record per quantity history.
pub fn history_records(report: &NetworkReport) -> AppResult<Vec<HistoryRecord>> {
    let mut records = Vec::new();
    for module in &report.modules {
        for (phase_name, phase) in &module.phases {
            for quantity in phase.quantity_names() {
                records.push(HistoryRecord {
                    module: module.name.clone(),
                    phase: phase_name.clone(),
                    series: phase.history(quantity)?,
                });
            }
        }
    }
    Ok(records)
}

/// List stored runs of the project, most recent first.
pub fn list_runs(project_path: &Path) -> AppResult<Vec<RunManifest>> {
    let project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;

    let mut runs = store.list_runs(&project.name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

/// Load a specific run.
pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<(RunManifest, Vec<HistoryRecord>)> {
    let store = RunStore::for_project(project_path)?;

    let manifest = store.load_manifest(run_id)?;
    let records = store.load_histories(run_id)?;

    Ok((manifest, records))
}
