use bop_app::{AppResult, RunOptions, RunRequest, project_service, query, run_service};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bop")]
#[command(about = "Balance-of-plant thermal-hydraulic simulator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List modules in a project
    Modules {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Run the project's module network
    Run {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a project
    Runs {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Show the modules and series of a cached run
    ShowRun {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one quantity history from a run as CSV
    ExportSeries {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Module ID
        module: String,
        /// Phase name (e.g., inflow, outflow, state)
        phase: String,
        /// Quantity name (e.g., temp, pressure, flowrate)
        quantity: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Modules { project_path } => cmd_modules(&project_path),
        Commands::Run {
            project_path,
            no_cache,
        } => cmd_run(&project_path, !no_cache),
        Commands::Runs { project_path } => cmd_runs(&project_path),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::ExportSeries {
            project_path,
            run_id,
            module,
            phase,
            quantity,
            output,
        } => cmd_export_series(
            &project_path,
            &run_id,
            &module,
            &phase,
            &quantity,
            output.as_deref(),
        ),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_modules(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let modules = project_service::list_modules(&project);

    if modules.is_empty() {
        println!("No modules found in project");
    } else {
        println!("Modules in project '{}':", project.name);
        for module in modules {
            println!(
                "  {} - {} ({} inflow, {} outflow ports)",
                module.id, module.kind, module.inflow_ports, module.outflow_ports
            );
        }
        println!("Connections: {}", project.connections.len());
    }
    Ok(())
}

fn cmd_run(project_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running project: {}", project_path.display());

    let request = RunRequest {
        project_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };
    let response = run_service::ensure_run(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    for module in &response.manifest.modules {
        println!(
            "  {} ({}): {} steps, {:.1} s -> {:.1} s",
            module.name, module.kind, module.steps, module.initial_time_s, module.end_time_s
        );
    }
    println!("  Total time: {:.3} s", response.timing.total_time_s);
    Ok(())
}

fn cmd_runs(project_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(project_path)?;

    if runs.is_empty() {
        println!("No cached runs found");
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.timestamp);
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(project_path, run_id)?;

    println!("\nRun Summary:");
    println!("  Project: {}", manifest.project_name);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Solver version: {}", manifest.solver_version);

    println!("\nModules:");
    for module in &manifest.modules {
        println!(
            "  {} ({}) {} steps of {} s",
            module.name, module.kind, module.steps, module.time_step_s
        );
    }

    println!("\nSeries:");
    for (module, phase, quantity) in query::list_series(&records) {
        println!("  {}.{}.{}", module, phase, quantity);
    }

    Ok(())
}

fn cmd_export_series(
    project_path: &Path,
    run_id: &str,
    module: &str,
    phase: &str,
    quantity: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, records) = run_service::load_run(project_path, run_id)?;
    let series = query::extract_series(&records, module, phase, quantity)?;
    let csv = query::series_to_csv(series);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.points.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
