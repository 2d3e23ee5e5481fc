//! Project loading, validation and introspection.

use bop_project::schema::Project;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Summary of a module for listing.
#[derive(Debug, Clone)]
pub struct ModuleSummary {
    pub id: String,
    pub kind: &'static str,
    pub inflow_ports: usize,
    pub outflow_ports: usize,
}

/// Load, migrate and validate a project file (YAML, or JSON by extension).
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(bop_project::load(path)?)
}

/// Validate project structure beyond what the schema checks: a runnable
/// project needs at least one module.
pub fn validate_project(project: &Project) -> AppResult<()> {
    bop_project::validate_project(project)?;
    if project.modules.is_empty() {
        return Err(AppError::Validation(
            "Project must have at least one module".to_string(),
        ));
    }
    Ok(())
}

pub fn list_modules(project: &Project) -> Vec<ModuleSummary> {
    project
        .modules
        .iter()
        .map(|module| ModuleSummary {
            id: module.id.clone(),
            kind: module.kind.type_name(),
            inflow_ports: module.kind.inflow_ports().len(),
            outflow_ports: module.kind.outflow_ports().len(),
        })
        .collect()
}
