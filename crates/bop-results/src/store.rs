//! On-disk run store.
//!
//! Layout, one directory per run id:
//!
//! ```text
//! <root>/<run_id>/manifest.json     pretty-printed RunManifest
//! <root>/<run_id>/histories.jsonl   one HistoryRecord per line
//! ```
//!
//! A run exists once its manifest is written. Histories are written first so
//! a crash mid-save never leaves a manifest pointing at missing data.

use crate::types::{HistoryRecord, RunManifest};
use crate::{ResultsError, ResultsResult};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const HISTORIES_FILE: &str = "histories.jsonl";

#[derive(Clone, Debug)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store kept next to the project file, in `.bop/runs`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let Some(dir) = project_path.parent() else {
            return Err(ResultsError::InvalidPath {
                message: format!("{} has no parent directory", project_path.display()),
            });
        };
        Self::new(dir.join(".bop").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Run ids are content hashes; anything that could leave the root is refused.
    fn run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        let plain = !run_id.is_empty()
            && run_id != "."
            && run_id != ".."
            && !run_id.contains(['/', '\\']);
        if !plain {
            return Err(ResultsError::InvalidPath {
                message: format!("run id {run_id:?} is not a plain name"),
            });
        }
        Ok(self.root.join(run_id))
    }

    /// Path of `file` inside an existing run, or `RunNotFound`.
    fn stored(&self, run_id: &str, file: &str) -> ResultsResult<PathBuf> {
        let path = self.run_dir(run_id)?.join(file);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            })
        }
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.stored(run_id, MANIFEST_FILE).is_ok()
    }

    pub fn save_run(&self, manifest: &RunManifest, records: &[HistoryRecord]) -> ResultsResult<()> {
        let dir = self.run_dir(&manifest.run_id)?;
        fs::create_dir_all(&dir)?;

        let mut out = BufWriter::new(File::create(dir.join(HISTORIES_FILE))?);
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(manifest)?)?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let path = self.stored(run_id, MANIFEST_FILE)?;
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    pub fn load_histories(&self, run_id: &str) -> ResultsResult<Vec<HistoryRecord>> {
        let path = self.stored(run_id, HISTORIES_FILE)?;
        let mut records = Vec::new();
        for line in BufReader::new(File::open(path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Runs of one project, oldest first. Directories without a readable
    /// manifest are skipped.
    pub fn list_runs(&self, project_name: &str) -> ResultsResult<Vec<RunManifest>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(run_id) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            match self.load_manifest(&run_id) {
                Ok(manifest) if manifest.project_name == project_name => runs.push(manifest),
                _ => {}
            }
        }
        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.run_id.cmp(&b.run_id)));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let dir = self.run_dir(run_id)?;
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> RunStore {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        RunStore::new(dir).unwrap()
    }

    #[test]
    fn run_ids_cannot_escape_the_root() {
        let store = scratch("bop_results_store_escape");
        for bad in ["", "..", "../elsewhere", "a/b", r"a\b"] {
            assert!(
                matches!(store.load_manifest(bad), Err(ResultsError::InvalidPath { .. })),
                "{bad:?}"
            );
            assert!(!store.has_run(bad));
        }
    }

    #[test]
    fn histories_without_manifest_is_not_a_run() {
        let store = scratch("bop_results_store_partial");
        let dir = store.root_dir().join("partial");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(HISTORIES_FILE), "\n").unwrap();

        assert!(!store.has_run("partial"));
        assert!(store.load_histories("partial").unwrap().is_empty());
        assert!(store.list_runs("anything").unwrap().is_empty());
    }
}
