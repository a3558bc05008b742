//! Experiment tracker
//!
//! Records one run per candidate model: parameters, metrics, tags, artifact
//! paths and final status. State is kept in memory and flushed to the storage
//! backend on [`ExperimentTracker::save`].

use super::storage::{LocalStorage, StorageBackend};
use crate::error::{HeartError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Configuration for experiment tracking
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Root directory for experiments and run artifacts
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("mlruns"),
        }
    }
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// A run within an experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    pub tags: BTreeMap<String, String>,
    pub artifacts: Vec<String>,
    pub status: RunStatus,
}

impl Run {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().simple().to_string(),
            run_name: run_name.into(),
            start_time: Utc::now(),
            end_time: None,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            tags: BTreeMap::new(),
            artifacts: Vec::new(),
            status: RunStatus::Running,
        }
    }
}

/// An experiment containing multiple runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub runs: Vec<Run>,
}

impl Experiment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            experiment_id: Uuid::new_v4().simple().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            runs: Vec::new(),
        }
    }
}

/// Experiment tracker
pub struct ExperimentTracker {
    config: ExperimentConfig,
    storage: Box<dyn StorageBackend + Send + Sync>,
    current_experiment: RwLock<Option<Experiment>>,
    current_run: RwLock<Option<Run>>,
    experiments: RwLock<BTreeMap<String, Experiment>>,
}

impl ExperimentTracker {
    pub fn new(config: ExperimentConfig) -> Self {
        let storage = Box::new(LocalStorage::new(config.output_dir.clone()));
        Self {
            config,
            storage,
            current_experiment: RwLock::new(None),
            current_run: RwLock::new(None),
            experiments: RwLock::new(BTreeMap::new()),
        }
    }

    /// Tracker rooted at `output_dir` with default settings
    pub fn with_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self::new(ExperimentConfig {
            output_dir: output_dir.into(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Reuse the experiment with this name if one is loaded, else create it.
    /// Returns the experiment id and makes it current.
    pub fn create_experiment(&self, name: impl Into<String>) -> String {
        let name = name.into();
        let existing = self
            .experiments
            .read()
            .ok()
            .and_then(|e| e.values().find(|exp| exp.name == name).cloned());
        let experiment = existing.unwrap_or_else(|| Experiment::new(&name));
        let experiment_id = experiment.experiment_id.clone();

        if let Ok(mut experiments) = self.experiments.write() {
            experiments.entry(experiment_id.clone()).or_insert_with(|| experiment.clone());
        }
        if let Ok(mut current) = self.current_experiment.write() {
            *current = Some(experiment);
        }

        experiment_id
    }

    /// Open a new run; any run left open is closed as failed first
    pub fn start_run(&self, run_name: impl Into<String>) -> String {
        if self.current_run().is_some() {
            self.end_run(RunStatus::Failed);
        }

        let run = Run::new(run_name);
        let run_id = run.run_id.clone();
        debug!(run_id = %run_id, run_name = %run.run_name, "Started run");

        if let Ok(mut current) = self.current_run.write() {
            *current = Some(run);
        }
        run_id
    }

    pub fn log_param(&self, key: impl Into<String>, value: impl Into<String>) {
        self.with_run(|r| {
            r.params.insert(key.into(), value.into());
        });
    }

    pub fn log_params(&self, params: BTreeMap<String, String>) {
        self.with_run(|r| r.params.extend(params));
    }

    /// Log a metric; a repeated name keeps the latest value
    pub fn log_metric(&self, name: impl Into<String>, value: f64) {
        self.with_run(|r| {
            r.metrics.insert(name.into(), value);
        });
    }

    pub fn log_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.with_run(|r| {
            r.tags.insert(key.into(), value.into());
        });
    }

    pub fn log_artifact(&self, path: impl Into<String>) {
        self.with_run(|r| r.artifacts.push(path.into()));
    }

    /// Serialize `value` as pretty JSON under the current run's artifact
    /// directory and record its path.
    pub fn log_artifact_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let run_id = self
            .current_run()
            .map(|r| r.run_id)
            .ok_or_else(|| HeartError::Training("no active run to attach an artifact to".to_string()))?;
        let experiment_id = self
            .current_experiment()
            .map(|e| e.experiment_id)
            .unwrap_or_else(|| "default".to_string());

        let dir = self.config.output_dir.join(experiment_id).join(&run_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;

        self.log_artifact(path.display().to_string());
        Ok(path)
    }

    /// Close the current run and attach it to the current experiment
    pub fn end_run(&self, status: RunStatus) {
        let completed = match self.current_run.write() {
            Ok(mut guard) => guard.take(),
            Err(_) => return,
        };
        let Some(mut run) = completed else { return };
        run.end_time = Some(Utc::now());
        run.status = status;
        debug!(run_id = %run.run_id, status = ?status, "Ended run");

        if let Ok(mut exp) = self.current_experiment.write() {
            if let Some(ref mut e) = *exp {
                e.runs.push(run.clone());
                if let Ok(mut experiments) = self.experiments.write() {
                    if let Some(stored) = experiments.get_mut(&e.experiment_id) {
                        stored.runs.push(run);
                    }
                }
            }
        }
    }

    pub fn current_run(&self) -> Option<Run> {
        self.current_run.read().ok().and_then(|r| r.clone())
    }

    pub fn current_experiment(&self) -> Option<Experiment> {
        self.current_experiment.read().ok().and_then(|e| e.clone())
    }

    pub fn get_experiment(&self, experiment_id: &str) -> Option<Experiment> {
        self.experiments.read().ok().and_then(|e| e.get(experiment_id).cloned())
    }

    pub fn list_experiments(&self) -> Vec<Experiment> {
        self.experiments
            .read()
            .map(|e| e.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Persist every known experiment
    pub fn save(&self) -> Result<()> {
        self.storage.save_experiments(&self.list_experiments())
    }

    /// Move an unreadable store out of the way so the next `save` cannot
    /// overwrite it. Returns the new location, if there was a file.
    pub fn set_aside_store(&self) -> Result<Option<PathBuf>> {
        let suffix = format!("corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3f"));
        self.storage.set_aside(&suffix)
    }

    /// Merge experiments from storage into memory
    pub fn load(&self) -> Result<()> {
        let loaded = self.storage.load_experiments()?;
        if let Ok(mut stored) = self.experiments.write() {
            for exp in loaded {
                stored.insert(exp.experiment_id.clone(), exp);
            }
        }
        Ok(())
    }

    fn with_run(&self, f: impl FnOnce(&mut Run)) {
        if let Ok(mut run) = self.current_run.write() {
            if let Some(ref mut r) = *run {
                f(r);
            }
        }
    }
}
