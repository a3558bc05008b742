//! Local experiment tracking
//!
//! An MLflow-style store: experiments hold runs, runs hold parameters,
//! metrics, tags and artifact paths.

mod storage;
mod tracker;

pub use storage::{LocalStorage, StorageBackend};
pub use tracker::{Experiment, ExperimentConfig, ExperimentTracker, Run, RunStatus};
