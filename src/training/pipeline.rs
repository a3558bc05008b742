//! End-to-end training: prepare, scale, evaluate, select, persist

use super::candidates::CandidateModel;
use super::config::PipelineConfig;
use super::evaluator::TrainingEvaluator;
use super::models::ModelMetrics;
use super::selector::ModelSelector;
use crate::artifacts::ArtifactStore;
use crate::error::Result;
use crate::preprocessing::{FeaturePreparer, Scaler};
use crate::tracking::ExperimentTracker;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Score of one candidate in a finished run
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub label: String,
    pub run_id: String,
    pub metrics: ModelMetrics,
}

/// What a training run produced
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub experiment_id: String,
    /// In declaration order
    pub candidates: Vec<CandidateSummary>,
    pub selected: String,
    pub selected_auc: f64,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
    pub elapsed_secs: f64,
}

/// Runs the full training workflow described by a [`PipelineConfig`]
pub struct TrainingPipeline {
    config: PipelineConfig,
}

impl TrainingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Train every candidate and persist the best one.
    ///
    /// Artifacts are written only after all candidates are scored and a
    /// winner is chosen; any earlier error leaves the artifact directory
    /// untouched.
    pub fn run(&self) -> Result<TrainingReport> {
        let start = Instant::now();
        let cfg = &self.config;
        info!(data = %cfg.data_path.display(), "Starting training run");

        let prepared = FeaturePreparer::new()
            .with_target_column(cfg.target_column.clone())
            .with_test_size(cfg.test_size)
            .with_seed(cfg.split_seed)
            .with_imputation_scope(cfg.imputation_scope)
            .prepare_csv(&cfg.data_path)?;

        let mut scaler = Scaler::new();
        let x_train = scaler.fit_transform(&prepared.x_train)?;
        let x_test = scaler.transform(&prepared.x_test)?;

        let tracker = ExperimentTracker::with_dir(&cfg.tracking_dir);
        if let Err(e) = tracker.load() {
            let moved = tracker.set_aside_store()?;
            warn!(
                error = %e,
                moved_to = ?moved,
                "Tracking store unreadable; moved aside and starting a new one"
            );
        }
        let experiment_id = tracker.create_experiment(&cfg.experiment_name);
        let evaluator = TrainingEvaluator::new(&tracker);

        let mut fitted = Vec::new();
        let mut summaries = Vec::new();
        for mut model in CandidateModel::default_candidates(cfg.model_seed) {
            let label = model.label();
            let evaluation = evaluator.evaluate(
                &mut model,
                label,
                &x_train,
                &prepared.y_train,
                &x_test,
                &prepared.y_test,
            )?;
            summaries.push(CandidateSummary {
                label: evaluation.label,
                run_id: evaluation.run_id,
                metrics: evaluation.metrics,
            });
            fitted.push(model);
        }

        let scores: Vec<(&str, f64)> = summaries
            .iter()
            .map(|s| (s.label.as_str(), s.metrics.roc_auc))
            .collect();
        let best = ModelSelector::select(&scores)?;
        let selected_auc = scores[best].1;
        let model = fitted.swap_remove(best);
        info!(model = model.label(), roc_auc = selected_auc, "Selected best model");

        let store = ArtifactStore::new(&cfg.artifact_dir);
        store.persist(&model, &scaler)?;

        if let Err(e) = tracker.save() {
            warn!(error = %e, "Failed to save tracking store");
        }

        Ok(TrainingReport {
            experiment_id,
            selected: model.label().to_string(),
            selected_auc,
            candidates: summaries,
            model_path: store.model_path(),
            scaler_path: store.scaler_path(),
            train_rows: x_train.nrows(),
            test_rows: x_test.nrows(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}
