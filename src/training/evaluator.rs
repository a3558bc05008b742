//! Fit-and-score one candidate inside a tracking run

use super::candidates::CandidateModel;
use super::models::{Classifier, ModelMetrics};
use crate::error::Result;
use crate::tracking::{ExperimentTracker, RunStatus};
use ndarray::{Array1, Array2};
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of evaluating one candidate on the test split
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub label: String,
    pub run_id: String,
    pub metrics: ModelMetrics,
}

impl Evaluation {
    /// Ranking metric used by model selection
    pub fn auc(&self) -> f64 {
        self.metrics.roc_auc
    }
}

/// Trains candidates and records each one as a tracking run
pub struct TrainingEvaluator<'a> {
    tracker: &'a ExperimentTracker,
}

impl<'a> TrainingEvaluator<'a> {
    pub fn new(tracker: &'a ExperimentTracker) -> Self {
        Self { tracker }
    }

    /// Fit `model`, score it on the test split and return its ROC-AUC
    pub fn run(
        &self,
        model: &mut CandidateModel,
        label: &str,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<f64> {
        self.evaluate(model, label, x_train, y_train, x_test, y_test)
            .map(|e| e.auc())
    }

    /// As [`run`](Self::run), returning every metric.
    ///
    /// The run is closed as failed when any step errors.
    pub fn evaluate(
        &self,
        model: &mut CandidateModel,
        label: &str,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<Evaluation> {
        let run_id = self.tracker.start_run(label);
        self.tracker.log_param("model_type", label);
        self.tracker.log_params(model.get_params());

        match self.fit_and_score(model, x_train, y_train, x_test, y_test) {
            Ok(metrics) => {
                self.tracker.end_run(RunStatus::Finished);
                info!(
                    model = label,
                    accuracy = metrics.accuracy,
                    f1 = metrics.f1_score,
                    roc_auc = metrics.roc_auc,
                    fit_secs = metrics.training_time_secs,
                    "Evaluated candidate"
                );
                Ok(Evaluation {
                    label: label.to_string(),
                    run_id,
                    metrics,
                })
            }
            Err(e) => {
                warn!(model = label, error = %e, "Candidate failed");
                self.tracker.log_tag("error", e.to_string());
                self.tracker.end_run(RunStatus::Failed);
                Err(e)
            }
        }
    }

    fn fit_and_score(
        &self,
        model: &mut CandidateModel,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<ModelMetrics> {
        let start = Instant::now();
        model.fit(x_train, y_train)?;
        let fit_secs = start.elapsed().as_secs_f64();

        let y_pred = model.predict(x_test)?;
        let y_prob = model.predict_positive_proba(x_test)?;

        let mut metrics = ModelMetrics::compute_classification(y_test, &y_pred, &y_prob)?;
        metrics.training_time_secs = fit_secs;

        for (name, value) in metrics.as_pairs() {
            self.tracker.log_metric(name, value);
        }
        self.tracker.log_artifact_json("model.json", &*model)?;
        Ok(metrics)
    }
}
