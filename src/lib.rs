//! Heart disease classifier
//!
//! Trains three candidate classifiers on the UCI heart disease data, keeps
//! the one with the best held-out ROC-AUC, and serves it over HTTP.
//!
//! # Modules
//!
//! ## Data
//! - [`schema`] - The 13 clinical features and the request record
//! - [`utils`] - CSV loading
//! - [`preprocessing`] - Validation, split, imputation, scaling
//!
//! ## Modelling
//! - [`training`] - Candidate models, evaluation, selection, the pipeline
//! - [`tracking`] - Experiment tracking of runs, params and metrics
//! - [`artifacts`] - Persisted model and scaler
//!
//! ## Services
//! - [`inference`] - Single-record scoring
//! - [`monitoring`] - Request counter behind `GET /metrics`
//! - [`server`] - HTTP API
//! - [`cli`] - Command-line interface

pub mod error;
pub mod schema;

pub mod preprocessing;
pub mod training;
pub mod inference;

pub mod artifacts;
pub mod monitoring;
pub mod tracking;
pub mod utils;

pub mod server;
pub mod cli;

pub use error::{HeartError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HeartError, Result};

    pub use crate::schema::{PatientRecord, FEATURES, FEATURE_COUNT};

    pub use crate::preprocessing::{FeaturePreparer, ImputationScope, PreparedData, Scaler};

    pub use crate::training::{
        CandidateModel, Classifier, ModelMetrics, ModelSelector, PipelineConfig,
        TrainingEvaluator, TrainingPipeline, TrainingReport,
    };

    pub use crate::artifacts::{ArtifactPair, ArtifactStore};

    pub use crate::inference::{Prediction, PredictionService};

    pub use crate::monitoring::MetricsCounter;

    pub use crate::tracking::{Experiment, ExperimentConfig, ExperimentTracker, Run};
}
