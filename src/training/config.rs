//! Training pipeline configuration

use crate::preprocessing::ImputationScope;
use crate::schema::TARGET_COLUMN;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one end-to-end training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw training CSV
    pub data_path: PathBuf,

    /// Severity column binarized into the label
    pub target_column: String,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the stratified split
    pub split_seed: u64,

    /// Seed for model randomness
    pub model_seed: u64,

    pub imputation_scope: ImputationScope,

    /// Where `model.bin` and `scaler.bin` are written
    pub artifact_dir: PathBuf,

    /// Experiment tracking store
    pub tracking_dir: PathBuf,

    pub experiment_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/heart_disease_uci.csv"),
            target_column: TARGET_COLUMN.to_string(),
            test_size: 0.30,
            split_seed: 4,
            model_seed: 42,
            imputation_scope: ImputationScope::TrainingSplit,
            artifact_dir: PathBuf::from("artifacts"),
            tracking_dir: PathBuf::from("mlruns"),
            experiment_name: "Heart Disease Prediction".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Self::default()
        }
    }

    pub fn with_target_column(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    pub fn with_model_seed(mut self, seed: u64) -> Self {
        self.model_seed = seed;
        self
    }

    pub fn with_imputation_scope(mut self, scope: ImputationScope) -> Self {
        self.imputation_scope = scope;
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_tracking_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tracking_dir = dir.into();
        self
    }

    pub fn with_experiment_name(mut self, name: impl Into<String>) -> Self {
        self.experiment_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_column, "num");
        assert_eq!(config.test_size, 0.30);
        assert_eq!(config.split_seed, 4);
        assert_eq!(config.model_seed, 42);
        assert_eq!(config.imputation_scope, ImputationScope::TrainingSplit);
        assert_eq!(config.artifact_dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new("heart.csv")
            .with_imputation_scope(ImputationScope::FullDataset)
            .with_artifact_dir("/tmp/a")
            .with_experiment_name("trial");

        assert_eq!(config.data_path, PathBuf::from("heart.csv"));
        assert_eq!(config.imputation_scope, ImputationScope::FullDataset);
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/a"));
        assert_eq!(config.experiment_name, "trial");
    }
}
