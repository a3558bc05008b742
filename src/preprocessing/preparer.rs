//! Raw dataset to model-ready train/test matrices

use super::imputer::{missing_per_column, ModeImputer};
use super::split::stratified_split;
use crate::error::{HeartError, Result};
use crate::schema::{FEATURES, FEATURE_COUNT, TARGET_COLUMN};
use crate::utils::{numeric_column, DataLoader};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Which rows the imputation mode is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputationScope {
    /// Mode from the training split only, applied to both splits
    #[default]
    TrainingSplit,
    /// Mode from every row before splitting
    FullDataset,
}

/// Feature matrix and raw severity as read from disk; missing cells are `NaN`
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub features: Array2<f64>,
    pub severity: Array1<f64>,
}

impl RawDataset {
    /// Extract the canonical feature columns and the target from a frame.
    ///
    /// Only the imputable columns may carry missing values; the target must be
    /// complete.
    pub fn from_dataframe(df: &DataFrame, target_column: &str) -> Result<Self> {
        let target = numeric_column(df, target_column).map_err(|_| {
            HeartError::DataFormat(format!("missing or non-numeric target column '{}'", target_column))
        })?;
        let severity = target
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    HeartError::DataFormat(format!("target '{}' is missing at row {}", target_column, row))
                })
            })
            .collect::<Result<Array1<f64>>>()?;

        let n_rows = df.height();
        let mut features = Array2::<f64>::zeros((n_rows, FEATURE_COUNT));
        for (j, spec) in FEATURES.iter().enumerate() {
            let values = numeric_column(df, spec.csv_name)?;
            for (i, v) in values.into_iter().enumerate() {
                features[[i, j]] = match v {
                    Some(v) => v,
                    None if spec.imputable => f64::NAN,
                    None => {
                        return Err(HeartError::DataFormat(format!(
                            "column '{}' has a missing value at row {}",
                            spec.csv_name, i
                        )))
                    }
                };
            }
        }

        Ok(Self { features, severity })
    }

    /// Binary label: 1 when severity is above zero
    pub fn labels(&self) -> Array1<f64> {
        self.severity.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }
}

/// Imputed, split, unscaled matrices ready for the scaler
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    pub imputer: ModeImputer,
    /// Number of cells filled by imputation across both splits
    pub n_imputed: usize,
}

/// Loads, validates, labels, splits and imputes the training data
#[derive(Debug, Clone)]
pub struct FeaturePreparer {
    target_column: String,
    test_size: f64,
    seed: u64,
    scope: ImputationScope,
}

impl Default for FeaturePreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePreparer {
    pub fn new() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_size: 0.30,
            seed: 4,
            scope: ImputationScope::default(),
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

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_imputation_scope(mut self, scope: ImputationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Read and validate the CSV at `path`
    pub fn load(&self, path: impl AsRef<Path>) -> Result<RawDataset> {
        let df = DataLoader::new().load_csv(path)?;
        RawDataset::from_dataframe(&df, &self.target_column)
    }

    /// Load then prepare in one step
    pub fn prepare_csv(&self, path: impl AsRef<Path>) -> Result<PreparedData> {
        let raw = self.load(path)?;
        self.prepare(raw)
    }

    /// Binarize, split and impute.
    ///
    /// Fails with `DataFormat` if any cell is still missing afterwards.
    pub fn prepare(&self, raw: RawDataset) -> Result<PreparedData> {
        let labels = raw.labels();
        let split = stratified_split(&labels, self.test_size, self.seed)?;

        let imputable: Vec<usize> = FEATURES
            .iter()
            .enumerate()
            .filter(|(_, f)| f.imputable)
            .map(|(i, _)| i)
            .collect();

        let missing = missing_per_column(&raw.features);
        for (spec, count) in FEATURES.iter().zip(missing.iter()).filter(|(_, c)| **c > 0) {
            debug!(column = spec.csv_name, missing = count, "Missing values before imputation");
        }

        let mut imputer = ModeImputer::new();
        let (x_train, x_test, n_imputed) = match self.scope {
            ImputationScope::FullDataset => {
                let mut features = raw.features;
                imputer.fit(&features, &imputable)?;
                let n = imputer.transform(&mut features)?;
                (
                    features.select(Axis(0), &split.train),
                    features.select(Axis(0), &split.test),
                    n,
                )
            }
            ImputationScope::TrainingSplit => {
                let mut x_train = raw.features.select(Axis(0), &split.train);
                let mut x_test = raw.features.select(Axis(0), &split.test);
                imputer.fit(&x_train, &imputable)?;
                let n = imputer.transform(&mut x_train)? + imputer.transform(&mut x_test)?;
                (x_train, x_test, n)
            }
        };

        if x_train.iter().chain(x_test.iter()).any(|v| v.is_nan()) {
            return Err(HeartError::DataFormat(
                "missing values remain after imputation".to_string(),
            ));
        }

        let y_train = labels.select(Axis(0), &split.train);
        let y_test = labels.select(Axis(0), &split.test);

        info!(
            train_rows = x_train.nrows(),
            test_rows = x_test.nrows(),
            positives = labels.iter().filter(|&&v| v > 0.5).count(),
            imputed = n_imputed,
            scope = ?self.scope,
            "Prepared dataset"
        );

        Ok(PreparedData {
            x_train,
            x_test,
            y_train,
            y_test,
            imputer,
            n_imputed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn frame(ca: Vec<Option<f64>>, num: Vec<i64>) -> DataFrame {
        let n = num.len();
        let base: Vec<f64> = (0..n).map(|i| i as f64).collect();
        df!(
            "age" => base.clone(),
            "sex" => vec![1.0; n],
            "cp" => vec![2.0; n],
            "trestbps" => vec![130.0; n],
            "chol" => base.clone(),
            "fbs" => vec![0.0; n],
            "restecg" => vec![1.0; n],
            "thalach" => vec![150.0; n],
            "exang" => vec![0.0; n],
            "oldpeak" => vec![1.5; n],
            "slope" => vec![2.0; n],
            "ca" => ca,
            "thal" => vec![3.0; n],
            "num" => num
        )
        .unwrap()
    }

    #[test]
    fn test_labels_are_binarized() {
        let df = frame(vec![Some(0.0); 5], vec![0, 1, 2, 3, 4]);
        let raw = RawDataset::from_dataframe(&df, "num").unwrap();
        assert_eq!(raw.labels().to_vec(), vec![0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_missing_target_column() {
        let df = frame(vec![Some(0.0); 4], vec![0, 1, 0, 1]);
        let err = RawDataset::from_dataframe(&df, "target").unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn test_missing_non_imputable_value_rejected() {
        let mut df = frame(vec![Some(0.0); 4], vec![0, 1, 0, 1]);
        df.replace("age", Series::new("age".into(), &[Some(1.0), None, Some(3.0), Some(4.0)]))
            .unwrap();
        let err = RawDataset::from_dataframe(&df, "num").unwrap_err();
        assert!(err.to_string().contains("'age'"));
    }

    #[test]
    fn test_prepare_imputes_and_splits() {
        let n = 20;
        let ca: Vec<Option<f64>> = (0..n).map(|i| if i % 5 == 0 { None } else { Some((i % 2) as f64) }).collect();
        let num: Vec<i64> = (0..n).map(|i| (i % 2) as i64 * 2).collect();
        let raw = RawDataset::from_dataframe(&frame(ca, num), "num").unwrap();

        for scope in [ImputationScope::TrainingSplit, ImputationScope::FullDataset] {
            let prepared = FeaturePreparer::new()
                .with_imputation_scope(scope)
                .prepare(raw.clone())
                .unwrap();
            assert_eq!(prepared.x_train.nrows() + prepared.x_test.nrows(), n);
            assert_eq!(prepared.x_test.nrows(), 6);
            assert_eq!(prepared.n_imputed, 4);
            assert!(prepared.x_train.iter().all(|v| v.is_finite()));
            assert!(prepared.y_train.iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }
}
