//! Classifier trait and evaluation metrics

use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Binary classifier over standardized feature matrices.
///
/// Labels are `0.0` / `1.0`; `predict_proba` returns one row per sample with
/// columns `[P(0), P(1)]`.
pub trait Classifier: Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Hyperparameters as printable strings, sorted by name
    fn get_params(&self) -> BTreeMap<String, String>;

    /// Feature count seen during `fit`
    fn n_features(&self) -> Option<usize>;

    /// Probability of the positive class for each row
    fn predict_positive_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.predict_proba(x)?.column(1).to_owned())
    }
}

/// Validate a training pair: matching lengths, non-empty, labels in {0, 1}
pub(crate) fn check_training_data(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(HeartError::Training(format!(
            "feature rows ({}) and labels ({}) differ",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(HeartError::Training("empty training matrix".to_string()));
    }
    if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
        return Err(HeartError::Training(format!("labels must be 0 or 1, found {}", bad)));
    }
    Ok(())
}

/// Fail unless `x` has the fitted number of columns
pub(crate) fn check_width(fitted: Option<usize>, x: &Array2<f64>) -> Result<()> {
    match fitted {
        None => Err(HeartError::ModelNotFitted),
        Some(expected) if expected != x.ncols() => Err(HeartError::SchemaMismatch {
            expected,
            actual: x.ncols(),
        }),
        Some(_) => Ok(()),
    }
}

/// Test-split metrics for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    /// Wall-clock fit time
    pub training_time_secs: f64,
    /// Rows in the evaluated split
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Compute all classification metrics.
    ///
    /// Precision and recall are 0 when their denominator is 0. ROC-AUC needs
    /// both classes in `y_true`.
    pub fn compute_classification(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        y_prob: &Array1<f64>,
    ) -> Result<Self> {
        if y_true.len() != y_pred.len() || y_true.len() != y_prob.len() {
            return Err(HeartError::Training("metric inputs differ in length".to_string()));
        }
        if y_true.is_empty() {
            return Err(HeartError::Training("cannot score an empty split".to_string()));
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();
        let accuracy = correct as f64 / y_true.len() as f64;

        let (tp, fp, _, fn_) = Self::confusion_counts(y_true, y_pred);
        let precision = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
        let recall = if tp + fn_ > 0 { tp as f64 / (tp + fn_) as f64 } else { 0.0 };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy,
            precision,
            recall,
            f1_score,
            roc_auc: roc_auc(y_true, y_prob)?,
            training_time_secs: 0.0,
            n_samples: y_true.len(),
        })
    }

    /// Metric name/value pairs as logged to the tracker
    pub fn as_pairs(&self) -> [(&'static str, f64); 5] {
        [
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
            ("roc_auc", self.roc_auc),
        ]
    }

    fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
        let mut tp = 0;
        let mut fp = 0;
        let mut tn = 0;
        let mut fn_ = 0;

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        (tp, fp, tn, fn_)
    }
}

/// Area under the ROC curve via the Mann-Whitney U statistic.
///
/// Tied scores share their average rank.
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<f64> {
    let n_pos = y_true.iter().filter(|&&v| v > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(HeartError::Training(
            "ROC-AUC is undefined when only one class is present".to_string(),
        ));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(HeartError::Training("non-finite score in ROC-AUC input".to_string()));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j+1 averaged
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(t, _)| **t > 0.5)
        .map(|(_, r)| r)
        .sum();
    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    Ok(u / (n_pos * n_neg as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        let y_prob = array![0.9, 0.2, 0.8, 0.4, 0.1, 0.7, 0.6, 0.3];

        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred, &y_prob).unwrap();

        assert_eq!(metrics.accuracy, 0.75);
        assert_eq!(metrics.precision, 0.75);
        assert_eq!(metrics.recall, 0.75);
        assert!((metrics.f1_score - 0.75).abs() < 1e-12);
        // one inverted pair (0.4 positive below 0.6 negative) out of 16
        assert!((metrics.roc_auc - 15.0 / 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_auc_perfect_and_ties() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        assert_eq!(roc_auc(&y, &array![0.1, 0.2, 0.8, 0.9]).unwrap(), 1.0);
        assert_eq!(roc_auc(&y, &array![0.5, 0.5, 0.5, 0.5]).unwrap(), 0.5);
        assert_eq!(roc_auc(&y, &array![0.9, 0.8, 0.2, 0.1]).unwrap(), 0.0);
    }

    #[test]
    fn test_auc_single_class() {
        let err = roc_auc(&array![1.0, 1.0], &array![0.3, 0.6]).unwrap_err();
        assert!(matches!(err, HeartError::Training(_)));
    }

    #[test]
    fn test_zero_denominators() {
        let y_true = array![1.0, 0.0];
        let y_pred = array![0.0, 0.0];
        let metrics =
            ModelMetrics::compute_classification(&y_true, &y_pred, &array![0.2, 0.1]).unwrap();
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1_score, 0.0);
    }

    #[test]
    fn test_check_training_data() {
        let x = array![[1.0], [2.0]];
        assert!(check_training_data(&x, &array![0.0, 1.0]).is_ok());
        assert!(check_training_data(&x, &array![0.0, 2.0]).is_err());
        assert!(check_training_data(&x, &array![0.0]).is_err());
    }
}
