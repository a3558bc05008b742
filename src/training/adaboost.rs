//! AdaBoost (SAMME) over decision stumps
//!
//! Each round fits the stump with the lowest weighted error, then upweights
//! the samples it misclassified.

use super::models::{check_training_data, check_width, Classifier};
use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single decision stump: splits on one feature at one threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Stump {
    feature_index: usize,
    threshold: f64,
    /// Prediction when feature <= threshold
    left_label: f64,
    /// Prediction when feature > threshold
    right_label: f64,
}

impl Stump {
    fn predict_sample(&self, sample: ArrayView1<f64>) -> f64 {
        if sample[self.feature_index] <= self.threshold {
            self.left_label
        } else {
            self.right_label
        }
    }
}

/// Binary AdaBoost classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostClassifier {
    pub n_estimators: usize,
    pub learning_rate: f64,
    stumps: Vec<Stump>,
    alphas: Vec<f64>,
    n_features: Option<usize>,
}

impl Default for AdaBoostClassifier {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostClassifier {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            stumps: Vec::new(),
            alphas: Vec::new(),
            n_features: None,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Boosting rounds actually kept; fewer than `n_estimators` on early stop
    pub fn n_rounds(&self) -> usize {
        self.stumps.len()
    }

    /// Lowest weighted-error stump.
    ///
    /// One sorted sweep per feature; left-side class weights accumulate so
    /// each threshold costs O(1).
    fn fit_stump(x: &Array2<f64>, y: &Array1<f64>, weights: &Array1<f64>) -> Option<(Stump, f64)> {
        let total_pos: f64 = y.iter().zip(weights.iter()).filter(|(t, _)| **t > 0.5).map(|(_, w)| w).sum();
        let total_neg: f64 = weights.sum() - total_pos;

        let mut best: Option<(Stump, f64)> = None;
        for f in 0..x.ncols() {
            let col = x.column(f);
            let mut order: Vec<usize> = (0..x.nrows()).collect();
            order.sort_by(|&a, &b| col[a].total_cmp(&col[b]));

            let (mut left_neg, mut left_pos) = (0.0, 0.0);
            for k in 0..order.len().saturating_sub(1) {
                let i = order[k];
                if y[i] > 0.5 {
                    left_pos += weights[i];
                } else {
                    left_neg += weights[i];
                }
                let (v, next) = (col[i], col[order[k + 1]]);
                if v == next {
                    continue;
                }
                let threshold = (v + next) / 2.0;

                // left -> 0, right -> 1 | left -> 1, right -> 0
                let options = [
                    (0.0, 1.0, left_pos + (total_neg - left_neg)),
                    (1.0, 0.0, left_neg + (total_pos - left_pos)),
                ];
                for (left_label, right_label, error) in options {
                    if best.as_ref().map_or(true, |(_, e)| error < *e) {
                        best = Some((
                            Stump { feature_index: f, threshold, left_label, right_label },
                            error,
                        ));
                    }
                }
            }
        }
        best
    }

    /// Alpha-weighted class scores normalized by total alpha: `(s0, s1)`
    fn class_scores(&self, sample: ArrayView1<f64>) -> (f64, f64) {
        let total: f64 = self.alphas.iter().sum();
        let s1: f64 = self
            .stumps
            .iter()
            .zip(self.alphas.iter())
            .filter(|(stump, _)| stump.predict_sample(sample) > 0.5)
            .map(|(_, a)| a)
            .sum();
        if total > 0.0 {
            ((total - s1) / total, s1 / total)
        } else {
            (0.5, 0.5)
        }
    }
}

impl Classifier for AdaBoostClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(x, y)?;
        let n_samples = x.nrows();
        let mut weights = Array1::from_elem(n_samples, 1.0 / n_samples as f64);

        self.stumps.clear();
        self.alphas.clear();

        for round in 0..self.n_estimators {
            let Some((stump, _)) = Self::fit_stump(x, y, &weights) else {
                break;
            };

            let missed: Vec<bool> = x
                .rows()
                .into_iter()
                .zip(y.iter())
                .map(|(row, &t)| stump.predict_sample(row) != t)
                .collect();
            let error: f64 = missed.iter().zip(weights.iter()).filter(|(m, _)| **m).map(|(_, w)| w).sum::<f64>()
                / weights.sum();

            if error <= 0.0 {
                // Perfect stump: keep it and stop
                self.stumps.push(stump);
                self.alphas.push(1.0);
                break;
            }
            if error >= 0.5 {
                tracing::debug!(round, error, "Stump no better than chance; stopping");
                break;
            }

            // SAMME with two classes: ln(K - 1) = 0
            let alpha = self.learning_rate * ((1.0 - error) / error).ln();

            for (w, &m) in weights.iter_mut().zip(missed.iter()) {
                if m {
                    *w *= alpha.exp();
                }
            }
            let w_sum = weights.sum();
            if w_sum <= 0.0 || !w_sum.is_finite() {
                return Err(HeartError::Training("AdaBoost sample weights collapsed".to_string()));
            }
            weights /= w_sum;

            self.stumps.push(stump);
            self.alphas.push(alpha);
        }

        if self.stumps.is_empty() {
            return Err(HeartError::Training(
                "AdaBoost found no weak learner better than chance".to_string(),
            ));
        }

        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.n_features, x)?;
        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                let (s0, s1) = self.class_scores(row);
                if s1 > s0 { 1.0 } else { 0.0 }
            })
            .collect())
    }

    /// Softmax over the normalized class scores
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_width(self.n_features, x)?;
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, row) in x.rows().into_iter().enumerate() {
            let (s0, s1) = self.class_scores(row);
            let max = s0.max(s1);
            let (e0, e1) = ((s0 - max).exp(), (s1 - max).exp());
            proba[[i, 0]] = e0 / (e0 + e1);
            proba[[i, 1]] = e1 / (e0 + e1);
        }
        Ok(proba)
    }

    fn get_params(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("algorithm".to_string(), "SAMME".to_string()),
            ("estimator".to_string(), "stump".to_string()),
            ("learning_rate".to_string(), self.learning_rate.to_string()),
            ("n_estimators".to_string(), self.n_estimators.to_string()),
        ])
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}
