//! The closed set of candidate model families

use super::adaboost::AdaBoostClassifier;
use super::linear_models::LogisticRegression;
use super::models::Classifier;
use super::random_forest::RandomForest;
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LOGISTIC_REGRESSION: &str = "Logistic Regression";
pub const RANDOM_FOREST: &str = "Random Forest";
pub const ADABOOST: &str = "AdaBoost";

/// One trainable candidate; the persisted model is one of these
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CandidateModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    AdaBoost(AdaBoostClassifier),
}

impl CandidateModel {
    /// Display label, also used as the tracking run name
    pub fn label(&self) -> &'static str {
        match self {
            CandidateModel::LogisticRegression(_) => LOGISTIC_REGRESSION,
            CandidateModel::RandomForest(_) => RANDOM_FOREST,
            CandidateModel::AdaBoost(_) => ADABOOST,
        }
    }

    /// Unfitted candidates in declaration order.
    ///
    /// `seed` drives every source of randomness in the ensemble models.
    pub fn default_candidates(seed: u64) -> Vec<CandidateModel> {
        vec![
            CandidateModel::LogisticRegression(LogisticRegression::new().with_max_iter(1000)),
            CandidateModel::RandomForest(RandomForest::new(100).with_random_state(seed)),
            CandidateModel::AdaBoost(AdaBoostClassifier::new(250, 1.0)),
        ]
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            CandidateModel::LogisticRegression(m) => m,
            CandidateModel::RandomForest(m) => m,
            CandidateModel::AdaBoost(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            CandidateModel::LogisticRegression(m) => m,
            CandidateModel::RandomForest(m) => m,
            CandidateModel::AdaBoost(m) => m,
        }
    }
}

impl Classifier for CandidateModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner().predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().predict_proba(x)
    }

    fn get_params(&self) -> BTreeMap<String, String> {
        self.inner().get_params()
    }

    fn n_features(&self) -> Option<usize> {
        self.inner().n_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_declaration_order() {
        let labels: Vec<_> = CandidateModel::default_candidates(42).iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec![LOGISTIC_REGRESSION, RANDOM_FOREST, ADABOOST]);
    }

    #[test]
    fn test_seed_reaches_forest() {
        let candidates = CandidateModel::default_candidates(42);
        assert_eq!(candidates[1].get_params()["random_state"], "42");
        assert_eq!(candidates[1].get_params()["n_estimators"], "100");
        assert_eq!(candidates[2].get_params()["n_estimators"], "250");
    }

    #[test]
    fn test_delegates_fit_and_predict() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        for mut candidate in CandidateModel::default_candidates(1) {
            assert!(candidate.n_features().is_none());
            candidate.fit(&x, &y).unwrap();
            assert_eq!(candidate.n_features(), Some(1));
            assert_eq!(candidate.predict(&x).unwrap().len(), 4);
        }
    }

    #[test]
    fn test_serde_keeps_family() {
        let model = CandidateModel::AdaBoost(AdaBoostClassifier::new(3, 0.5));
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.starts_with("{\"AdaBoost\":"));
        let back: CandidateModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label(), ADABOOST);
    }
}
