//! Random forest classifier

use super::decision_tree::{Criterion, DecisionTree};
use super::models::{check_training_data, check_width, Classifier};
use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for features sampled per split
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    Sqrt,
    Fixed(usize),
    All,
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    fn as_str(self) -> String {
        match self {
            MaxFeatures::Sqrt => "sqrt".to_string(),
            MaxFeatures::Fixed(n) => n.to_string(),
            MaxFeatures::All => "all".to_string(),
        }
    }
}

/// Bagged ensemble of decision trees with majority voting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub criterion: Criterion,
    pub random_state: u64,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            criterion: Criterion::Gini,
            random_state: 42,
            feature_importances: None,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];
        for imp in self.trees.iter().filter_map(|t| t.feature_importances()) {
            for (acc, v) in total.iter_mut().zip(imp.iter()) {
                *acc += v;
            }
        }
        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            total.iter_mut().for_each(|v| *v /= sum);
        }
        self.feature_importances = Some(Array1::from_vec(total));
    }

    /// Fraction of trees voting for class 1, per row
    fn positive_votes(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.n_features(), x)?;

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut votes = Array1::<f64>::zeros(x.nrows());
        for preds in &per_tree {
            votes += preds;
        }
        Ok(votes / per_tree.len() as f64)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(x, y)?;
        if self.n_estimators == 0 {
            return Err(HeartError::Training("random forest needs at least one tree".to_string()));
        }

        let n_samples = x.nrows();
        self.n_features = x.ncols();
        let max_features = self.max_features.resolve(self.n_features);
        let base_seed = self.random_state;

        // Tree i is seeded with base + i regardless of rayon scheduling
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot = y.select(Axis(0), &sample_indices);

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_criterion(self.criterion)
                    .with_random_state(rng.gen());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.compute_feature_importances();
        Ok(())
    }

    /// Majority vote; an even split goes to class 0
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.positive_votes(x)?.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Vote shares `[P(0), P(1)]`
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let positive = self.positive_votes(x)?;
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, p) in positive.iter().enumerate() {
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = *p;
        }
        Ok(proba)
    }

    fn get_params(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("bootstrap".to_string(), self.bootstrap.to_string()),
            ("criterion".to_string(), self.criterion.as_str().to_string()),
            (
                "max_depth".to_string(),
                self.max_depth.map_or("None".to_string(), |d| d.to_string()),
            ),
            ("max_features".to_string(), self.max_features.as_str()),
            ("min_samples_leaf".to_string(), self.min_samples_leaf.to_string()),
            ("min_samples_split".to_string(), self.min_samples_split.to_string()),
            ("n_estimators".to_string(), self.n_estimators.to_string()),
            ("random_state".to_string(), self.random_state.to_string()),
        ])
    }

    fn n_features(&self) -> Option<usize> {
        (!self.trees.is_empty()).then_some(self.n_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [0.3, 0.1],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
            [0.9, 1.3],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifier() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();
        assert_eq!(rf.n_trees(), 10);

        let predictions = rf.predict(&x).unwrap();
        let accuracy = predictions.iter().zip(y.iter()).filter(|(p, a)| p == a).count() as f64
            / y.len() as f64;
        assert!(accuracy >= 0.8, "Accuracy too low: {}", accuracy);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = blobs();
        let mut a = RandomForest::new(15).with_random_state(3);
        let mut b = RandomForest::new(15).with_random_state(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_predict_proba() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(10);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (8, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let (x, y) = blobs();
        let mut rf = RandomForest::new(5);
        rf.fit(&x, &y).unwrap();
        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!((importances.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(13), 3);
        assert_eq!(MaxFeatures::Fixed(20).resolve(13), 13);
        assert_eq!(MaxFeatures::All.resolve(13), 13);
    }

    #[test]
    fn test_unfitted() {
        let rf = RandomForest::new(3);
        assert!(matches!(rf.predict(&array![[1.0, 2.0]]), Err(HeartError::ModelNotFitted)));
    }
}
