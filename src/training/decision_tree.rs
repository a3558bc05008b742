//! CART classification tree used as the random forest base learner

use super::models::{check_training_data, check_width};
use crate::error::{HeartError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Majority class
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    Gini,
    Entropy,
}

impl Criterion {
    /// Impurity of a node holding `neg` and `pos` samples
    fn impurity(self, neg: f64, pos: f64) -> f64 {
        let n = neg + pos;
        if n == 0.0 {
            return 0.0;
        }
        let (p0, p1) = (neg / n, pos / n);
        match self {
            Criterion::Gini => 1.0 - p0 * p0 - p1 * p1,
            Criterion::Entropy => [p0, p1]
                .iter()
                .filter(|&&p| p > 0.0)
                .map(|&p| -p * p.log2())
                .sum(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::Gini => "gini",
            Criterion::Entropy => "entropy",
        }
    }
}

/// Binary classification tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled at each split (`None` = all)
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    /// Seed for per-split feature sampling
    pub random_state: u64,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Best split found for one feature
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: 0,
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree on labels in {0, 1}
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_training_data(x, y)?;
        if x.nrows() < self.min_samples_split {
            return Err(HeartError::Training(format!(
                "need at least {} samples, got {}",
                self.min_samples_split,
                x.nrows()
            )));
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = self.build_tree(x, y, &indices, 0, &mut importances, &mut rng);
        self.root = Some(root);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|imp| *imp /= total);
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let pos = indices.iter().filter(|&&i| y[i] > 0.5).count();
        let neg = n_samples - pos;
        let leaf = TreeNode::Leaf {
            // ties go to class 0
            value: if pos > neg { 1.0 } else { 0.0 },
            n_samples,
        };

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || pos == 0
            || neg == 0;
        if should_stop {
            return leaf;
        }

        let parent_impurity = self.criterion.impurity(neg as f64, pos as f64);
        let features = self.sample_features(rng);

        let Some(best) = self.find_best_split(x, y, indices, &features, parent_impurity) else {
            return leaf;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature]] <= best.threshold);

        importances[best.feature] += n_samples as f64 * best.gain;

        let left = Box::new(self.build_tree(x, y, &left_idx, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_idx, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: best.feature,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        }
    }

    /// Features considered at one split, in ascending order
    fn sample_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let k = self.max_features.unwrap_or(self.n_features).clamp(1, self.n_features);
        if k == self.n_features {
            return (0..self.n_features).collect();
        }
        let mut chosen = sample(rng, self.n_features, k).into_vec();
        chosen.sort_unstable();
        chosen
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
        parent_impurity: f64,
    ) -> Option<Candidate> {
        let n = indices.len() as f64;
        let total_pos = indices.iter().filter(|&&i| y[i] > 0.5).count() as f64;
        let total_neg = n - total_pos;
        let min_leaf = self.min_samples_leaf;

        // Each feature sweeps its sorted values once, carrying left-side class counts.
        let results: Vec<Option<Candidate>> = features
            .par_iter()
            .map(|&feature| {
                let mut sorted: Vec<(f64, bool)> =
                    indices.iter().map(|&i| (x[[i, feature]], y[i] > 0.5)).collect();
                sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut best: Option<Candidate> = None;
                let (mut left_neg, mut left_pos) = (0.0, 0.0);

                for k in 0..sorted.len() - 1 {
                    if sorted[k].1 {
                        left_pos += 1.0;
                    } else {
                        left_neg += 1.0;
                    }
                    if sorted[k].0 == sorted[k + 1].0 {
                        continue;
                    }
                    let left_n = k + 1;
                    let right_n = sorted.len() - left_n;
                    if left_n < min_leaf || right_n < min_leaf {
                        continue;
                    }

                    let right_neg = total_neg - left_neg;
                    let right_pos = total_pos - left_pos;
                    let weighted = (left_n as f64 * self.criterion.impurity(left_neg, left_pos)
                        + right_n as f64 * self.criterion.impurity(right_neg, right_pos))
                        / n;
                    let gain = parent_impurity - weighted;

                    if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                        best = Some(Candidate {
                            feature,
                            threshold: (sorted[k].0 + sorted[k + 1].0) / 2.0,
                            gain,
                        });
                    }
                }
                best
            })
            .collect();

        // first feature wins among equal gains
        results.into_iter().flatten().fold(None, |acc: Option<Candidate>, c| match acc {
            Some(a) if a.gain >= c.gain => Some(a),
            _ => Some(c),
        })
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.root.as_ref().map(|_| self.n_features), x)?;
        let root = self.root.as_ref().ok_or(HeartError::ModelNotFitted)?;
        Ok(x.rows().into_iter().map(|row| Self::predict_sample(root, row)).collect())
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, Self::node_depth)
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + Self::node_depth(left).max(Self::node_depth(right)),
        }
    }

    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Self::count_leaves)
    }

    fn count_leaves(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => Self::count_leaves(left) + Self::count_leaves(right),
        }
    }
}
