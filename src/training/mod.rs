//! Model training
//!
//! Three candidate families are trained on the same split and ranked by
//! ROC-AUC on the held-out rows:
//! - L2 logistic regression (gradient descent)
//! - Random forest over CART trees
//! - AdaBoost (SAMME) over decision stumps

mod candidates;
mod config;
mod evaluator;
mod models;
mod pipeline;
mod selector;
pub mod adaboost;
pub mod decision_tree;
pub mod linear_models;
pub mod random_forest;

pub use adaboost::AdaBoostClassifier;
pub use candidates::{CandidateModel, ADABOOST, LOGISTIC_REGRESSION, RANDOM_FOREST};
pub use config::PipelineConfig;
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use evaluator::{Evaluation, TrainingEvaluator};
pub use linear_models::LogisticRegression;
pub use models::{roc_auc, Classifier, ModelMetrics};
pub use pipeline::{CandidateSummary, TrainingPipeline, TrainingReport};
pub use random_forest::{MaxFeatures, RandomForest};
pub use selector::ModelSelector;
