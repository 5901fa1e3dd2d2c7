//! Model training module
//!
//! Provides the census classifier and its evaluation tooling:
//! - Decision trees and Random Forests (classification)
//! - Shuffled k-fold cross-validation
//! - Accuracy, precision, recall, F1 and ROC-AUC metrics
//! - `train_model`, which logs cross-validated scores and fits the final forest

pub mod cross_validation;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
mod trainer;

pub use cross_validation::{CVResults, CVSplit, CrossValidator};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use metrics::ClassificationMetrics;
pub use random_forest::{MaxFeatures, RandomForest};
pub use trainer::{cross_validate, train_model, train_model_with, Scoring, TrainerConfig};
