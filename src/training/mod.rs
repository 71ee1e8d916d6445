//! Model training module
//!
//! Provides the model capability trait, the ordered model registry, the
//! seeded train/test split and the built-in classifiers:
//! - K-Nearest Neighbors
//! - Decision trees and Random Forests
//! - AdaBoost
//! - Gaussian Naive Bayes
//! - Support Vector Machines
//! - Multi-layer perceptrons
//! - Majority-class baseline

mod config;
mod models;
mod registry;
pub mod adaboost;
pub mod baseline;
pub mod decision_tree;
pub mod knn;
pub mod naive_bayes;
pub mod neural_network;
pub mod random_forest;
pub mod split;
pub mod svm;

pub use adaboost::AdaBoostClassifier;
pub use baseline::MajorityClass;
pub use config::{ModelSpec, ModelType};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use knn::{DistanceMetric, KNNClassifier, KNNConfig, WeightScheme};
pub use models::Model;
pub use naive_bayes::GaussianNaiveBayes;
pub use neural_network::{Activation, MLPClassifier, MLPConfig};
pub use random_forest::{MaxFeatures, RandomForest};
pub use registry::ModelRegistry;
pub use split::{train_test_split, Split};
pub use svm::{KernelType, SVMClassifier, SVMConfig};
