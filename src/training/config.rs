//! Model selection configuration

use super::adaboost::AdaBoostClassifier;
use super::baseline::MajorityClass;
use super::decision_tree::DecisionTree;
use super::knn::KNNClassifier;
use super::models::Model;
use super::naive_bayes::GaussianNaiveBayes;
use super::neural_network::{MLPClassifier, MLPConfig};
use super::random_forest::RandomForest;
use super::svm::{KernelType, SVMClassifier, SVMConfig};
use serde::{Deserialize, Serialize};

fn default_neighbors() -> usize {
    5
}

fn default_trees() -> usize {
    100
}

fn default_rounds() -> usize {
    50
}

fn default_learning_rate() -> f64 {
    1.0
}

fn default_var_smoothing() -> f64 {
    1e-9
}

fn default_c() -> f64 {
    1.0
}

fn default_hidden_layers() -> Vec<usize> {
    vec![100]
}

fn default_mlp_learning_rate() -> f64 {
    0.001
}

fn default_epochs() -> usize {
    1000
}

fn default_random_state() -> u64 {
    42
}

/// Built-in classifier variants and their parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelType {
    Knn {
        #[serde(default = "default_neighbors")]
        n_neighbors: usize,
    },
    DecisionTree {
        #[serde(default)]
        max_depth: Option<usize>,
    },
    RandomForest {
        #[serde(default = "default_trees")]
        n_estimators: usize,
        #[serde(default)]
        max_depth: Option<usize>,
    },
    AdaBoost {
        #[serde(default = "default_rounds")]
        n_estimators: usize,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
    },
    NaiveBayes {
        #[serde(default = "default_var_smoothing")]
        var_smoothing: f64,
    },
    Svm {
        #[serde(default = "default_c")]
        c: f64,
        #[serde(default)]
        kernel: KernelType,
    },
    Mlp {
        #[serde(default = "default_hidden_layers")]
        hidden_layers: Vec<usize>,
        #[serde(default = "default_mlp_learning_rate")]
        learning_rate: f64,
        #[serde(default = "default_epochs")]
        max_epochs: usize,
    },
    Majority,
}

impl ModelType {
    pub fn knn() -> Self {
        Self::Knn {
            n_neighbors: default_neighbors(),
        }
    }

    pub fn decision_tree() -> Self {
        Self::DecisionTree { max_depth: None }
    }

    pub fn random_forest() -> Self {
        Self::RandomForest {
            n_estimators: default_trees(),
            max_depth: None,
        }
    }

    pub fn ada_boost() -> Self {
        Self::AdaBoost {
            n_estimators: default_rounds(),
            learning_rate: default_learning_rate(),
        }
    }

    pub fn naive_bayes() -> Self {
        Self::NaiveBayes {
            var_smoothing: default_var_smoothing(),
        }
    }

    pub fn svm() -> Self {
        Self::Svm {
            c: default_c(),
            kernel: KernelType::default(),
        }
    }

    pub fn mlp() -> Self {
        Self::Mlp {
            hidden_layers: default_hidden_layers(),
            learning_rate: default_mlp_learning_rate(),
            max_epochs: default_epochs(),
        }
    }

    /// Name used in reports when a spec does not give one
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Knn { .. } => "KNN",
            Self::DecisionTree { .. } => "Decision Tree",
            Self::RandomForest { .. } => "Random Forest",
            Self::AdaBoost { .. } => "AdaBoost",
            Self::NaiveBayes { .. } => "Naive Bayes",
            Self::Svm { .. } => "SVM",
            Self::Mlp { .. } => "MLP",
            Self::Majority => "Majority",
        }
    }

    /// Build an untrained model
    pub fn build(&self, random_state: u64) -> Box<dyn Model> {
        match self {
            Self::Knn { n_neighbors } => Box::new(KNNClassifier::with_k(*n_neighbors)),
            Self::DecisionTree { max_depth } => {
                let mut tree = DecisionTree::new().with_random_state(random_state);
                if let Some(d) = *max_depth {
                    tree = tree.with_max_depth(d);
                }
                Box::new(tree)
            }
            Self::RandomForest {
                n_estimators,
                max_depth,
            } => {
                let mut forest = RandomForest::new(*n_estimators).with_random_state(random_state);
                if let Some(d) = *max_depth {
                    forest = forest.with_max_depth(d);
                }
                Box::new(forest)
            }
            Self::AdaBoost {
                n_estimators,
                learning_rate,
            } => Box::new(AdaBoostClassifier::new(*n_estimators, *learning_rate)),
            Self::NaiveBayes { var_smoothing } => {
                Box::new(GaussianNaiveBayes::new().with_var_smoothing(*var_smoothing))
            }
            Self::Svm { c, kernel } => Box::new(SVMClassifier::new(SVMConfig {
                c: *c,
                kernel: *kernel,
                random_state,
                ..SVMConfig::default()
            })),
            Self::Mlp {
                hidden_layers,
                learning_rate,
                max_epochs,
            } => Box::new(MLPClassifier::new(MLPConfig {
                hidden_layers: hidden_layers.clone(),
                learning_rate: *learning_rate,
                max_epochs: *max_epochs,
                random_state,
                ..MLPConfig::default()
            })),
            Self::Majority => Box::new(MajorityClass::new()),
        }
    }
}

/// One registry entry as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Report name; defaults to the variant's display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub model: ModelType,
    /// Seed for models with randomized fitting
    #[serde(default = "default_random_state")]
    pub random_state: u64,
}

impl ModelSpec {
    pub fn new(model: ModelType) -> Self {
        Self {
            name: None,
            model,
            random_state: default_random_state(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Name shown in the report
    pub fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.model.display_name().to_string())
    }

    pub fn build(&self) -> Box<dyn Model> {
        self.model.build(self.random_state)
    }
}
