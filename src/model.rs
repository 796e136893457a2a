//! Activity predictors
//!
//! The pipeline only needs `predict(features) -> class id`. The shipped model
//! artifact is a decision forest serialized as JSON; anything else can be
//! plugged in through [`ActivityPredictor`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SuggestError;
use crate::types::{FeatureVector, FEATURE_NAMES};

/// Format tag every forest artifact must carry
pub const FOREST_FORMAT: &str = "therapease.forest.v1";

/// Opaque pre-trained classifier
pub trait ActivityPredictor: Send + Sync {
    /// Predict a class id for one feature row
    fn predict(&self, features: &FeatureVector) -> Result<i64, SuggestError>;
}

impl<F> ActivityPredictor for F
where
    F: Fn(&FeatureVector) -> Result<i64, SuggestError> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<i64, SuggestError> {
        self(features)
    }
}

/// Node of a single decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `row[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class vote weights, aligned with [`ForestModel::classes`]
    Leaf { value: Vec<f64> },
}

/// Flat node array; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn leaf_for(&self, row: &[f64; 5]) -> Result<&[f64], SuggestError> {
        let mut index = 0;

        // A valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(index).ok_or_else(|| {
                SuggestError::PredictorInvocation(format!("node index {index} out of range"))
            })?;

            match node {
                TreeNode::Leaf { value } => return Ok(value.as_slice()),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).ok_or_else(|| {
                        SuggestError::PredictorInvocation(format!(
                            "feature index {feature} out of range"
                        ))
                    })?;
                    index = if *x <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }

        Err(SuggestError::PredictorInvocation(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }
}

/// Averaged-probability decision forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub format: String,
    pub feature_names: Vec<String>,
    /// Class ids the forest votes over
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Load and validate a forest artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SuggestError> {
        let path = path.as_ref();
        log::debug!("Loading model from {}", path.display());

        let json = fs::read_to_string(path).map_err(|e| {
            SuggestError::ModelLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        let model = Self::from_json(&json)?;

        log::debug!(
            "Loaded forest with {} trees over {} classes",
            model.trees.len(),
            model.classes.len()
        );
        Ok(model)
    }

    /// Parse and validate a forest artifact
    pub fn from_json(json: &str) -> Result<Self, SuggestError> {
        let model: ForestModel =
            serde_json::from_str(json).map_err(|e| SuggestError::ModelLoad(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Check the artifact against the pipeline's feature layout
    pub fn validate(&self) -> Result<(), SuggestError> {
        if self.format != FOREST_FORMAT {
            return Err(SuggestError::ModelLoad(format!(
                "unsupported format {:?}, expected {FOREST_FORMAT:?}",
                self.format
            )));
        }

        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(SuggestError::ModelLoad(format!(
                "feature names {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }

        if self.classes.is_empty() {
            return Err(SuggestError::ModelLoad("model has no classes".to_string()));
        }

        if self.trees.is_empty() {
            return Err(SuggestError::ModelLoad("model has no trees".to_string()));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(SuggestError::ModelLoad(format!("tree {t} has no nodes")));
            }

            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= FEATURE_NAMES.len() {
                            return Err(SuggestError::ModelLoad(format!(
                                "tree {t} node {n}: feature index {feature} out of range"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(SuggestError::ModelLoad(format!(
                                "tree {t} node {n}: threshold is not finite"
                            )));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(SuggestError::ModelLoad(format!(
                                "tree {t} node {n}: child index out of range"
                            )));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.classes.len() {
                            return Err(SuggestError::ModelLoad(format!(
                                "tree {t} node {n}: {} votes for {} classes",
                                value.len(),
                                self.classes.len()
                            )));
                        }
                        if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                            return Err(SuggestError::ModelLoad(format!(
                                "tree {t} node {n}: votes must be finite and non-negative"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Averaged class probabilities for one row
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, SuggestError> {
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(SuggestError::PredictorInvocation(
                "model has no classes or trees".to_string(),
            ));
        }

        let row = features.as_row();
        let mut proba = vec![0.0; self.classes.len()];

        for tree in &self.trees {
            let votes = tree.leaf_for(&row)?;
            let total: f64 = votes.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (p, v) in proba.iter_mut().zip(votes) {
                *p += v / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }

        Ok(proba)
    }
}

impl ActivityPredictor for ForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<i64, SuggestError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins ties
        let mut best = 0;
        for (i, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = i;
            }
        }

        let class = self.classes[best];
        log::debug!("Forest predicted class {class} (p={:.3})", proba[best]);
        Ok(class)
    }
}
