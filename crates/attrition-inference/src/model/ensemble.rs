//! Binary gradient-boosted tree classifier.

use super::tree::Tree;
use crate::error::{InferenceError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Version of the model export format.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// The only supported `model_type`.
pub const GRADIENT_BOOSTING_CLASSIFIER: &str = "gradient_boosting_classifier";

/// A gradient-boosted ensemble of regression trees for two classes.
///
/// The raw score is `init_score + learning_rate * Σ tree(x)`, the log-odds
/// of class 1. Loaded from a JSON export:
///
/// ```json
/// {
///   "format_version": 1,
///   "model_type": "gradient_boosting_classifier",
///   "feature_names": ["Age", "BusinessTravel", "..."],
///   "classes": ["No", "Yes"],
///   "learning_rate": 0.1,
///   "init_score": -1.65,
///   "trees": [ { "nodes": [
///       { "type": "split", "feature": 15, "threshold": 0.21, "left": 1, "right": 2 },
///       { "type": "leaf", "value": 0.8 },
///       { "type": "leaf", "value": -0.3 } ] } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingModel {
    format_version: u32,
    model_type: String,
    feature_names: Vec<String>,
    classes: Vec<String>,
    learning_rate: f64,
    init_score: f64,
    trees: Vec<Tree>,
}

static_assertions::assert_impl_all!(GradientBoostingModel: Send, Sync);

impl GradientBoostingModel {
    /// Load and validate a model export.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InferenceError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let json = fs::read_to_string(path)?;
        let model = Self::from_json(&json)?;
        info!(
            "Loaded {} from {} ({} trees, {} features)",
            model.model_type,
            path.display(),
            model.trees.len(),
            model.feature_names.len()
        );
        Ok(model)
    }

    /// Parse and validate a model export from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::InvalidModel(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(InferenceError::InvalidModel(format!(
                "format version {} is not supported (expected {})",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.model_type != GRADIENT_BOOSTING_CLASSIFIER {
            return Err(InferenceError::InvalidModel(format!(
                "model type '{}' is not supported",
                self.model_type
            )));
        }
        if self.feature_names.is_empty() {
            return Err(InferenceError::InvalidModel(
                "model has no features".to_string(),
            ));
        }
        if self.classes.len() != 2 {
            return Err(InferenceError::InvalidModel(format!(
                "expected 2 classes, found {}",
                self.classes.len()
            )));
        }
        if !self.learning_rate.is_finite() || !self.init_score.is_finite() {
            return Err(InferenceError::InvalidModel(
                "learning_rate and init_score must be finite".to_string(),
            ));
        }

        for (idx, tree) in self.trees.iter().enumerate() {
            if let Some(feature) = tree
                .max_feature()
                .filter(|&feature| feature >= self.feature_names.len())
            {
                return Err(InferenceError::InvalidModel(format!(
                    "tree {} splits on feature {} but the model has {} features",
                    idx,
                    feature,
                    self.feature_names.len()
                )));
            }
        }

        if self.trees.is_empty() {
            warn!("Model has no trees; every score equals init_score");
        }
        debug!(
            "Model validated: max tree depth {}",
            self.trees.iter().map(Tree::depth).max().unwrap_or(0)
        );
        Ok(())
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Feature names in input order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Class labels, class 0 first.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn init_score(&self) -> f64 {
        self.init_score
    }

    fn check_input(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.feature_names.len() {
            return Err(InferenceError::InvalidInput(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }
        if let Some(idx) = features.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidInput(format!(
                "feature '{}' is not finite ({})",
                self.feature_names[idx], features[idx]
            )));
        }
        Ok(())
    }

    /// Raw ensemble output (log-odds of class 1).
    pub fn decision_function(&self, features: &[f64]) -> Result<f64> {
        self.check_input(features)?;
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        Ok(self.init_score + self.learning_rate * sum)
    }

    /// Probability of class 1.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        self.decision_function(features).map(sigmoid)
    }

    /// Class index: 1 iff the class-1 probability exceeds `threshold`.
    pub fn predict(&self, features: &[f64], threshold: f64) -> Result<usize> {
        let probability = self.predict_proba(features)?;
        Ok(class_index(probability, threshold))
    }
}

/// Class index for a class-1 probability; a tie with `threshold` is class 0.
pub fn class_index(probability: f64, threshold: f64) -> usize {
    usize::from(probability > threshold)
}

/// Logistic function, evaluated without overflow for large `|x|`.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_json() -> serde_json::Value {
        json!({
            "format_version": 1,
            "model_type": "gradient_boosting_classifier",
            "feature_names": ["Age", "OverTime"],
            "classes": ["No", "Yes"],
            "learning_rate": 0.5,
            "init_score": -1.0,
            "trees": [
                { "nodes": [
                    { "type": "split", "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                    { "type": "leaf", "value": -1.0 },
                    { "type": "leaf", "value": 3.0 }
                ] },
                { "nodes": [
                    { "type": "split", "feature": 0, "threshold": 0.25, "left": 1, "right": 2 },
                    { "type": "leaf", "value": 1.0 },
                    { "type": "leaf", "value": 0.0 }
                ] }
            ]
        })
    }

    fn model() -> GradientBoostingModel {
        GradientBoostingModel::from_json(&model_json().to_string()).unwrap()
    }

    #[test]
    fn test_decision_function_sums_trees() {
        let model = model();
        // -1 + 0.5 * (3 + 0)
        assert_eq!(model.decision_function(&[0.9, 1.0]).unwrap(), 0.5);
        // -1 + 0.5 * (-1 + 1)
        assert_eq!(model.decision_function(&[0.1, 0.0]).unwrap(), -1.0);
    }

    #[test]
    fn test_predict_uses_threshold() {
        let model = model();
        assert_eq!(model.predict(&[0.9, 1.0], 0.5).unwrap(), 1);
        assert_eq!(model.predict(&[0.1, 0.0], 0.5).unwrap(), 0);
        // p = sigmoid(0.5) ≈ 0.62
        assert_eq!(model.predict(&[0.9, 1.0], 0.7).unwrap(), 0);
    }

    #[test]
    fn test_tie_goes_to_class_zero() {
        let mut value = model_json();
        value["trees"] = json!([]);
        value["init_score"] = json!(0.0);
        let model = GradientBoostingModel::from_json(&value.to_string()).unwrap();

        assert_eq!(model.predict_proba(&[0.0, 0.0]).unwrap(), 0.5);
        assert_eq!(model.predict(&[0.0, 0.0], 0.5).unwrap(), 0);
    }

    #[test]
    fn test_class_index_boundary() {
        assert_eq!(class_index(0.5, 0.5), 0);
        assert_eq!(class_index(0.500001, 0.5), 1);
        assert_eq!(class_index(0.3, 0.25), 1);
    }

    #[test]
    fn test_wrong_length_and_non_finite_rejected() {
        let model = model();
        let err = model.decision_function(&[0.1]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = model.decision_function(&[f64::NAN, 0.0]).unwrap_err();
        assert!(err.to_string().contains("Age"));
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            ("format_version", json!(2)),
            ("model_type", json!("random_forest")),
            ("feature_names", json!([])),
            ("classes", json!(["No", "Maybe", "Yes"])),
        ];
        for (field, bad) in cases {
            let mut value = model_json();
            value[field] = bad;
            let err = GradientBoostingModel::from_json(&value.to_string()).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_MODEL", "{}", field);
        }
    }

    #[test]
    fn test_split_on_unknown_feature_rejected() {
        let mut value = model_json();
        value["trees"][0]["nodes"][0]["feature"] = json!(7);
        let err = GradientBoostingModel::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("splits on feature 7"));
    }

    #[test]
    fn test_cyclic_tree_rejected() {
        let mut value = model_json();
        value["trees"][1]["nodes"][0]["left"] = json!(0);
        assert!(GradientBoostingModel::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = GradientBoostingModel::load("no/such/model.json").unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound { .. }));
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }
}
