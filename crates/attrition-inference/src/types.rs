//! Prediction result types.

use crate::config::EncodingMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicted attrition outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attrition {
    /// The employee is predicted to stay (class 0).
    No,
    /// The employee is predicted to leave (class 1).
    Yes,
}

impl Attrition {
    /// Outcome for a binary class index.
    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Attrition::No),
            1 => Some(Attrition::Yes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Attrition::No => "No",
            Attrition::Yes => "Yes",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Attrition::Yes)
    }
}

impl fmt::Display for Attrition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one employee record.
///
/// Displays as `Attrition: Yes` or `Attrition: No`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub attrition: Attrition,

    /// Probability of attrition ("Yes").
    pub probability: f64,

    /// Ensemble output before the sigmoid (log-odds of "Yes").
    pub raw_score: f64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attrition: {}", self.attrition)
    }
}

/// Metadata about the loaded model and encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ModelInfo {
    /// Model family, e.g. `"gradient_boosting_classifier"`.
    pub model_type: String,

    /// Feature names in the order expected by the model.
    pub feature_names: Vec<String>,

    /// Class labels, class 0 first.
    pub class_labels: Vec<String>,

    pub n_trees: usize,
    pub learning_rate: f64,
    pub encoding_mode: EncodingMode,
    pub decision_threshold: f64,

    /// When the pipeline was fitted (fitted mode only), RFC 3339.
    pub pipeline_fitted_at: Option<String>,

    /// Rows the encoders were fitted on (fitted mode) or refit over (refit mode).
    pub reference_rows: usize,
}
