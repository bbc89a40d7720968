//! Predictor configuration.

use crate::error::InferenceError;
use attrition_processing::ProcessingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default probability above which a record is predicted to leave.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// How records are encoded before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// Apply encoders fitted once and loaded from a pipeline file.
    #[default]
    Fitted,

    /// Refit encoders over the reference dataset plus the record on every
    /// prediction and encode the record as the last row.
    ///
    /// Codes and scales then depend on the submitted record itself; use only
    /// to reproduce scores of models trained that way.
    RefitPerRequest,
}

impl EncodingMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingMode::Fitted => "fitted",
            EncodingMode::RefitPerRequest => "refit_per_request",
        }
    }
}

/// Configuration for building a [`Predictor`](crate::Predictor).
///
/// # Validation
///
/// The builder validates the following on [`build()`](PredictorConfigBuilder::build):
/// - a model path is set
/// - [`Fitted`](EncodingMode::Fitted) mode has a pipeline path
/// - [`RefitPerRequest`](EncodingMode::RefitPerRequest) mode has a reference path
/// - `decision_threshold` lies strictly between 0 and 1
///
/// # Example
///
/// ```
/// use attrition_inference::{EncodingMode, PredictorConfig};
///
/// let config = PredictorConfig::builder()
///     .model_path("model.json")
///     .reference_path("employee_data_cleaned.csv")
///     .encoding_mode(EncodingMode::RefitPerRequest)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.decision_threshold, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Tree ensemble JSON export.
    pub model_path: PathBuf,

    /// Fitted feature pipeline (fitted mode).
    pub pipeline_path: Option<PathBuf>,

    /// Reference CSV (refit mode).
    pub reference_path: Option<PathBuf>,

    pub encoding_mode: EncodingMode,

    /// Probability of "Yes" above which attrition is predicted (default: 0.5).
    ///
    /// A probability exactly at the threshold predicts "No".
    pub decision_threshold: f64,

    /// Reference loading options for refit mode.
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl PredictorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PredictorConfigBuilder {
        PredictorConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(InferenceError::InvalidConfig(
                "model_path must be set".to_string(),
            ));
        }

        match self.encoding_mode {
            EncodingMode::Fitted if self.pipeline_path.is_none() => {
                return Err(InferenceError::InvalidConfig(
                    "fitted encoding requires pipeline_path".to_string(),
                ));
            }
            EncodingMode::RefitPerRequest if self.reference_path.is_none() => {
                return Err(InferenceError::InvalidConfig(
                    "refit_per_request encoding requires reference_path".to_string(),
                ));
            }
            _ => {}
        }

        if !(self.decision_threshold > 0.0 && self.decision_threshold < 1.0) {
            return Err(InferenceError::InvalidConfig(format!(
                "decision_threshold must be in (0, 1), got {}",
                self.decision_threshold
            )));
        }

        self.processing
            .validate()
            .map_err(|e| InferenceError::InvalidConfig(e.to_string()))
    }
}

/// Builder for [`PredictorConfig`].
#[derive(Debug, Default)]
pub struct PredictorConfigBuilder {
    model_path: Option<PathBuf>,
    pipeline_path: Option<PathBuf>,
    reference_path: Option<PathBuf>,
    encoding_mode: Option<EncodingMode>,
    decision_threshold: Option<f64>,
    processing: Option<ProcessingConfig>,
}

impl PredictorConfigBuilder {
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn pipeline_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipeline_path = Some(path.into());
        self
    }

    pub fn reference_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_path = Some(path.into());
        self
    }

    pub fn encoding_mode(mut self, mode: EncodingMode) -> Self {
        self.encoding_mode = Some(mode);
        self
    }

    /// Set the probability threshold for predicting attrition.
    pub fn decision_threshold(mut self, threshold: f64) -> Self {
        self.decision_threshold = Some(threshold);
        self
    }

    /// Set the reference loading options used in refit mode.
    pub fn processing(mut self, config: ProcessingConfig) -> Self {
        self.processing = Some(config);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PredictorConfig, InferenceError> {
        let config = PredictorConfig {
            model_path: self.model_path.unwrap_or_default(),
            pipeline_path: self.pipeline_path,
            reference_path: self.reference_path,
            encoding_mode: self.encoding_mode.unwrap_or_default(),
            decision_threshold: self
                .decision_threshold
                .unwrap_or(DEFAULT_DECISION_THRESHOLD),
            processing: self.processing.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitted_mode_is_default() {
        let config = PredictorConfig::builder()
            .model_path("model.json")
            .pipeline_path("pipeline.json")
            .build()
            .unwrap();
        assert_eq!(config.encoding_mode, EncodingMode::Fitted);
        assert_eq!(config.decision_threshold, DEFAULT_DECISION_THRESHOLD);
    }

    #[test]
    fn test_missing_model_path() {
        let err = PredictorConfig::builder()
            .pipeline_path("pipeline.json")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("model_path"));
    }

    #[test]
    fn test_mode_requires_matching_artifact() {
        let err = PredictorConfig::builder()
            .model_path("model.json")
            .reference_path("reference.csv")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("pipeline_path"));

        let err = PredictorConfig::builder()
            .model_path("model.json")
            .pipeline_path("pipeline.json")
            .encoding_mode(EncodingMode::RefitPerRequest)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("reference_path"));
    }

    #[test]
    fn test_threshold_bounds() {
        for threshold in [0.0, 1.0, -0.2, f64::NAN] {
            let result = PredictorConfig::builder()
                .model_path("model.json")
                .pipeline_path("pipeline.json")
                .decision_threshold(threshold)
                .build();
            assert!(result.is_err(), "threshold {} accepted", threshold);
        }
    }

    #[test]
    fn test_encoding_mode_serde() {
        let mode: EncodingMode = serde_json::from_str("\"refit_per_request\"").unwrap();
        assert_eq!(mode, EncodingMode::RefitPerRequest);
        assert_eq!(mode.as_str(), "refit_per_request");
    }
}
