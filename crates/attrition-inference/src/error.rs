//! Error types for the attrition-inference crate.
//!
//! [`InferenceError`] is the error type of every public function in this
//! crate. Errors from feature processing are wrapped unchanged, so their
//! codes stay available through [`InferenceError::error_code`].

use attrition_processing::ProcessingError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for model loading and prediction.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InferenceError {
    /// The model file does not exist.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The model file parsed but describes an unusable model.
    ///
    /// Common causes:
    /// - Unsupported `format_version` or `model_type`
    /// - A split refers to a feature index past the feature list
    /// - A child index does not point forward in the node list
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// The model and the feature encoder disagree on the feature layout.
    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),

    /// A feature vector cannot be scored.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration provided to the predictor.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Schema, dataset or encoding error.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::InvalidModel(_) => "INVALID_MODEL",
            Self::FeatureMismatch(_) => "FEATURE_MISMATCH",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Processing(err) => err.error_code(),
            Self::Json(_) => "JSON_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error was caused by the submitted record.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::InvalidInput(_) => true,
            Self::Processing(err) => err.is_input_error(),
            _ => false,
        }
    }
}

impl Serialize for InferenceError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InferenceError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_codes_pass_through() {
        let err: InferenceError = ProcessingError::UnknownCategory {
            column: "JobRole".to_string(),
            value: "Astronaut".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "UNKNOWN_CATEGORY");
        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "Unknown category 'Astronaut' for column 'JobRole'");
    }

    #[test]
    fn test_error_serialization() {
        let err = InferenceError::ModelNotFound {
            path: "model.json".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MODEL_NOT_FOUND");
        assert_eq!(json["message"], "Model not found: model.json");
        assert!(!err.is_input_error());
    }
}
