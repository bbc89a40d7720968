//! Custom error types for feature processing.
//!
//! This module provides the error hierarchy for the schema, form, dataset and
//! encoding layers using `thiserror`.
//!
//! Errors are serializable as `{ code, message }` so a front end can show
//! them without parsing display strings.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// A single invalid form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Column name of the offending field.
    pub column: String,
    /// Human-readable reason.
    pub reason: String,
}

impl FieldError {
    pub fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.column, self.reason)
    }
}

/// The main error type for feature processing.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Column exists but its dtype does not match the schema.
    #[error("Column '{column}' has dtype {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// Column holds nulls and incomplete rows are not allowed.
    #[error("Column '{column}' contains {count} null values")]
    NullValues { column: String, count: usize },

    /// Dataset has no usable rows.
    #[error("Reference dataset is empty")]
    EmptyDataset,

    /// A category was not seen when the encoder was fitted.
    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// A numeric value is NaN or infinite.
    #[error("Non-finite value {value} in column '{column}'")]
    NonFiniteValue { column: String, value: f64 },

    /// A label is not part of a categorical vocabulary.
    ///
    /// Raised while parsing a label on its own, so it names the vocabulary
    /// and the columns that share it rather than a single column.
    #[error(
        "Invalid value '{value}' for the {vocabulary} vocabulary used by {columns} (expected one of: {expected})"
    )]
    InvalidValue {
        vocabulary: String,
        columns: String,
        value: String,
        expected: String,
    },

    /// One or more form fields are invalid.
    #[error("Invalid form input: {}", format_field_errors(.0))]
    InvalidForm(Vec<FieldError>),

    /// Encoder used before fitting, or fitted on no values.
    #[error("Encoder for column '{0}' is not fitted")]
    NotFitted(String),

    /// A persisted artifact cannot be used with this build.
    #[error("Incompatible artifact: {0}")]
    IncompatibleArtifact(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::NullValues { .. } => "NULL_VALUES",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::NonFiniteValue { .. } => "NON_FINITE_VALUE",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::InvalidForm(_) => "INVALID_FORM",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::IncompatibleArtifact(_) => "INCOMPATIBLE_ARTIFACT",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error was caused by the submitted record rather than by
    /// the reference data or artifacts.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::UnknownCategory { .. }
            | Self::NonFiniteValue { .. }
            | Self::InvalidValue { .. }
            | Self::InvalidForm(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(ProcessingError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            ProcessingError::ColumnNotFound("Age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_input_error() {
        let err = ProcessingError::UnknownCategory {
            column: "Gender".to_string(),
            value: "Other".to_string(),
        };
        assert!(err.is_input_error());
        assert!(err.with_context("encoding record").is_input_error());
        assert!(!ProcessingError::EmptyDataset.is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("MonthlyIncome".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("MonthlyIncome"));
    }

    #[test]
    fn test_invalid_form_lists_every_field() {
        let error = ProcessingError::InvalidForm(vec![
            FieldError::new("Age", "must be between 18 and 60"),
            FieldError::new("JobLevel", "must be between 1 and 5"),
        ]);
        let message = error.to_string();
        assert!(message.contains("Age: must be between 18 and 60"));
        assert!(message.contains("JobLevel"));
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::ColumnNotFound("Age".to_string())
            .with_context("Loading reference dataset");
        assert!(error.to_string().contains("Loading reference dataset"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
