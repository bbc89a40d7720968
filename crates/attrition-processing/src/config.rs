//! Configuration for reference-dataset loading and encoder fitting.
//!
//! Built through [`ProcessingConfig::builder()`], which validates on `build()`.

use crate::schema::{ID_COLUMN, TARGET_COLUMN, feature_spec};
use serde::{Deserialize, Serialize};

/// Configuration for loading the reference dataset and fitting encoders.
///
/// # Example
///
/// ```rust
/// use attrition_processing::ProcessingConfig;
///
/// let config = ProcessingConfig::builder()
///     .drop_incomplete_rows(false)
///     .clip_scaled(true)
///     .build()
///     .unwrap();
/// assert!(config.clip_scaled);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Identifier column removed before fitting.
    /// Default: "EmployeeId"
    pub id_column: String,

    /// Target column removed before fitting.
    /// Default: "Attrition"
    pub target_column: String,

    /// Drop reference rows with nulls in feature columns instead of failing.
    /// Default: true
    pub drop_incomplete_rows: bool,

    /// Rows scanned to infer CSV column types; `None` scans the whole file.
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// CSV field separator.
    /// Default: b','
    pub separator: u8,

    /// Clamp scaled values of out-of-range inputs into [0, 1].
    /// Default: false
    pub clip_scaled: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            id_column: ID_COLUMN.to_string(),
            target_column: TARGET_COLUMN.to_string(),
            drop_incomplete_rows: true,
            infer_schema_length: None,
            separator: b',',
            clip_scaled: false,
        }
    }
}

impl ProcessingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("id_column", &self.id_column),
            ("target_column", &self.target_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
            if feature_spec(value).is_some() {
                return Err(ConfigValidationError::FeatureColumn {
                    field: field.to_string(),
                    column: value.clone(),
                });
            }
        }

        if self.id_column == self.target_column {
            return Err(ConfigValidationError::DuplicateColumn(
                self.id_column.clone(),
            ));
        }

        if self.infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidSchemaLength);
        }

        if !self.separator.is_ascii() || self.separator == b'"' || self.separator == b'\n' {
            return Err(ConfigValidationError::InvalidSeparator(self.separator));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("'{field}' names feature column '{column}', which would be dropped")]
    FeatureColumn { field: String, column: String },

    #[error("Identifier and target column are both '{0}'")]
    DuplicateColumn(String),

    #[error("infer_schema_length must be at least 1 (use None to scan the whole file)")]
    InvalidSchemaLength,

    #[error("Invalid CSV separator byte: {0:#04x}")]
    InvalidSeparator(u8),
}

/// Builder for [`ProcessingConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProcessingConfigBuilder {
    id_column: Option<String>,
    target_column: Option<String>,
    drop_incomplete_rows: Option<bool>,
    infer_schema_length: Option<Option<usize>>,
    separator: Option<u8>,
    clip_scaled: Option<bool>,
}

impl ProcessingConfigBuilder {
    /// Set the identifier column dropped from the reference dataset.
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    /// Set the target column dropped from the reference dataset.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Drop incomplete reference rows (true) or fail on them (false).
    pub fn drop_incomplete_rows(mut self, drop: bool) -> Self {
        self.drop_incomplete_rows = Some(drop);
        self
    }

    /// Limit CSV type inference to the first `rows` rows.
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Clamp scaled values into [0, 1].
    pub fn clip_scaled(mut self, clip: bool) -> Self {
        self.clip_scaled = Some(clip);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProcessingConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProcessingConfig, ConfigValidationError> {
        let defaults = ProcessingConfig::default();
        let config = ProcessingConfig {
            id_column: self.id_column.unwrap_or(defaults.id_column),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            drop_incomplete_rows: self
                .drop_incomplete_rows
                .unwrap_or(defaults.drop_incomplete_rows),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            separator: self.separator.unwrap_or(defaults.separator),
            clip_scaled: self.clip_scaled.unwrap_or(defaults.clip_scaled),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessingConfig::default();
        assert_eq!(config.id_column, "EmployeeId");
        assert_eq!(config.target_column, "Attrition");
        assert!(config.drop_incomplete_rows);
        assert_eq!(config.infer_schema_length, None);
        assert!(!config.clip_scaled);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = ProcessingConfig::builder().build().unwrap();
        assert_eq!(config, ProcessingConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ProcessingConfig::builder()
            .id_column("EmpNo")
            .target_column("Left")
            .drop_incomplete_rows(false)
            .infer_schema_length(Some(500))
            .separator(b';')
            .clip_scaled(true)
            .build()
            .unwrap();

        assert_eq!(config.id_column, "EmpNo");
        assert_eq!(config.target_column, "Left");
        assert!(!config.drop_incomplete_rows);
        assert_eq!(config.infer_schema_length, Some(500));
        assert_eq!(config.separator, b';');
        assert!(config.clip_scaled);
    }

    #[test]
    fn test_validation_rejects_feature_as_target() {
        let result = ProcessingConfig::builder().target_column("Age").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::FeatureColumn { .. }
        ));
    }

    #[test]
    fn test_validation_rejects_duplicate_columns() {
        let result = ProcessingConfig::builder()
            .id_column("Id")
            .target_column("Id")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn(_)
        ));
    }

    #[test]
    fn test_validation_rejects_zero_schema_length() {
        let result = ProcessingConfig::builder()
            .infer_schema_length(Some(0))
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSchemaLength
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "clip_scaled": true, "target_column": "Left" }"#;
        let config: ProcessingConfig = serde_json::from_str(json).unwrap();
        assert!(config.clip_scaled);
        assert_eq!(config.target_column, "Left");
        assert_eq!(config.id_column, "EmployeeId");
    }
}
