//! The fitted feature pipeline.
//!
//! A [`FeaturePipeline`] holds one fitted transform per feature column, in
//! model order. It is fitted once against the reference dataset, persisted as
//! JSON, and applied to every new record without refitting:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "fitted_at": "2026-10-19T09:30:00Z",
//!   "reference_rows": 1470,
//!   "clip": false,
//!   "columns": [
//!     { "column": "Age", "encoding": "min_max", "data_min": 18.0, "data_max": 60.0 },
//!     { "column": "BusinessTravel", "encoding": "label", "classes": ["Non-Travel", "..."] }
//!   ]
//! }
//! ```

use crate::config::ProcessingConfig;
use crate::dataset::ReferenceDataset;
use crate::encoding::{LabelEncoder, MinMaxScaler};
use crate::error::{ProcessingError, Result, ResultExt};
use crate::record::EmployeeRecord;
use crate::schema::{EMPLOYEE_FEATURES, FEATURE_COUNT, FeatureKind};
use crate::types::{ColumnSummary, FeatureValue, FeatureVector};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Version of the persisted pipeline format.
pub const PIPELINE_FORMAT_VERSION: u32 = 1;

/// Fitted encoding of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", rename_all = "snake_case")]
pub enum ColumnEncoding {
    Label(LabelEncoder),
    MinMax(MinMaxScaler),
}

impl ColumnEncoding {
    /// Feature kind this encoding applies to.
    pub fn kind(&self) -> FeatureKind {
        match self {
            ColumnEncoding::Label(_) => FeatureKind::Categorical,
            ColumnEncoding::MinMax(_) => FeatureKind::Numerical,
        }
    }
}

/// A column name with its fitted encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransform {
    pub column: String,
    #[serde(flatten)]
    pub encoding: ColumnEncoding,
}

impl ColumnTransform {
    fn fit(column: &Column, kind: FeatureKind) -> Result<Self> {
        let series = column.as_materialized_series();
        let encoding = match kind {
            FeatureKind::Categorical => ColumnEncoding::Label(LabelEncoder::fit_series(series)?),
            FeatureKind::Numerical => ColumnEncoding::MinMax(MinMaxScaler::fit_series(series)?),
        };
        Ok(Self {
            column: column.name().to_string(),
            encoding,
        })
    }

    /// Encode one raw value.
    fn encode(&self, value: FeatureValue, clip: bool) -> Result<f64> {
        match (&self.encoding, value) {
            (ColumnEncoding::Label(encoder), FeatureValue::Category(label)) => encoder
                .transform(label)
                .map(|code| code as f64)
                .ok_or_else(|| ProcessingError::UnknownCategory {
                    column: self.column.clone(),
                    value: label.to_string(),
                }),
            (ColumnEncoding::MinMax(scaler), FeatureValue::Number(number)) => {
                if !number.is_finite() {
                    return Err(ProcessingError::NonFiniteValue {
                        column: self.column.clone(),
                        value: number,
                    });
                }
                if !scaler.contains(number) {
                    if clip {
                        warn!(
                            "Clipping '{}' = {} into fitted range [{}, {}]",
                            self.column,
                            number,
                            scaler.data_min(),
                            scaler.data_max()
                        );
                    } else {
                        debug!(
                            "'{}' = {} is outside the fitted range [{}, {}]",
                            self.column,
                            number,
                            scaler.data_min(),
                            scaler.data_max()
                        );
                    }
                }
                Ok(scaler.transform(number, clip))
            }
            (encoding, value) => Err(ProcessingError::TypeMismatch {
                column: self.column.clone(),
                expected: encoding.kind().to_string(),
                actual: value.to_string(),
            }),
        }
    }

    fn summary(&self) -> ColumnSummary {
        let (classes, range) = match &self.encoding {
            ColumnEncoding::Label(encoder) => (Some(encoder.classes().to_vec()), None),
            ColumnEncoding::MinMax(scaler) => (None, Some((scaler.data_min(), scaler.data_max()))),
        };
        ColumnSummary {
            column: self.column.clone(),
            kind: self.encoding.kind(),
            classes,
            range,
        }
    }
}

/// Fitted encoders for every feature column, in model order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    format_version: u32,
    fitted_at: DateTime<Utc>,
    reference_rows: usize,
    clip: bool,
    columns: Vec<ColumnTransform>,
}

static_assertions::assert_impl_all!(FeaturePipeline: Send, Sync);

impl FeaturePipeline {
    /// Fit one transform per feature column over the reference dataset.
    pub fn fit(dataset: &ReferenceDataset, config: &ProcessingConfig) -> Result<Self> {
        let pipeline = Self::fit_frame(dataset.frame(), config.clip_scaled)?;
        info!(
            "Fitted feature pipeline on {} reference rows ({} columns)",
            pipeline.reference_rows,
            pipeline.columns.len()
        );
        Ok(pipeline)
    }

    /// Fit over a normalized frame (feature columns, reference dtypes).
    fn fit_frame(frame: &DataFrame, clip: bool) -> Result<Self> {
        let columns = EMPLOYEE_FEATURES
            .iter()
            .map(|spec| {
                let column = frame
                    .column(spec.name)
                    .map_err(|_| ProcessingError::ColumnNotFound(spec.name.to_string()))?;
                ColumnTransform::fit(column, spec.kind)
                    .context(format!("Fitting encoder for '{}'", spec.name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            format_version: PIPELINE_FORMAT_VERSION,
            fitted_at: Utc::now(),
            reference_rows: frame.height(),
            clip,
            columns,
        })
    }

    /// Encode one record into a feature vector.
    pub fn transform(&self, record: &EmployeeRecord) -> Result<FeatureVector> {
        let values = self
            .columns
            .iter()
            .zip(record.values())
            .map(|(transform, value)| transform.encode(value, self.clip))
            .collect::<Result<Vec<_>>>()?;
        Ok(FeatureVector::new(values))
    }

    /// Encode several records; fails on the first invalid one.
    pub fn transform_batch(&self, records: &[EmployeeRecord]) -> Result<Vec<FeatureVector>> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                self.transform(record)
                    .context(format!("Encoding record {}", idx))
            })
            .collect()
    }

    /// Fit over the reference rows plus `record`, then encode `record`.
    ///
    /// The record is the last row of the frame the encoders are fitted on,
    /// so every category it uses is known and its numbers lie inside the
    /// fitted ranges.
    pub fn refit_transform(
        dataset: &ReferenceDataset,
        record: &EmployeeRecord,
        config: &ProcessingConfig,
    ) -> Result<FeatureVector> {
        let combined = dataset.with_record(record)?;
        debug!("Refitting encoders over {} rows", combined.height());
        let pipeline = Self::fit_frame(&combined, config.clip_scaled)?;
        pipeline.transform(record)
    }

    /// Write the pipeline as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Creating pipeline directory")?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).context(format!("Writing pipeline to {}", path.display()))?;
        info!("Saved feature pipeline to: {}", path.display());
        Ok(())
    }

    /// Read and validate a pipeline written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .context(format!("Reading pipeline from {}", path.display()))?;
        let pipeline = Self::from_json(&json)?;
        info!(
            "Loaded feature pipeline from: {} (fitted {})",
            path.display(),
            pipeline.fitted_at
        );
        Ok(pipeline)
    }

    /// Parse and validate a pipeline from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let pipeline: Self = serde_json::from_str(json)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != PIPELINE_FORMAT_VERSION {
            return Err(ProcessingError::IncompatibleArtifact(format!(
                "pipeline format version {} is not supported (expected {})",
                self.format_version, PIPELINE_FORMAT_VERSION
            )));
        }
        if self.columns.len() != FEATURE_COUNT {
            return Err(ProcessingError::IncompatibleArtifact(format!(
                "pipeline has {} columns, expected {}",
                self.columns.len(),
                FEATURE_COUNT
            )));
        }

        for (idx, (transform, spec)) in self.columns.iter().zip(EMPLOYEE_FEATURES.iter()).enumerate() {
            if transform.column != spec.name {
                return Err(ProcessingError::IncompatibleArtifact(format!(
                    "column {} is '{}', expected '{}'",
                    idx, transform.column, spec.name
                )));
            }
            if transform.encoding.kind() != spec.kind {
                return Err(ProcessingError::IncompatibleArtifact(format!(
                    "column '{}' is encoded as {}, expected {}",
                    spec.name,
                    transform.encoding.kind(),
                    spec.kind
                )));
            }
            match &transform.encoding {
                ColumnEncoding::Label(encoder) => encoder.validate(spec.name)?,
                ColumnEncoding::MinMax(scaler) => scaler.validate(spec.name)?,
            }
        }
        Ok(())
    }

    /// Column names in model order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(|t| t.column.as_str()).collect()
    }

    pub fn columns(&self) -> &[ColumnTransform] {
        &self.columns
    }

    /// Transform for `column`, if it is a feature.
    pub fn column(&self, column: &str) -> Option<&ColumnTransform> {
        self.columns.iter().find(|t| t.column == column)
    }

    /// Per-column description for display.
    pub fn summaries(&self) -> Vec<ColumnSummary> {
        self.columns.iter().map(ColumnTransform::summary).collect()
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    pub fn reference_rows(&self) -> usize {
        self.reference_rows
    }

    pub fn clip(&self) -> bool {
        self.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_record;
    use crate::schema::{BusinessTravel, Gender, OverTime};
    use pretty_assertions::assert_eq;

    fn reference() -> ReferenceDataset {
        let mut frame = sample_record().to_dataframe().unwrap();

        let mut second = sample_record();
        second.age = 50;
        second.gender = Gender::Male;
        second.business_travel = BusinessTravel::TravelFrequently;
        second.monthly_income = 9200;
        frame.vstack_mut(&second.to_dataframe().unwrap()).unwrap();

        let mut third = sample_record();
        third.age = 18;
        third.over_time = OverTime::Yes;
        frame.vstack_mut(&third.to_dataframe().unwrap()).unwrap();

        ReferenceDataset::from_frame(frame, &ProcessingConfig::default()).unwrap()
    }

    fn fitted() -> FeaturePipeline {
        FeaturePipeline::fit(&reference(), &ProcessingConfig::default()).unwrap()
    }

    #[test]
    fn test_fit_covers_every_feature_in_order() {
        let pipeline = fitted();
        let expected: Vec<&str> = crate::schema::feature_names().collect();
        assert_eq!(pipeline.feature_names(), expected);
        assert_eq!(pipeline.reference_rows(), 3);
        assert!(!pipeline.clip());
    }

    #[test]
    fn test_transform_encodes_codes_and_scales() {
        let pipeline = fitted();
        let vector = pipeline.transform(&sample_record()).unwrap();
        assert_eq!(vector.len(), FEATURE_COUNT);

        // Age 34 over [18, 50].
        assert_eq!(vector[0], 0.5);
        // BusinessTravel classes: ["Travel Frequently", "Travel Rarely"].
        assert_eq!(vector[1], 1.0);
        // Gender classes: ["Female", "Male"].
        assert_eq!(vector[8], 0.0);
        // Constant StandardHours maps to 0.
        assert_eq!(vector[22], 0.0);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let pipeline = fitted();
        let mut record = sample_record();
        record.business_travel = BusinessTravel::NonTravel;

        let err = pipeline.transform(&record).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::UnknownCategory { ref column, ref value }
                if column == "BusinessTravel" && value == "Non-Travel"
        ));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_refit_accepts_new_category_and_range() {
        let mut record = sample_record();
        record.business_travel = BusinessTravel::NonTravel;
        record.age = 60;

        let vector =
            FeaturePipeline::refit_transform(&reference(), &record, &ProcessingConfig::default())
                .unwrap();
        // Classes become ["Non-Travel", "Travel Frequently", "Travel Rarely"].
        assert_eq!(vector[1], 0.0);
        // The new record holds the maximum age.
        assert!((vector[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_refit_matches_fitted_when_record_is_in_distribution() {
        let record = sample_record();
        let fitted = fitted().transform(&record).unwrap();
        let refit =
            FeaturePipeline::refit_transform(&reference(), &record, &ProcessingConfig::default())
                .unwrap();
        assert_eq!(fitted, refit);
    }

    #[test]
    fn test_clip_bounds_out_of_range_values() {
        let config = ProcessingConfig::builder().clip_scaled(true).build().unwrap();
        let pipeline = FeaturePipeline::fit(&reference(), &config).unwrap();
        let mut record = sample_record();
        record.age = 60;

        let vector = pipeline.transform(&record).unwrap();
        assert_eq!(vector[0], 1.0);

        let unclipped = fitted().transform(&record).unwrap();
        assert!(unclipped[0] > 1.0);
    }

    #[test]
    fn test_transform_batch_reports_failing_record() {
        let pipeline = fitted();
        let mut bad = sample_record();
        bad.business_travel = BusinessTravel::NonTravel;

        let err = pipeline
            .transform_batch(&[sample_record(), bad])
            .unwrap_err();
        assert!(err.to_string().contains("Encoding record 1"));
        assert_eq!(err.error_code(), "UNKNOWN_CATEGORY");
    }

    #[test]
    fn test_json_round_trip_preserves_encoders() {
        let pipeline = fitted();
        let json = serde_json::to_string(&pipeline).unwrap();
        assert!(json.contains(r#""encoding":"min_max""#));
        assert!(json.contains(r#""encoding":"label""#));

        let loaded = FeaturePipeline::from_json(&json).unwrap();
        assert_eq!(loaded, pipeline);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let mut value = serde_json::to_value(fitted()).unwrap();
        value["format_version"] = serde_json::json!(2);
        let err = FeaturePipeline::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_ARTIFACT");
    }

    #[test]
    fn test_load_rejects_reordered_columns() {
        let mut value = serde_json::to_value(fitted()).unwrap();
        let columns = value["columns"].as_array_mut().unwrap();
        columns.swap(0, 2);
        let err = FeaturePipeline::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("expected 'Age'"));
    }

    #[test]
    fn test_load_rejects_wrong_column_kind() {
        let mut value = serde_json::to_value(fitted()).unwrap();
        value["columns"][0] = serde_json::json!({
            "column": "Age",
            "encoding": "label",
            "classes": ["18"]
        });
        let err = FeaturePipeline::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_ARTIFACT");
        assert!(err.to_string().contains("expected numerical"));
    }

    #[test]
    fn test_summaries() {
        let summaries = fitted().summaries();
        assert_eq!(summaries[0].range, Some((18.0, 50.0)));
        assert_eq!(
            summaries[8].classes,
            Some(vec!["Female".to_string(), "Male".to_string()])
        );
    }
}
