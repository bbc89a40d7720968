//! Employee Attrition Feature Processing
//!
//! Turns one employee's form submission into the numeric feature vector the
//! attrition model was trained on, using Polars for the reference data.
//!
//! # Overview
//!
//! - **Schema**: the 31 model features, their order and vocabularies
//! - **Form**: declarative form description and parsing of raw submitted values
//! - **Record**: the typed submission, (de)serializable with column names as keys
//! - **Dataset**: loading and normalizing the reference (training) table
//! - **Encoding**: label encoding, min-max scaling, and the persisted pipeline
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use attrition_processing::{
//!     EmployeeForm, FeaturePipeline, ProcessingConfig, ReferenceDataset,
//! };
//!
//! // Fit once against the training distribution and persist the encoders.
//! let config = ProcessingConfig::default();
//! let dataset = ReferenceDataset::load("employee_data_cleaned.csv", &config)?;
//! let pipeline = FeaturePipeline::fit(&dataset, &config)?;
//! pipeline.save("pipeline.json")?;
//!
//! // Later: parse a submission and encode it without refitting.
//! let pipeline = FeaturePipeline::load("pipeline.json")?;
//! let record = EmployeeForm::new().parse([("Age", "34"), ("Gender", "Female")])?;
//! let features = pipeline.transform(&record)?;
//! assert_eq!(features.len(), 31);
//! ```
//!
//! # Compatibility Mode
//!
//! [`FeaturePipeline::refit_transform`] fits the encoders over the reference
//! rows plus the new record on every call and encodes the record as the last
//! row of that frame. Unseen categories never fail in this mode, but the codes
//! and scales depend on the submitted record.

pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod form;
pub mod record;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ProcessingConfig, ProcessingConfigBuilder};
pub use dataset::ReferenceDataset;
pub use encoding::{
    ColumnEncoding, ColumnTransform, FeaturePipeline, LabelEncoder, MinMaxScaler,
    PIPELINE_FORMAT_VERSION,
};
pub use error::{FieldError, ProcessingError, Result as ProcessingResult, ResultExt};
pub use form::{EmployeeForm, FormField, Widget, form_fields};
pub use record::EmployeeRecord;
pub use schema::{
    EMPLOYEE_FEATURES, FEATURE_COUNT, FeatureKind, FeatureSpec, categorical_columns,
    feature_names, feature_specs, numerical_columns,
};
pub use types::{ColumnSummary, FeatureValue, FeatureVector};
