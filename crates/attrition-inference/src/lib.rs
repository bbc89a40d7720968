//! Employee Attrition Inference
//!
//! Scores employee records with a gradient-boosted tree ensemble exported to
//! JSON, using the feature encoders from [`attrition_processing`].
//!
//! # Overview
//!
//! - **Model**: [`GradientBoostingModel`] loads, validates and evaluates the
//!   tree ensemble natively (threshold comparisons down each tree)
//! - **Predictor**: [`Predictor`] encodes a record and scores it, returning a
//!   [`Prediction`] that displays as `Attrition: Yes` / `Attrition: No`
//! - **Config**: [`PredictorConfig`] selects the artifacts and the
//!   [`EncodingMode`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use attrition_inference::{Predictor, PredictorConfig};
//! use attrition_processing::EmployeeForm;
//!
//! let config = PredictorConfig::builder()
//!     .model_path("model.json")
//!     .pipeline_path("pipeline.json")
//!     .build()?;
//! let predictor = Predictor::from_config(&config)?;
//!
//! let record = EmployeeForm::new().parse([("Age", "29"), ("OverTime", "yes")])?;
//! let prediction = predictor.predict(&record)?;
//! println!("{} (p = {:.2})", prediction, prediction.probability);
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod predictor;
pub mod types;

// Re-exports for convenient access
pub use config::{DEFAULT_DECISION_THRESHOLD, EncodingMode, PredictorConfig, PredictorConfigBuilder};
pub use error::{InferenceError, Result};
pub use model::{GradientBoostingModel, Node, Tree};
pub use predictor::Predictor;
pub use types::{Attrition, ModelInfo, Prediction};
