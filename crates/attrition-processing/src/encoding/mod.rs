//! Feature encoding.
//!
//! - [`LabelEncoder`]: categorical column → integer code (sorted classes)
//! - [`MinMaxScaler`]: numerical column → `[0, 1]` from the fitted range
//! - [`FeaturePipeline`]: one fitted transform per feature, persisted as JSON

mod label;
mod pipeline;
mod scaler;

pub use label::LabelEncoder;
pub use pipeline::{ColumnEncoding, ColumnTransform, FeaturePipeline, PIPELINE_FORMAT_VERSION};
pub use scaler::MinMaxScaler;
