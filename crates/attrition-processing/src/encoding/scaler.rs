//! Min-max scaling of numerical columns to `[0, 1]`.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Ranges narrower than this are treated as constant columns.
const MIN_RANGE: f64 = 10.0 * f64::EPSILON;

/// Fitted minimum and maximum of one numerical column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: f64,
    data_max: f64,
}

impl MinMaxScaler {
    /// Fit on the values of `column`. Every value must be finite.
    pub fn fit(column: &str, values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut bounds: Option<(f64, f64)> = None;
        for value in values {
            if !value.is_finite() {
                return Err(ProcessingError::NonFiniteValue {
                    column: column.to_string(),
                    value,
                });
            }
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(value), max.max(value)),
                None => (value, value),
            });
        }

        let (data_min, data_max) =
            bounds.ok_or_else(|| ProcessingError::NotFitted(column.to_string()))?;
        Ok(Self { data_min, data_max })
    }

    /// Fit on a `Float64` series, ignoring nulls.
    pub fn fit_series(series: &Series) -> Result<Self> {
        let values = series.f64()?;
        Self::fit(series.name(), values.into_iter().flatten())
    }

    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    /// Multiplier applied after shifting by `data_min`.
    ///
    /// A constant column gets a scale of 1, so it maps to 0.
    pub fn scale(&self) -> f64 {
        let range = self.data_max - self.data_min;
        if range < MIN_RANGE { 1.0 } else { 1.0 / range }
    }

    /// Scale `value`. With `clip`, the result is clamped into `[0, 1]`.
    pub fn transform(&self, value: f64, clip: bool) -> f64 {
        let scale = self.scale();
        let scaled = value * scale - self.data_min * scale;
        if clip { scaled.clamp(0.0, 1.0) } else { scaled }
    }

    /// Whether `value` lies inside the fitted range.
    pub fn contains(&self, value: f64) -> bool {
        (self.data_min..=self.data_max).contains(&value)
    }

    pub(crate) fn validate(&self, column: &str) -> Result<()> {
        for value in [self.data_min, self.data_max] {
            if !value.is_finite() {
                return Err(ProcessingError::NonFiniteValue {
                    column: column.to_string(),
                    value,
                });
            }
        }
        if self.data_min > self.data_max {
            return Err(ProcessingError::IncompatibleArtifact(format!(
                "scaler for '{}' has data_min > data_max",
                column
            )));
        }
        Ok(())
    }
}
