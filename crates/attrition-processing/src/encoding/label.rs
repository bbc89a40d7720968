//! Label encoding of categorical columns.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maps each distinct category string to its index in the sorted class list.
///
/// Classes are sorted by byte order, so `"Female" → 0`, `"Male" → 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on the values of `column`.
    pub fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        if classes.is_empty() {
            return Err(ProcessingError::NotFitted(column.to_string()));
        }

        Ok(Self {
            classes: classes.into_iter().map(String::from).collect(),
        })
    }

    /// Fit on a string series, ignoring nulls.
    pub fn fit_series(series: &Series) -> Result<Self> {
        let values = series.str()?;
        Self::fit(series.name(), values.into_iter().flatten())
    }

    /// Classes in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Code of `value`, `None` if it was not seen at fit time.
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }

    /// Class of `code`, `None` if out of range.
    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Check a deserialized encoder: classes must be non-empty, sorted and distinct.
    pub(crate) fn validate(&self, column: &str) -> Result<()> {
        if self.classes.is_empty() {
            return Err(ProcessingError::NotFitted(column.to_string()));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ProcessingError::IncompatibleArtifact(format!(
                "classes of '{}' are not sorted and distinct",
                column
            )));
        }
        Ok(())
    }
}
