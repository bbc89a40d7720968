//! Reference dataset loading.
//!
//! The reference dataset is the table the model was trained on. Encoders are
//! fitted against it so new records are encoded with the training
//! distribution. Loading normalizes the raw table:
//!
//! 1. the identifier and target columns are dropped,
//! 2. every feature column must be present with a dtype matching its kind,
//! 3. columns are reordered into model order (categorical → `String`,
//!    numerical → `Float64`),
//! 4. incomplete rows are dropped or rejected, per configuration.

use crate::config::ProcessingConfig;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::record::EmployeeRecord;
use crate::schema::{EMPLOYEE_FEATURES, FEATURE_COUNT, FeatureKind, FeatureSpec, feature_spec, vocabulary};
use crate::utils::{feature_kind_of, storage_dtype};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Normalized reference table used to fit encoders.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    frame: DataFrame,
    dropped_rows: usize,
}

impl ReferenceDataset {
    /// Load the reference dataset from a CSV file with a header row.
    pub fn load(path: impl AsRef<Path>, config: &ProcessingConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProcessingError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("reference dataset not found: {}", path.display()),
            )));
        }

        info!("Loading reference dataset from: {}", path.display());
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(config.infer_schema_length)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(config.separator)
                    .with_quote_char(Some(b'"')),
            )
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .context("Opening reference dataset")?
            .finish()
            .context("Reading reference dataset")?;
        debug!("Raw reference dataset shape: {:?}", df.shape());

        Self::from_frame(df, config)
    }

    /// Normalize an in-memory frame into a reference dataset.
    pub fn from_frame(mut df: DataFrame, config: &ProcessingConfig) -> Result<Self> {
        for column in [&config.id_column, &config.target_column] {
            if df.get_column_index(column).is_some() {
                df = df.drop(column)?;
                debug!("Dropped non-feature column '{}'", column);
            }
        }

        let extra: Vec<String> = df
            .get_column_names()
            .iter()
            .filter(|name| feature_spec(name.as_str()).is_none())
            .map(|name| name.to_string())
            .collect();
        if !extra.is_empty() {
            warn!("Ignoring columns that are not model features: {:?}", extra);
        }

        let mut columns = Vec::with_capacity(FEATURE_COUNT);
        for spec in EMPLOYEE_FEATURES.iter() {
            let column = df
                .column(spec.name)
                .map_err(|_| ProcessingError::ColumnNotFound(spec.name.to_string()))?;
            columns.push(normalize_column(spec, column)?);
        }
        let mut frame = DataFrame::new(columns)?;

        let rows_before = frame.height();
        let incomplete: Vec<(String, usize)> = frame
            .get_columns()
            .iter()
            .filter(|column| column.null_count() > 0)
            .map(|column| (column.name().to_string(), column.null_count()))
            .collect();

        if let Some((column, count)) = incomplete.first() {
            if !config.drop_incomplete_rows {
                return Err(ProcessingError::NullValues {
                    column: column.clone(),
                    count: *count,
                });
            }
            frame = frame.drop_nulls::<String>(None)?;
            warn!(
                "Dropped {} incomplete reference rows (nulls in {:?})",
                rows_before - frame.height(),
                incomplete.iter().map(|(name, _)| name).collect::<Vec<_>>()
            );
        }

        if frame.height() == 0 {
            return Err(ProcessingError::EmptyDataset);
        }

        warn_on_unknown_labels(&frame)?;
        info!(
            "Reference dataset ready: {} rows x {} features",
            frame.height(),
            frame.width()
        );

        Ok(Self {
            dropped_rows: rows_before - frame.height(),
            frame,
        })
    }

    /// The normalized frame, columns in model order.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Rows removed because of nulls.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// The reference frame with `record` appended as its last row.
    pub fn with_record(&self, record: &EmployeeRecord) -> Result<DataFrame> {
        let row = record.to_dataframe()?;
        let mut combined = self.frame.clone();
        combined
            .vstack_mut(&row)
            .context("Appending record to reference dataset")?;
        Ok(combined)
    }
}

fn normalize_column(spec: &FeatureSpec, column: &Column) -> Result<Column> {
    if feature_kind_of(column.dtype()) != Some(spec.kind) {
        return Err(ProcessingError::TypeMismatch {
            column: spec.name.to_string(),
            expected: spec.kind.to_string(),
            actual: column.dtype().to_string(),
        });
    }
    Ok(column.cast(&storage_dtype(spec.kind))?)
}

/// Labels the form can never produce would only ever be matched by the
/// refit mode, so they are worth surfacing.
fn warn_on_unknown_labels(frame: &DataFrame) -> Result<()> {
    for spec in EMPLOYEE_FEATURES
        .iter()
        .filter(|spec| spec.kind == FeatureKind::Categorical)
    {
        let Some(labels) = vocabulary(spec.name) else {
            continue;
        };
        let series = frame.column(spec.name)?.as_materialized_series();
        let unknown: BTreeSet<&str> = series
            .str()?
            .into_iter()
            .flatten()
            .filter(|value| !labels.contains(value))
            .collect();
        if !unknown.is_empty() {
            warn!(
                "Column '{}' has labels outside the form vocabulary: {:?}",
                spec.name, unknown
            );
        }
    }
    Ok(())
}
