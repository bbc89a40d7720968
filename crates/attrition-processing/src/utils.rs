//! Shared helpers for column dtypes and raw form values.

use crate::schema::FeatureKind;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Column Dtypes
// =============================================================================

/// Check if a DataType is an integer or float.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Feature kind a column of this dtype can feed, if any.
///
/// Booleans and temporal columns feed neither.
pub fn feature_kind_of(dtype: &DataType) -> Option<FeatureKind> {
    if is_numeric_dtype(dtype) {
        Some(FeatureKind::Numerical)
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        Some(FeatureKind::Categorical)
    } else {
        None
    }
}

/// Dtype a column of the given kind is normalized to before fitting.
pub fn storage_dtype(kind: FeatureKind) -> DataType {
    match kind {
        FeatureKind::Categorical => DataType::String,
        FeatureKind::Numerical => DataType::Float64,
    }
}

// =============================================================================
// Form Values
// =============================================================================

/// A number with optional thousands grouping (`,` or `_` between groups of
/// three digits), optional decimals and an optional trailing `%`.
static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:\d{1,3}(?:[,_]\d{3})+|\d+)(?:\.\d+)?(?:\s*%)?$")
        .expect("Invalid regex: numeric form value")
});

/// Parse a numeric form value such as `"5,993"` or `" 11% "`.
///
/// Separators anywhere other than between digit groups make the value
/// unparsable, so `"2,5"` and `"1 2 3"` are rejected rather than read as
/// `25` and `123`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !NUMERIC_PATTERN.is_match(trimmed) {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | '%') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Canonical form of a category label for lenient comparison.
///
/// Trims, lowercases, and treats `_` as a space.
pub fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase().replace('_', " ")
}

const CHECKED: [&str; 7] = ["true", "yes", "1", "t", "y", "on", "checked"];
const UNCHECKED: [&str; 7] = ["false", "no", "0", "f", "n", "off", "unchecked"];

/// Parse a checkbox value; `None` if it is neither checked nor unchecked.
pub fn parse_boolean_string(s: &str) -> Option<bool> {
    let lower = s.trim().to_ascii_lowercase();
    if CHECKED.contains(&lower.as_str()) {
        Some(true)
    } else if UNCHECKED.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_kind_of() {
        assert_eq!(
            feature_kind_of(&DataType::Int64),
            Some(FeatureKind::Numerical)
        );
        assert_eq!(
            feature_kind_of(&DataType::String),
            Some(FeatureKind::Categorical)
        );
        assert_eq!(feature_kind_of(&DataType::Boolean), None);
        assert_eq!(feature_kind_of(&DataType::Date), None);
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("5,130"), Some(5130.0));
        assert_eq!(parse_numeric_string("1_250_000"), Some(1_250_000.0));
        assert_eq!(parse_numeric_string(" 11% "), Some(11.0));
        assert_eq!(parse_numeric_string("12.5"), Some(12.5));
        assert_eq!(parse_numeric_string("-3"), Some(-3.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("many"), None);
    }

    #[test]
    fn test_parse_numeric_string_rejects_misplaced_separators() {
        assert_eq!(parse_numeric_string("2,5"), None);
        assert_eq!(parse_numeric_string("1 2 3"), None);
        assert_eq!(parse_numeric_string("59,93"), None);
        assert_eq!(parse_numeric_string("1,2345"), None);
        assert_eq!(parse_numeric_string("5%0"), None);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Travel_Rarely "), "travel rarely");
        assert_eq!(normalize_label("Non-Travel"), "non-travel");
    }

    #[test]
    fn test_parse_boolean_string() {
        assert_eq!(parse_boolean_string("Yes"), Some(true));
        assert_eq!(parse_boolean_string("on"), Some(true));
        assert_eq!(parse_boolean_string("FALSE"), Some(false));
        assert_eq!(parse_boolean_string("maybe"), None);
    }
}
