use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A single raw (unencoded) feature value taken from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    /// Label of a categorical column.
    Category(&'static str),
    /// Value of a numerical column.
    Number(f64),
}

impl FeatureValue {
    pub fn as_category(&self) -> Option<&'static str> {
        match self {
            FeatureValue::Category(label) => Some(label),
            FeatureValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            FeatureValue::Category(_) => None,
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Category(label) => f.write_str(label),
            FeatureValue::Number(value) => write!(f, "{}", value),
        }
    }
}

/// Encoded feature row, in model feature order.
///
/// Categorical codes are stored as `f64` so the whole row can be handed to
/// the model as a single slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Per-column description of a fitted encoder, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub kind: crate::schema::FeatureKind,
    /// Label classes in code order (categorical columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
    /// Fitted `(min, max)` (numerical columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_value_accessors() {
        assert_eq!(FeatureValue::Category("Sales").as_category(), Some("Sales"));
        assert_eq!(FeatureValue::Category("Sales").as_number(), None);
        assert_eq!(FeatureValue::Number(4.0).as_number(), Some(4.0));
    }

    #[test]
    fn test_feature_vector_serializes_as_array() {
        let vector = FeatureVector::new(vec![0.5, 2.0]);
        assert_eq!(serde_json::to_string(&vector).unwrap(), "[0.5,2.0]");
        assert_eq!(vector[1], 2.0);
        assert_eq!(vector.len(), 2);
    }
}
