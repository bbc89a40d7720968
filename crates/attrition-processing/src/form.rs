//! Form collector.
//!
//! The visual form lives outside this crate. This module describes the
//! inputs it must render ([`form_fields`]) and turns the raw values it submits
//! into a validated [`EmployeeRecord`] ([`EmployeeForm::parse`]).
//!
//! Fields left out of a submission take the form default, so an empty
//! submission describes the form as first rendered.

use crate::error::{FieldError, ProcessingError, Result};
use crate::record::{AGE_RANGE, EmployeeRecord, MAX_PERCENT_SALARY_HIKE};
use crate::schema::{
    BusinessTravel, Department, Education, EducationField, FeatureKind, Gender, JobRole,
    MaritalStatus, OverTime, Rating, Satisfaction, feature_spec,
};
use crate::utils::{normalize_label, parse_boolean_string, parse_numeric_string};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

const JOB_LEVEL_OPTIONS: &[&str] = &["1", "2", "3", "4", "5"];
const STOCK_OPTION_LEVEL_OPTIONS: &[&str] = &["0", "1", "2", "3"];

/// Input widget used to collect a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    /// Integer input.
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<u32>,
        step: u32,
    },
    /// Dropdown.
    Select { options: &'static [&'static str] },
    /// Radio buttons.
    Radio { options: &'static [&'static str] },
    /// Discrete slider over an ordered scale.
    Slider { options: &'static [&'static str] },
    /// Checkbox; checked means `Yes`.
    Checkbox,
}

impl Widget {
    fn options(&self) -> Option<&'static [&'static str]> {
        match self {
            Widget::Select { options } | Widget::Radio { options } | Widget::Slider { options } => {
                Some(*options)
            }
            Widget::Number { .. } | Widget::Checkbox => None,
        }
    }
}

/// One input of the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    /// Dataset column the field fills.
    pub column: &'static str,
    /// Caption shown to the user.
    pub label: &'static str,
    #[serde(flatten)]
    pub widget: Widget,
    /// Raw value used when the field is not submitted.
    pub default: &'static str,
}

const fn number(column: &'static str, label: &'static str, step: u32) -> FormField {
    FormField {
        column,
        label,
        widget: Widget::Number {
            min: None,
            max: None,
            step,
        },
        default: "0",
    }
}

const fn select(
    column: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FormField {
    FormField {
        column,
        label,
        widget: Widget::Select { options },
        default: options[0],
    }
}

const fn slider(
    column: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FormField {
    FormField {
        column,
        label,
        widget: Widget::Slider { options },
        default: options[0],
    }
}

/// All form inputs in display order.
pub fn form_fields() -> Vec<FormField> {
    vec![
        FormField {
            column: "Age",
            label: "Age",
            widget: Widget::Number {
                min: Some(*AGE_RANGE.start()),
                max: Some(*AGE_RANGE.end()),
                step: 1,
            },
            default: "18",
        },
        FormField {
            column: "Gender",
            label: "Gender",
            widget: Widget::Radio {
                options: Gender::LABELS,
            },
            default: Gender::LABELS[0],
        },
        select("MaritalStatus", "Marital Status", MaritalStatus::LABELS),
        select("Education", "Education", Education::LABELS),
        select("EducationField", "Education Field", EducationField::LABELS),
        number("DistanceFromHome", "Distance From Home (in Km)", 1),
        select("JobRole", "JobRole", JobRole::LABELS),
        select("Department", "Department", Department::LABELS),
        select("JobLevel", "Job Level", JOB_LEVEL_OPTIONS),
        select("BusinessTravel", "Business Travel", BusinessTravel::LABELS),
        number("DailyRate", "Daily Rate", 100),
        number("HourlyRate", "Hourly Rate", 1),
        number("MonthlyIncome", "Monthly Income", 100),
        number("MonthlyRate", "Monthly Rate", 1000),
        FormField {
            column: "PercentSalaryHike",
            label: "Percent Salary Hike (%)",
            widget: Widget::Number {
                min: Some(0),
                max: Some(MAX_PERCENT_SALARY_HIKE),
                step: 1,
            },
            default: "0",
        },
        FormField {
            column: "StandardHours",
            label: "Standard Hours",
            widget: Widget::Number {
                min: Some(1),
                max: None,
                step: 1,
            },
            default: "80",
        },
        FormField {
            column: "OverTime",
            label: "Over Time",
            widget: Widget::Checkbox,
            default: "No",
        },
        slider("JobSatisfaction", "Job Satisfaction", Satisfaction::LABELS),
        slider(
            "EnvironmentSatisfaction",
            "Environment Satisfaction",
            Satisfaction::LABELS,
        ),
        slider(
            "RelationshipSatisfaction",
            "Relationship Satisfaction",
            Satisfaction::LABELS,
        ),
        slider("JobInvolvement", "Job Involvement", Satisfaction::LABELS),
        slider("PerformanceRating", "Performance Rating", Rating::LABELS),
        slider("WorkLifeBalance", "Work Life Balance", Rating::LABELS),
        select(
            "StockOptionLevel",
            "Stock Option Level",
            STOCK_OPTION_LEVEL_OPTIONS,
        ),
        number("NumCompaniesWorked", "Number of Companies Worked", 1),
        number("TrainingTimesLastYear", "Training Times Last Year", 1),
        number("TotalWorkingYears", "TotalWorkingYears", 1),
        number("YearsAtCompany", "Years at Company", 1),
        number("YearsInCurrentRole", "Years in Current Role", 1),
        number("YearsSinceLastPromotion", "Years Since Last Promotion", 1),
        number("YearsWithCurrManager", "Years with Current Manager", 1),
    ]
}

/// Parses raw form submissions into records.
#[derive(Debug, Clone)]
pub struct EmployeeForm {
    fields: Vec<FormField>,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeForm {
    pub fn new() -> Self {
        Self {
            fields: form_fields(),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Parse `column → raw value` pairs into a validated record.
    ///
    /// Every problem (unknown key, unparsable value, out-of-range value) is
    /// collected and returned together as [`ProcessingError::InvalidForm`].
    pub fn parse<I, K, V>(&self, submission: I) -> Result<EmployeeRecord>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut errors = Vec::new();
        let mut raw: BTreeMap<&'static str, String> = self
            .fields
            .iter()
            .map(|field| (field.column, field.default.to_string()))
            .collect();

        for (key, value) in submission {
            let key = key.as_ref().trim();
            match self.fields.iter().find(|field| field.column == key) {
                Some(field) => {
                    raw.insert(field.column, value.as_ref().to_string());
                }
                None => errors.push(FieldError::new(key, "unknown field")),
            }
        }

        let mut object = Map::new();
        for field in &self.fields {
            let value = &raw[field.column];
            match parse_field(field, value) {
                Ok(parsed) => {
                    object.insert(field.column.to_string(), parsed);
                }
                Err(reason) => errors.push(FieldError::new(field.column, reason)),
            }
        }

        if !errors.is_empty() {
            return Err(ProcessingError::InvalidForm(errors));
        }

        let record: EmployeeRecord = serde_json::from_value(Value::Object(object))?;
        record.validate()?;
        debug!("Parsed form submission into employee record");
        Ok(record)
    }
}

fn parse_field(field: &FormField, raw: &str) -> std::result::Result<Value, String> {
    match &field.widget {
        Widget::Checkbox => parse_boolean_string(raw)
            .map(|checked| Value::from(OverTime::from(checked).as_str()))
            .ok_or_else(|| format!("'{}' is not a checkbox value", raw)),
        Widget::Number { min, max, .. } => {
            let value = parse_whole_number(raw)?;
            if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
                return Err(format!(
                    "must be between {} and {} (got {})",
                    min.unwrap_or(0),
                    max.map_or_else(|| "any".to_string(), |max| max.to_string()),
                    value
                ));
            }
            Ok(Value::from(value))
        }
        widget => {
            let options = widget.options().unwrap_or(&[]);
            let wanted = normalize_label(raw);
            let label = options
                .iter()
                .find(|option| normalize_label(option) == wanted)
                .ok_or_else(|| format!("'{}' is not one of: {}", raw, options.join(", ")))?;

            // Dropdowns over levels feed numerical columns.
            match feature_spec(field.column).map(|spec| spec.kind) {
                Some(FeatureKind::Numerical) => parse_whole_number(label).map(Value::from),
                _ => Ok(Value::from(*label)),
            }
        }
    }
}

fn parse_whole_number(raw: &str) -> std::result::Result<u32, String> {
    let value = parse_numeric_string(raw).ok_or_else(|| format!("'{}' is not a number", raw))?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(format!("'{}' is not a whole number", raw));
    }
    if value < 0.0 {
        return Err(format!("must not be negative (got {})", raw));
    }
    if value > f64::from(u32::MAX) {
        return Err(format!("'{}' is too large", raw));
    }
    Ok(value as u32)
}
