//! A single employee submission.
//!
//! [`EmployeeRecord`] holds the 31 attributes with typed values. It serializes
//! with the reference-dataset column names as keys, so a record can be read
//! straight from a JSON object such as:
//!
//! ```json
//! { "Age": 34, "BusinessTravel": "Travel Rarely", "Gender": "Female", ... }
//! ```

use crate::error::{FieldError, ProcessingError, Result};
use crate::schema::{
    BusinessTravel, Department, EMPLOYEE_FEATURES, Education, EducationField, FEATURE_COUNT,
    FeatureKind, Gender, JobRole, MaritalStatus, OverTime, Rating, Satisfaction, feature_index,
};
use crate::types::FeatureValue;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed age range.
pub const AGE_RANGE: RangeInclusive<u32> = 18..=60;

/// Allowed job levels.
pub const JOB_LEVEL_RANGE: RangeInclusive<u32> = 1..=5;

/// Allowed stock option levels.
pub const STOCK_OPTION_LEVEL_RANGE: RangeInclusive<u32> = 0..=3;

/// Upper bound for the percent salary hike.
pub const MAX_PERCENT_SALARY_HIKE: u32 = 100;

/// Default weekly standard hours.
pub const DEFAULT_STANDARD_HOURS: u32 = 80;

/// One employee's attributes, as collected by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EmployeeRecord {
    pub age: u32,
    pub business_travel: BusinessTravel,
    pub daily_rate: u32,
    pub department: Department,
    pub distance_from_home: u32,
    pub education: Education,
    pub education_field: EducationField,
    pub environment_satisfaction: Satisfaction,
    pub gender: Gender,
    pub hourly_rate: u32,
    pub job_involvement: Satisfaction,
    pub job_level: u32,
    pub job_role: JobRole,
    pub job_satisfaction: Satisfaction,
    pub marital_status: MaritalStatus,
    pub monthly_income: u32,
    pub monthly_rate: u32,
    pub num_companies_worked: u32,
    pub over_time: OverTime,
    pub percent_salary_hike: u32,
    pub performance_rating: Rating,
    pub relationship_satisfaction: Satisfaction,
    pub standard_hours: u32,
    pub stock_option_level: u32,
    pub total_working_years: u32,
    pub training_times_last_year: u32,
    pub work_life_balance: Rating,
    pub years_at_company: u32,
    pub years_in_current_role: u32,
    pub years_since_last_promotion: u32,
    pub years_with_curr_manager: u32,
}

impl EmployeeRecord {
    /// All feature values in model order.
    pub fn values(&self) -> [FeatureValue; FEATURE_COUNT] {
        use FeatureValue::{Category as C, Number as N};

        [
            N(f64::from(self.age)),
            C(self.business_travel.as_str()),
            N(f64::from(self.daily_rate)),
            C(self.department.as_str()),
            N(f64::from(self.distance_from_home)),
            C(self.education.as_str()),
            C(self.education_field.as_str()),
            C(self.environment_satisfaction.as_str()),
            C(self.gender.as_str()),
            N(f64::from(self.hourly_rate)),
            C(self.job_involvement.as_str()),
            N(f64::from(self.job_level)),
            C(self.job_role.as_str()),
            C(self.job_satisfaction.as_str()),
            C(self.marital_status.as_str()),
            N(f64::from(self.monthly_income)),
            N(f64::from(self.monthly_rate)),
            N(f64::from(self.num_companies_worked)),
            C(self.over_time.as_str()),
            N(f64::from(self.percent_salary_hike)),
            C(self.performance_rating.as_str()),
            C(self.relationship_satisfaction.as_str()),
            N(f64::from(self.standard_hours)),
            N(f64::from(self.stock_option_level)),
            N(f64::from(self.total_working_years)),
            N(f64::from(self.training_times_last_year)),
            C(self.work_life_balance.as_str()),
            N(f64::from(self.years_at_company)),
            N(f64::from(self.years_in_current_role)),
            N(f64::from(self.years_since_last_promotion)),
            N(f64::from(self.years_with_curr_manager)),
        ]
    }

    /// Value of a single column, `None` if the column is not a feature.
    pub fn value(&self, column: &str) -> Option<FeatureValue> {
        feature_index(column).map(|idx| self.values()[idx])
    }

    /// Build a one-row frame in model column order.
    ///
    /// Categorical columns are `String`, numerical columns are `Float64`,
    /// matching the dtypes of a normalized reference dataset.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = EMPLOYEE_FEATURES
            .iter()
            .zip(self.values())
            .map(|(spec, value)| match (spec.kind, value) {
                (FeatureKind::Categorical, FeatureValue::Category(label)) => {
                    Ok(Column::new(spec.name.into(), &[label]))
                }
                (FeatureKind::Numerical, FeatureValue::Number(number)) => {
                    Ok(Column::new(spec.name.into(), &[number]))
                }
                (kind, value) => Err(ProcessingError::TypeMismatch {
                    column: spec.name.to_string(),
                    expected: kind.to_string(),
                    actual: value.to_string(),
                }),
            })
            .collect::<Result<_>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Range violations of this record, empty when valid.
    pub fn validation_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        check_range(&mut errors, "Age", self.age, &AGE_RANGE);
        check_range(&mut errors, "JobLevel", self.job_level, &JOB_LEVEL_RANGE);
        check_range(
            &mut errors,
            "StockOptionLevel",
            self.stock_option_level,
            &STOCK_OPTION_LEVEL_RANGE,
        );

        if self.percent_salary_hike > MAX_PERCENT_SALARY_HIKE {
            errors.push(FieldError::new(
                "PercentSalaryHike",
                format!("must be at most {}", MAX_PERCENT_SALARY_HIKE),
            ));
        }
        if self.standard_hours == 0 {
            errors.push(FieldError::new("StandardHours", "must be greater than 0"));
        }

        errors
    }

    /// Validate ranges, reporting every violation at once.
    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProcessingError::InvalidForm(errors))
        }
    }
}

fn check_range(
    errors: &mut Vec<FieldError>,
    column: &str,
    value: u32,
    range: &RangeInclusive<u32>,
) {
    if !range.contains(&value) {
        errors.push(FieldError::new(
            column,
            format!(
                "must be between {} and {} (got {})",
                range.start(),
                range.end(),
                value
            ),
        ));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::feature_names;

    pub(crate) fn sample_record() -> EmployeeRecord {
        EmployeeRecord {
            age: 34,
            business_travel: BusinessTravel::TravelRarely,
            daily_rate: 800,
            department: Department::ResearchAndDevelopment,
            distance_from_home: 7,
            education: Education::Bachelor,
            education_field: EducationField::LifeSciences,
            environment_satisfaction: Satisfaction::High,
            gender: Gender::Female,
            hourly_rate: 65,
            job_involvement: Satisfaction::High,
            job_level: 2,
            job_role: JobRole::ResearchScientist,
            job_satisfaction: Satisfaction::Medium,
            marital_status: MaritalStatus::Married,
            monthly_income: 5200,
            monthly_rate: 14000,
            num_companies_worked: 2,
            over_time: OverTime::No,
            percent_salary_hike: 14,
            performance_rating: Rating::Excellent,
            relationship_satisfaction: Satisfaction::VeryHigh,
            standard_hours: 80,
            stock_option_level: 1,
            total_working_years: 10,
            training_times_last_year: 3,
            work_life_balance: Rating::Good,
            years_at_company: 5,
            years_in_current_role: 3,
            years_since_last_promotion: 1,
            years_with_curr_manager: 3,
        }
    }

    #[test]
    fn test_values_follow_schema_kinds() {
        let record = sample_record();
        for (spec, value) in EMPLOYEE_FEATURES.iter().zip(record.values()) {
            match spec.kind {
                FeatureKind::Categorical => assert!(value.as_category().is_some(), "{}", spec.name),
                FeatureKind::Numerical => assert!(value.as_number().is_some(), "{}", spec.name),
            }
        }
    }

    #[test]
    fn test_value_by_column() {
        let record = sample_record();
        assert_eq!(record.value("Age"), Some(FeatureValue::Number(34.0)));
        assert_eq!(
            record.value("Department"),
            Some(FeatureValue::Category("Research & Development"))
        );
        assert_eq!(record.value("Attrition"), None);
    }

    #[test]
    fn test_to_dataframe_shape_and_order() {
        let df = sample_record().to_dataframe().unwrap();
        assert_eq!(df.shape(), (1, FEATURE_COUNT));
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let expected: Vec<String> = feature_names().map(String::from).collect();
        assert_eq!(names, expected);
        assert_eq!(df.column("MonthlyIncome").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("OverTime").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_json_uses_column_names() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["YearsWithCurrManager"], 3);
        assert_eq!(json["BusinessTravel"], "Travel Rarely");

        let back: EmployeeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_unknown_json_field_rejected() {
        let mut json = serde_json::to_value(sample_record()).unwrap();
        json["Salary"] = serde_json::json!(10);
        assert!(serde_json::from_value::<EmployeeRecord>(json).is_err());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut record = sample_record();
        record.age = 17;
        record.job_level = 6;
        record.standard_hours = 0;

        let errors = record.validation_errors();
        let columns: Vec<_> = errors.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["Age", "JobLevel", "StandardHours"]);
        assert!(record.validate().is_err());
        assert!(sample_record().validate().is_ok());
    }
}
