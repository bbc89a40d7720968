//! The training-time feature layout.
//!
//! The model consumes 31 features in a fixed order. Categorical features are
//! label encoded, numerical features are min-max scaled. The order below is
//! the order of every [`FeatureVector`](crate::FeatureVector) and of the
//! columns in a persisted [`FeaturePipeline`](crate::FeaturePipeline).
//!
//! Each categorical column draws its values from a closed vocabulary. The
//! vocabulary types accept their display label, case-insensitively, with `_`
//! accepted in place of a space (`travel_rarely` parses as `Travel Rarely`).

use crate::error::ProcessingError;
use crate::utils::normalize_label;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier column present in the reference CSV but not a feature.
pub const ID_COLUMN: &str = "EmployeeId";

/// Target column present in the reference CSV but not a feature.
pub const TARGET_COLUMN: &str = "Attrition";

/// Number of model features.
pub const FEATURE_COUNT: usize = 31;

/// How a feature column is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// String column, label encoded.
    Categorical,
    /// Numeric column, min-max scaled.
    Numerical,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Categorical => write!(f, "categorical"),
            FeatureKind::Numerical => write!(f, "numerical"),
        }
    }
}

/// Name and kind of one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn cat(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Categorical,
    }
}

const fn num(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Numerical,
    }
}

/// The feature columns in model order.
pub const EMPLOYEE_FEATURES: [FeatureSpec; FEATURE_COUNT] = [
    num("Age"),
    cat("BusinessTravel"),
    num("DailyRate"),
    cat("Department"),
    num("DistanceFromHome"),
    cat("Education"),
    cat("EducationField"),
    cat("EnvironmentSatisfaction"),
    cat("Gender"),
    num("HourlyRate"),
    cat("JobInvolvement"),
    num("JobLevel"),
    cat("JobRole"),
    cat("JobSatisfaction"),
    cat("MaritalStatus"),
    num("MonthlyIncome"),
    num("MonthlyRate"),
    num("NumCompaniesWorked"),
    cat("OverTime"),
    num("PercentSalaryHike"),
    cat("PerformanceRating"),
    cat("RelationshipSatisfaction"),
    num("StandardHours"),
    num("StockOptionLevel"),
    num("TotalWorkingYears"),
    num("TrainingTimesLastYear"),
    cat("WorkLifeBalance"),
    num("YearsAtCompany"),
    num("YearsInCurrentRole"),
    num("YearsSinceLastPromotion"),
    num("YearsWithCurrManager"),
];

/// The ordered feature specs.
pub fn feature_specs() -> &'static [FeatureSpec] {
    &EMPLOYEE_FEATURES
}

/// Feature names in model order.
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    EMPLOYEE_FEATURES.iter().map(|spec| spec.name)
}

/// Look up a feature by column name.
pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    EMPLOYEE_FEATURES.iter().find(|spec| spec.name == name)
}

/// Position of a feature in the model order.
pub fn feature_index(name: &str) -> Option<usize> {
    EMPLOYEE_FEATURES.iter().position(|spec| spec.name == name)
}

pub fn categorical_columns() -> Vec<&'static str> {
    columns_of_kind(FeatureKind::Categorical)
}

pub fn numerical_columns() -> Vec<&'static str> {
    columns_of_kind(FeatureKind::Numerical)
}

fn columns_of_kind(kind: FeatureKind) -> Vec<&'static str> {
    EMPLOYEE_FEATURES
        .iter()
        .filter(|spec| spec.kind == kind)
        .map(|spec| spec.name)
        .collect()
}

/// Allowed labels of a categorical column, `None` for numerical or unknown columns.
pub fn vocabulary(column: &str) -> Option<&'static [&'static str]> {
    let labels = match column {
        "BusinessTravel" => BusinessTravel::LABELS,
        "Department" => Department::LABELS,
        "Education" => Education::LABELS,
        "EducationField" => EducationField::LABELS,
        "Gender" => Gender::LABELS,
        "JobRole" => JobRole::LABELS,
        "MaritalStatus" => MaritalStatus::LABELS,
        "OverTime" => OverTime::LABELS,
        "EnvironmentSatisfaction"
        | "JobInvolvement"
        | "JobSatisfaction"
        | "RelationshipSatisfaction" => Satisfaction::LABELS,
        "PerformanceRating" | "WorkLifeBalance" => Rating::LABELS,
        _ => return None,
    };
    Some(labels)
}

/// Columns whose vocabulary is `labels`.
fn columns_with_vocabulary(labels: &[&str]) -> Vec<&'static str> {
    EMPLOYEE_FEATURES
        .iter()
        .map(|spec| spec.name)
        .filter(|name| vocabulary(name) == Some(labels))
        .collect()
}

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every value, in form order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Display labels, in form order.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// The label used in the reference dataset.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ProcessingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| normalize_label(value.as_str()) == wanted)
                    .ok_or_else(|| ProcessingError::InvalidValue {
                        vocabulary: stringify!($name).to_string(),
                        columns: columns_with_vocabulary(Self::LABELS).join(", "),
                        value: s.to_string(),
                        expected: Self::LABELS.join(", "),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

vocabulary!(
    /// How often the employee travels for work.
    BusinessTravel {
        NonTravel => "Non-Travel",
        TravelRarely => "Travel Rarely",
        TravelFrequently => "Travel Frequently",
    }
);

vocabulary!(
    Department {
        HumanResources => "Human Resources",
        ResearchAndDevelopment => "Research & Development",
        Sales => "Sales",
    }
);

vocabulary!(
    /// Highest education level.
    Education {
        BelowCollege => "Below College",
        College => "College",
        Bachelor => "Bachelor",
        Master => "Master",
        Doctor => "Doctor",
    }
);

vocabulary!(
    EducationField {
        HumanResources => "Human Resources",
        LifeSciences => "Life Sciences",
        Marketing => "Marketing",
        Medical => "Medical",
        TechnicalDegree => "Technical Degree",
        Other => "Other",
    }
);

vocabulary!(
    Gender {
        Male => "Male",
        Female => "Female",
    }
);

vocabulary!(
    JobRole {
        HumanResources => "Human Resources",
        SalesExecutive => "Sales Executive",
        SalesRepresentative => "Sales Representative",
        HealthcareRepresentative => "Healthcare Representative",
        ResearchScientist => "Research Scientist",
        LaboratoryTechnician => "Laboratory Technician",
        Manager => "Manager",
        ManufacturingDirector => "Manufacturing Director",
        ResearchDirector => "Research Director",
    }
);

vocabulary!(
    MaritalStatus {
        Single => "Single",
        Married => "Married",
        Divorced => "Divorced",
    }
);

vocabulary!(
    /// Whether the employee works overtime. The form collects this as a checkbox.
    OverTime {
        Yes => "Yes",
        No => "No",
    }
);

vocabulary!(
    /// Four-step scale shared by the satisfaction and involvement questions.
    Satisfaction {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        VeryHigh => "Very High",
    }
);

vocabulary!(
    /// Four-step scale shared by performance rating and work-life balance.
    Rating {
        Low => "Low",
        Good => "Good",
        Excellent => "Excellent",
        Outstanding => "Outstanding",
    }
);

impl From<bool> for OverTime {
    fn from(checked: bool) -> Self {
        if checked { OverTime::Yes } else { OverTime::No }
    }
}
