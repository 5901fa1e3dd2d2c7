//! Census feature schema
//!
//! Column order in these tables fixes the column order of every feature
//! matrix, so training and inference agree across process restarts.

/// Categorical feature columns, in matrix order
pub const CATEGORICAL_FEATURES: [&str; 8] = [
    "workclass",
    "education",
    "marital-status",
    "occupation",
    "relationship",
    "race",
    "sex",
    "native-country",
];

/// Numerical feature columns, in matrix order
pub const NUMERICAL_FEATURES: [&str; 3] = ["age", "education-num", "hours-per-week"];

/// Target column of the census dataset
pub const LABEL_COLUMN: &str = "salary";

/// Token the raw dataset uses for a missing value
pub const MISSING_MARKER: &str = "?";

/// Columns dropped by cleaning: mostly-zero capital columns and the `fnlgt` sampling weight
pub const WEAK_COLUMNS: [&str; 3] = ["capital-loss", "capital-gain", "fnlgt"];

pub const WORKCLASS: &[&str] = &[
    "State-gov",
    "Self-emp-not-inc",
    "Private",
    "Federal-gov",
    "Local-gov",
    "Self-emp-inc",
    "Without-pay",
];

pub const EDUCATION: &[&str] = &[
    "Bachelors",
    "HS-grad",
    "11th",
    "Masters",
    "9th",
    "Some-college",
    "Assoc-acdm",
    "7th-8th",
    "Doctorate",
    "Assoc-voc",
    "Prof-school",
    "5th-6th",
    "10th",
    "Preschool",
    "12th",
    "1st-4th",
];

pub const MARITAL_STATUS: &[&str] = &[
    "Never-married",
    "Married-civ-spouse",
    "Divorced",
    "Married-spouse-absent",
    "Separated",
    "Married-AF-spouse",
    "Widowed",
];

pub const OCCUPATION: &[&str] = &[
    "Adm-clerical",
    "Exec-managerial",
    "Handlers-cleaners",
    "Prof-specialty",
    "Other-service",
    "Sales",
    "Transport-moving",
    "Farming-fishing",
    "Machine-op-inspct",
    "Tech-support",
    "Craft-repair",
    "Protective-serv",
    "Armed-Forces",
    "Priv-house-serv",
];

pub const RELATIONSHIP: &[&str] = &[
    "Not-in-family",
    "Husband",
    "Wife",
    "Own-child",
    "Unmarried",
    "Other-relative",
];

pub const RACE: &[&str] = &["White", "Black", "Asian-Pac-Islander", "Amer-Indian-Eskimo", "Other"];

pub const SEX: &[&str] = &["Male", "Female"];

pub const NATIVE_COUNTRY: &[&str] = &[
    "United-States",
    "Cuba",
    "Jamaica",
    "India",
    "Mexico",
    "Puerto-Rico",
    "Honduras",
    "England",
    "Canada",
    "Germany",
    "Iran",
    "Philippines",
    "Poland",
    "Columbia",
    "Cambodia",
    "Thailand",
    "Ecuador",
    "Laos",
    "Taiwan",
    "Haiti",
    "Portugal",
    "Dominican-Republic",
    "El-Salvador",
    "France",
    "Guatemala",
    "Italy",
    "China",
    "South",
    "Japan",
    "Yugoslavia",
    "Peru",
    "Outlying-US(Guam-USVI-etc)",
    "Scotland",
    "Trinadad&Tobago",
    "Greece",
    "Nicaragua",
    "Vietnam",
    "Hong",
    "Ireland",
    "Hungary",
    "Holand-Netherlands",
];

/// Closed vocabulary of a categorical column, keyed by its dataset column name
pub fn vocabulary(column: &str) -> Option<&'static [&'static str]> {
    match column {
        "workclass" => Some(WORKCLASS),
        "education" => Some(EDUCATION),
        "marital-status" => Some(MARITAL_STATUS),
        "occupation" => Some(OCCUPATION),
        "relationship" => Some(RELATIONSHIP),
        "race" => Some(RACE),
        "sex" => Some(SEX),
        "native-country" => Some(NATIVE_COUNTRY),
        _ => None,
    }
}

/// Whether `column` is one of the schema's feature columns
pub fn is_feature(column: &str) -> bool {
    CATEGORICAL_FEATURES.contains(&column) || NUMERICAL_FEATURES.contains(&column)
}
