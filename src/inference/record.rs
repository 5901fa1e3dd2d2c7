//! Request record for single-row inference

use crate::error::{PipelineError, Result};
use crate::schema::vocabulary;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One census record as received by the inference endpoint.
///
/// Field names use underscores; [`CensusRecord::to_batch`] maps them to the
/// hyphenated dataset column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusRecord {
    pub workclass: String,
    pub education: String,
    pub marital_status: String,
    pub occupation: String,
    pub relationship: String,
    pub race: String,
    pub sex: String,
    pub native_country: String,
    pub age: i64,
    pub education_num: i64,
    pub hours_per_week: i64,
}

impl CensusRecord {
    /// (dataset column, value) of every categorical field, in schema order
    fn categorical_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("workclass", self.workclass.as_str()),
            ("education", self.education.as_str()),
            ("marital-status", self.marital_status.as_str()),
            ("occupation", self.occupation.as_str()),
            ("relationship", self.relationship.as_str()),
            ("race", self.race.as_str()),
            ("sex", self.sex.as_str()),
            ("native-country", self.native_country.as_str()),
        ]
    }

    /// Reject any categorical value outside its closed vocabulary
    pub fn validate(&self) -> Result<()> {
        for (column, value) in self.categorical_fields() {
            let allowed = vocabulary(column)
                .ok_or_else(|| PipelineError::FeatureNotFound(column.to_string()))?;
            if !allowed.contains(&value) {
                return Err(PipelineError::SchemaViolation {
                    field: column.replace('-', "_"),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// One-row batch with the dataset's column names and no label column
    pub fn to_batch(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = self
            .categorical_fields()
            .iter()
            .map(|(column, value)| Column::new((*column).into(), &[*value]))
            .collect();

        columns.push(Column::new("age".into(), &[self.age]));
        columns.push(Column::new("education-num".into(), &[self.education_num]));
        columns.push(Column::new("hours-per-week".into(), &[self.hours_per_week]));

        Ok(DataFrame::new(columns)?)
    }
}
