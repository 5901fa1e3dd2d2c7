//! One-hot encoding of categorical columns

use crate::error::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One-hot encoder over a fixed, ordered set of categorical columns.
///
/// Categories of each column are kept sorted, so the indicator layout is
/// `[column 0 categories..., column 1 categories..., ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    is_fitted: bool,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    /// Create a new, unfitted encoder
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the categories of `columns` from the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        let mut categories = Vec::with_capacity(columns.len());

        for col_name in columns {
            let values = string_values(df, col_name)?;
            let mut seen: Vec<String> = values
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        PipelineError::DataError(format!("Null value in column '{}'", col_name))
                    })
                })
                .collect::<Result<_>>()?;
            seen.sort_unstable();
            seen.dedup();
            categories.push(seen);
        }

        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.categories = categories;
        self.is_fitted = true;
        Ok(self)
    }

    /// Encode the fitted columns of `df` into a dense indicator matrix.
    ///
    /// A value not seen during fitting is an error, never an all-zero row.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.n_output_features()));
        let mut offset = 0;

        for (col_name, categories) in self.columns.iter().zip(&self.categories) {
            let values = string_values(df, col_name)?;
            for (row, value) in values.iter().enumerate() {
                let value = value.as_deref().ok_or_else(|| {
                    PipelineError::DataError(format!("Null value in column '{}'", col_name))
                })?;
                let position = categories
                    .binary_search_by(|c| c.as_str().cmp(value))
                    .map_err(|_| PipelineError::UnseenCategory {
                        column: col_name.clone(),
                        value: value.to_string(),
                    })?;
                out[[row, offset + position]] = 1.0;
            }
            offset += categories.len();
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Columns the encoder was fitted on, in output order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Categories learned for `column`
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.categories[idx].as_slice())
    }

    /// Width of the indicator block
    pub fn n_output_features(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Output column names, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |cat| format!("{}_{}", col, cat)))
            .collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Read a column as optional strings, casting non-string columns
pub(crate) fn string_values(df: &DataFrame, col_name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(col_name)
        .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}
