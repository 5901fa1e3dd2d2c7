//! Basic cleaning of the raw census dataset

use crate::error::{PipelineError, Result};
use crate::schema::{MISSING_MARKER, WEAK_COLUMNS};
use crate::utils::infer_column_types;
use polars::prelude::*;
use tracing::info;

/// Clean a raw census batch.
///
/// Replaces the missing-value marker with null, drops every row holding a
/// null, and drops the weak columns. Columns whose remaining values are all
/// numeric come back as numeric columns.
pub fn clean_data(raw: &DataFrame) -> Result<DataFrame> {
    let rows_before = raw.height();

    let columns: Vec<Column> = raw
        .get_columns()
        .iter()
        .map(|column| -> Result<Column> {
            let series = column.as_materialized_series();
            if series.dtype() != &DataType::String {
                return Ok(column.clone());
            }
            let values: Vec<Option<&str>> = series
                .str()?
                .into_iter()
                .map(|v| v.filter(|s| *s != MISSING_MARKER))
                .collect();
            Ok(Series::new(series.name().clone(), values).into())
        })
        .collect::<Result<_>>()?;

    let mut df = DataFrame::new(columns)?.drop_nulls::<String>(None)?;

    for column in WEAK_COLUMNS {
        df = df
            .drop(column)
            .map_err(|_| PipelineError::FeatureNotFound(column.to_string()))?;
    }

    let df = infer_column_types(&df)?;

    info!(
        rows_before,
        rows_after = df.height(),
        columns = df.width(),
        "Cleaned raw data"
    );

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_df() -> DataFrame {
        df!(
            "age" => &[39i64, 50, 38, 53],
            "workclass" => &["State-gov", "Self-emp-not-inc", "?", "Private"],
            "fnlgt" => &[77516i64, 83311, 215646, 234721],
            "capital-gain" => &[2174i64, 0, 0, 0],
            "capital-loss" => &[0i64, 0, 0, 0],
            "native-country" => &["United-States", "United-States", "United-States", "?"],
            "salary" => &["<=50K", "<=50K", "<=50K", "<=50K"]
        )
        .unwrap()
    }

    #[test]
    fn test_marker_rows_removed() {
        let cleaned = clean_data(&raw_df()).unwrap();
        assert_eq!(cleaned.height(), 2);

        for column in cleaned.get_columns() {
            let series = column.as_materialized_series();
            assert_eq!(series.null_count(), 0);
            if let Ok(ca) = series.str() {
                assert!(ca.into_iter().all(|v| v != Some(MISSING_MARKER)));
            }
        }
    }

    #[test]
    fn test_weak_columns_removed() {
        let cleaned = clean_data(&raw_df()).unwrap();
        let names: Vec<&str> = cleaned.get_column_names().iter().map(|s| s.as_str()).collect();
        for column in WEAK_COLUMNS {
            assert!(!names.contains(&column), "{} should be dropped", column);
        }
        assert_eq!(names, vec!["age", "workclass", "native-country", "salary"]);
    }

    #[test]
    fn test_missing_weak_column_is_an_error() {
        let raw = raw_df().drop("fnlgt").unwrap();
        let err = clean_data(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureNotFound(c) if c == "fnlgt"));
    }

    #[test]
    fn test_numeric_strings_become_numeric() {
        let raw = df!(
            "age" => &["39", "?", "41"],
            "fnlgt" => &[1i64, 2, 3],
            "capital-gain" => &[0i64, 0, 0],
            "capital-loss" => &[0i64, 0, 0]
        )
        .unwrap();

        let cleaned = clean_data(&raw).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(cleaned.column("age").unwrap().dtype(), &DataType::Int64);
    }
}
