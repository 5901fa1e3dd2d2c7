//! Data loading utilities

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// CSV loader for census data files
pub struct DataLoader {
    /// Strip whitespace following each delimiter (headers and cells)
    skip_initial_space: bool,
    /// Rows used by polars for schema inference
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            skip_initial_space: true,
            infer_schema_length: 1000,
        }
    }

    /// Enable or disable whitespace stripping after delimiters
    pub fn with_skip_initial_space(mut self, skip: bool) -> Self {
        self.skip_initial_space = skip;
        self
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PipelineError::DataError(format!("{}: {}", path.display(), e))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()?;

        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");

        if self.skip_initial_space {
            strip_whitespace(&df)
        } else {
            Ok(df)
        }
    }
}

/// Writer counterpart of [`DataLoader`]
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV, creating parent directories as needed
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).finish(df)?;

        debug!(path = %path.display(), rows = df.height(), "Saved CSV");
        Ok(())
    }
}

/// Trim column names and string cells, then re-infer column types.
///
/// Columns such as `" 39"` are read as strings when the file uses `", "` as
/// delimiter; once trimmed they become numeric again.
pub fn strip_whitespace(df: &DataFrame) -> Result<DataFrame> {
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|column| -> Result<Column> {
            let series = column.as_materialized_series();
            let name: PlSmallStr = series.name().trim().into();
            if series.dtype() != &DataType::String {
                return Ok(series.clone().with_name(name).into());
            }
            let values: Vec<Option<String>> = series
                .str()?
                .into_iter()
                .map(|v| v.map(|s| s.trim().to_string()))
                .collect();
            Ok(infer_series(name, values).into())
        })
        .collect::<Result<_>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Re-infer every string column as integer or float where all values parse
pub fn infer_column_types(df: &DataFrame) -> Result<DataFrame> {
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .map(|column| -> Result<Column> {
            let series = column.as_materialized_series();
            if series.dtype() != &DataType::String {
                return Ok(column.clone());
            }
            let values: Vec<Option<String>> = series
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            Ok(infer_series(series.name().clone(), values).into())
        })
        .collect::<Result<_>>()?;

    Ok(DataFrame::new(columns)?)
}

fn infer_series(name: PlSmallStr, values: Vec<Option<String>>) -> Series {
    if values.iter().all(Option::is_none) {
        return Series::new(name, values);
    }

    if values.iter().flatten().all(|s| s.parse::<i64>().is_ok()) {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
            .collect();
        return Series::new(name, ints);
    }

    if values.iter().flatten().all(|s| s.parse::<f64>().is_ok()) {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
            .collect();
        return Series::new(name, floats);
    }

    Series::new(name, values)
}

/// Shuffle rows with a seeded RNG and split off `test_size` of them.
///
/// The test part holds `ceil(n * test_size)` rows. Both parts must be non-empty.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::DataError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_samples = df.height();
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PipelineError::DataError(format!(
            "Cannot split {} rows with test_size {}",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n_samples as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_spaced_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "age, workclass, hours-per-week").unwrap();
        writeln!(file, "39, State-gov, 40").unwrap();
        writeln!(file, "50, Self-emp-not-inc, 13").unwrap();
        writeln!(file, "38, ?, 40").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv_strips_initial_space() {
        let file = create_spaced_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["age", "workclass", "hours-per-week"]);

        let workclass = df.column("workclass").unwrap().as_materialized_series().clone();
        let values: Vec<Option<&str>> = workclass.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("State-gov"), Some("Self-emp-not-inc"), Some("?")]);

        let hours = df.column("hours-per-week").unwrap();
        assert_eq!(hours.dtype(), &DataType::Int64);
    }

    #[test]
    fn test_load_csv_keeps_spaces_when_disabled() {
        let file = create_spaced_csv();
        let df = DataLoader::new()
            .with_skip_initial_space(false)
            .with_infer_schema_length(2)
            .load_csv(file.path())
            .unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["age", " workclass", " hours-per-week"]);

        let workclass = df.column(" workclass").unwrap().as_materialized_series().clone();
        assert_eq!(workclass.str().unwrap().get(0), Some(" State-gov"));
    }

    #[test]
    fn test_save_csv_roundtrip() {
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1i64, 2, 3]),
            Column::new("b".into(), &["x", "y", "z"]),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        DataSaver::save_csv(&mut df, &path).unwrap();

        let loaded = DataLoader::new().load_csv(&path).unwrap();
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.width(), 2);
    }

    #[test]
    fn test_infer_column_types() {
        let df = DataFrame::new(vec![
            Column::new("n".into(), &["1", "2"]),
            Column::new("f".into(), &["1.5", "2"]),
            Column::new("s".into(), &["a", "1"]),
        ])
        .unwrap();

        let inferred = infer_column_types(&df).unwrap();
        assert_eq!(inferred.column("n").unwrap().dtype(), &DataType::Int64);
        assert_eq!(inferred.column("f").unwrap().dtype(), &DataType::Float64);
        assert_eq!(inferred.column("s").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_train_test_split_sizes() {
        let values: Vec<i64> = (0..10).collect();
        let df = DataFrame::new(vec![Column::new("v".into(), &values)]).unwrap();

        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();
        assert_eq!(train.height(), 8);
        assert_eq!(test.height(), 2);

        let mut all: Vec<i64> = train
            .column("v").unwrap().as_materialized_series().i64().unwrap().into_no_null_iter()
            .chain(test.column("v").unwrap().as_materialized_series().i64().unwrap().into_no_null_iter())
            .collect();
        all.sort_unstable();
        assert_eq!(all, values);
    }

    #[test]
    fn test_train_test_split_is_seeded() {
        let values: Vec<i64> = (0..50).collect();
        let df = DataFrame::new(vec![Column::new("v".into(), &values)]).unwrap();

        let (_, a) = train_test_split(&df, 0.2, 7).unwrap();
        let (_, b) = train_test_split(&df, 0.2, 7).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_train_test_split_rejects_bad_size() {
        let df = DataFrame::new(vec![Column::new("v".into(), &[1i64, 2])]).unwrap();
        assert!(train_test_split(&df, 0.0, 1).is_err());
        assert!(train_test_split(&df, 1.5, 1).is_err());
    }
}
