//! Model performance on data slices
//!
//! A slice is the subset of validation rows sharing one value of one
//! categorical column. Every (column, value) pair gets its own accuracy,
//! recall and precision.

use crate::error::{PipelineError, Result};
use crate::preprocessing::{process_apply, string_values, LabelBinarizer, OneHotEncoder};
use crate::schema::{CATEGORICAL_FEATURES, NUMERICAL_FEATURES};
use crate::training::{ClassificationMetrics, RandomForest};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Metrics of one slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceMetrics {
    pub column: String,
    pub value: String,
    pub n_samples: usize,
    pub accuracy: f64,
    pub recall: f64,
    pub precision: f64,
}

impl fmt::Display for SliceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} - {}], Accuracy={:.3}, Recall={:.3}, Precision={:.3}",
            self.column, self.value, self.accuracy, self.recall, self.precision
        )
    }
}

/// Slice metrics over the census categorical columns
pub fn evaluate_slices(
    validation: &DataFrame,
    model: &RandomForest,
    encoder: &OneHotEncoder,
    binarizer: &LabelBinarizer,
) -> Result<Vec<SliceMetrics>> {
    evaluate_slices_with(
        validation,
        &CATEGORICAL_FEATURES,
        &NUMERICAL_FEATURES,
        model,
        encoder,
        binarizer,
    )
}

/// Slice metrics over explicit feature lists.
///
/// Columns are visited in `categorical` order and values in the order they
/// first appear in `validation`. The validation batch must carry labels.
pub fn evaluate_slices_with(
    validation: &DataFrame,
    categorical: &[&str],
    numerical: &[&str],
    model: &RandomForest,
    encoder: &OneHotEncoder,
    binarizer: &LabelBinarizer,
) -> Result<Vec<SliceMetrics>> {
    let mut slices = Vec::new();

    for &column in categorical {
        let values = string_values(validation, column)?;

        for value in distinct_in_order(&values) {
            let mask: BooleanChunked = values
                .iter()
                .map(|v| v.as_deref() == Some(value))
                .collect();
            let subset = validation.filter(&mask)?;

            let processed = process_apply(&subset, categorical, numerical, encoder, binarizer)?;
            let y_true = processed.labels.ok_or_else(|| {
                PipelineError::MissingLabel("validation data has no label column".to_string())
            })?;
            let y_pred = model.predict(&processed.features)?;
            let metrics = ClassificationMetrics::compute(&y_true, &y_pred)?;

            let slice = SliceMetrics {
                column: column.to_string(),
                value: value.to_string(),
                n_samples: subset.height(),
                accuracy: metrics.accuracy,
                recall: metrics.recall,
                precision: metrics.precision,
            };
            info!("{}", slice);
            slices.push(slice);
        }
    }

    Ok(slices)
}

fn distinct_in_order(values: &[Option<String>]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|v| seen.insert(*v))
        .collect()
}

/// Write one line per slice, overwriting `path`
pub fn write_slice_report(path: impl AsRef<Path>, slices: &[SliceMetrics]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for slice in slices {
        writeln!(writer, "{}", slice)?;
    }
    writer.flush()?;

    info!(path = %path.display(), slices = slices.len(), "Wrote slice report");
    Ok(())
}
