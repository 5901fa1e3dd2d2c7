//! Feature processing: record batch to feature matrix and labels
//!
//! Two entry points share one matrix-assembly core:
//! - [`process_fit`] fits a fresh encoder and binarizer (training)
//! - [`process_apply`] reuses fitted ones (evaluation and inference)
//!
//! The matrix layout is `[one-hot block in encoder order | numerical columns
//! in the given order]`, rows in input order.

use super::encoder::string_values;
use super::{LabelBinarizer, OneHotEncoder};
use crate::error::{PipelineError, Result};
use ndarray::{concatenate, Array1, Array2, Axis};
use polars::prelude::*;
use tracing::debug;

/// Output of [`process_apply`]
#[derive(Debug, Clone)]
pub struct ProcessedData {
    pub features: Array2<f64>,
    /// `None` when the batch carries no label column
    pub labels: Option<Array1<f64>>,
}

/// Output of [`process_fit`]
#[derive(Debug, Clone)]
pub struct FittedFeatures {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
    pub encoder: OneHotEncoder,
    pub binarizer: LabelBinarizer,
}

/// Fit a new encoder and binarizer on `df` and process it
pub fn process_fit(
    df: &DataFrame,
    categorical: &[&str],
    numerical: &[&str],
) -> Result<FittedFeatures> {
    let label_column = find_label_column(df, categorical, numerical)?.ok_or_else(|| {
        PipelineError::MissingLabel("training data has no label column".to_string())
    })?;

    let mut encoder = OneHotEncoder::new();
    encoder.fit(df, categorical)?;

    let labels = label_values(df, &label_column)?;
    let mut binarizer = LabelBinarizer::new();
    binarizer.fit(&labels)?;

    let features = assemble_features(df, numerical, &encoder)?;
    let labels = binarizer.encode(&labels)?;

    debug!(
        rows = features.nrows(),
        cols = features.ncols(),
        label = %label_column,
        classes = binarizer.n_classes(),
        "Fitted feature processor"
    );

    Ok(FittedFeatures {
        features,
        labels,
        encoder,
        binarizer,
    })
}

/// Process `df` with a previously fitted encoder and binarizer.
///
/// A batch without a label column (plain inference) yields `labels: None`.
/// Any other label problem, such as a label value unseen during fitting, is
/// an error.
pub fn process_apply(
    df: &DataFrame,
    categorical: &[&str],
    numerical: &[&str],
    encoder: &OneHotEncoder,
    binarizer: &LabelBinarizer,
) -> Result<ProcessedData> {
    if encoder.columns().iter().map(String::as_str).ne(categorical.iter().copied()) {
        return Err(PipelineError::ShapeError {
            expected: format!("categorical columns {:?}", encoder.columns()),
            actual: format!("{:?}", categorical),
        });
    }

    let features = assemble_features(df, numerical, encoder)?;

    let labels = match find_label_column(df, categorical, numerical)? {
        Some(label_column) => {
            let values = label_values(df, &label_column)?;
            Some(binarizer.encode(&values)?)
        }
        None => None,
    };

    Ok(ProcessedData { features, labels })
}

fn assemble_features(
    df: &DataFrame,
    numerical: &[&str],
    encoder: &OneHotEncoder,
) -> Result<Array2<f64>> {
    let categorical_block = encoder.transform(df)?;
    let numerical_block = numeric_block(df, numerical)?;
    Ok(concatenate(
        Axis(1),
        &[categorical_block.view(), numerical_block.view()],
    )?)
}

fn numeric_block(df: &DataFrame, numerical: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let mut out = Array2::zeros((n_rows, numerical.len()));

    for (j, col_name) in numerical.iter().enumerate() {
        let column = df
            .column(col_name)
            .map_err(|_| PipelineError::FeatureNotFound(col_name.to_string()))?;
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        for (i, value) in series.f64()?.into_iter().enumerate() {
            out[[i, j]] = value.ok_or_else(|| {
                PipelineError::DataError(format!(
                    "Missing or non-numeric value in column '{}' at row {}",
                    col_name, i
                ))
            })?;
        }
    }

    Ok(out)
}

/// The single column that is neither categorical nor numerical, if any
fn find_label_column(
    df: &DataFrame,
    categorical: &[&str],
    numerical: &[&str],
) -> Result<Option<String>> {
    let rest: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| !categorical.contains(&name.as_str()) && !numerical.contains(&name.as_str()))
        .collect();

    match rest.len() {
        0 => Ok(None),
        1 => Ok(rest.into_iter().next()),
        _ => Err(PipelineError::DataError(format!(
            "Expected a single label column, found {:?}",
            rest
        ))),
    }
}

fn label_values(df: &DataFrame, label_column: &str) -> Result<Vec<String>> {
    string_values(df, label_column)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                PipelineError::DataError(format!("Null label in '{}' at row {}", label_column, i))
            })
        })
        .collect()
}
