//! Pipeline actions: cleaning, training and slice scoring

use crate::artifacts::{ArtifactStore, Artifacts};
use crate::cleaning::clean_data;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::evaluation::{evaluate_slices, write_slice_report, SliceMetrics};
use crate::preprocessing::process_fit;
use crate::schema::{is_feature, CATEGORICAL_FEATURES, LABEL_COLUMN, NUMERICAL_FEATURES};
use crate::training::train_model_with;
use crate::utils::{train_test_split, DataLoader, DataSaver};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// A pipeline stage selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    BasicCleaning,
    Training,
    Inference,
    /// All three stages in order
    Combo,
}

impl Action {
    fn runs_cleaning(&self) -> bool {
        matches!(self, Action::BasicCleaning | Action::Combo)
    }

    fn runs_training(&self) -> bool {
        matches!(self, Action::Training | Action::Combo)
    }

    fn runs_inference(&self) -> bool {
        matches!(self, Action::Inference | Action::Combo)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::BasicCleaning => "basic_cleaning",
            Action::Training => "training",
            Action::Inference => "inference",
            Action::Combo => "combo",
        };
        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic_cleaning" => Ok(Action::BasicCleaning),
            "training" | "train_test_model" => Ok(Action::Training),
            "inference" => Ok(Action::Inference),
            "combo" => Ok(Action::Combo),
            other => Err(PipelineError::DataError(format!("Unknown action '{}'", other))),
        }
    }
}

/// Run the stages selected by `action`, in pipeline order
pub fn execute(action: Action, config: &PipelineConfig) -> Result<()> {
    config.validate()?;

    if action.runs_cleaning() {
        info!("Start basic data cleaning");
        run_cleaning(config)?;
    }

    if action.runs_training() {
        info!("Model training procedure start");
        run_training(config)?;
    }

    if action.runs_inference() {
        info!("Model inference procedure start");
        run_inference(config)?;
    }

    Ok(())
}

/// Raw CSV to clean CSV
pub fn run_cleaning(config: &PipelineConfig) -> Result<DataFrame> {
    let raw = DataLoader::new().load_csv(&config.raw_data)?;
    let mut clean = clean_data(&raw)?;
    DataSaver::save_csv(&mut clean, &config.clean_data)?;
    info!(path = %config.clean_data.display(), rows = clean.height(), "Saved clean data");
    Ok(clean)
}

/// Fit the processor and the forest on the training split and persist the artifacts
pub fn run_training(config: &PipelineConfig) -> Result<Artifacts> {
    let clean = load_model_columns(config)?;
    let (train, _) = train_test_split(&clean, config.test_size, config.split_seed)?;

    let fitted = process_fit(&train, &CATEGORICAL_FEATURES, &NUMERICAL_FEATURES)?;
    let model = train_model_with(
        &config.trainer,
        &fitted.features,
        &fitted.labels,
        &config.scorings,
    )?;

    let artifacts = Artifacts {
        model,
        encoder: fitted.encoder,
        binarizer: fitted.binarizer,
    };
    ArtifactStore::new(&config.model_dir).save(&artifacts)?;
    Ok(artifacts)
}

/// Score the persisted model on every slice of the validation split
pub fn run_inference(config: &PipelineConfig) -> Result<Vec<SliceMetrics>> {
    let clean = load_model_columns(config)?;
    let (_, validation) = train_test_split(&clean, config.test_size, config.split_seed)?;

    let artifacts = ArtifactStore::new(&config.model_dir).load()?;
    let slices = evaluate_slices(
        &validation,
        &artifacts.model,
        &artifacts.encoder,
        &artifacts.binarizer,
    )?;
    write_slice_report(&config.slice_report, &slices)?;
    Ok(slices)
}

/// Clean data restricted to the feature columns and the label
fn load_model_columns(config: &PipelineConfig) -> Result<DataFrame> {
    let clean = DataLoader::new().load_csv(&config.clean_data)?;
    if clean.column(LABEL_COLUMN).is_err() {
        return Err(PipelineError::MissingLabel(format!(
            "'{}' not found in {}",
            LABEL_COLUMN,
            config.clean_data.display()
        )));
    }

    let keep: Vec<PlSmallStr> = clean
        .get_column_names()
        .into_iter()
        .filter(|name| is_feature(name.as_str()) || name.as_str() == LABEL_COLUMN)
        .cloned()
        .collect();
    Ok(clean.select(keep)?)
}
