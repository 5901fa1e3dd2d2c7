//! Pipeline configuration
//!
//! Defaults match the project's directory layout; every path can be moved
//! through an environment variable and then through CLI flags.

use crate::error::{PipelineError, Result};
use crate::training::{Scoring, TrainerConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_RAW_DATA: &str = "data/raw_data/raw_census.csv";
pub const DEFAULT_CLEAN_DATA: &str = "data/clean_data/clean_census.csv";
pub const DEFAULT_MODEL_DIR: &str = "model";
pub const DEFAULT_SLICE_REPORT: &str = "model/slice_metrics.txt";

/// Paths and settings shared by every pipeline action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw census CSV read by cleaning
    pub raw_data: PathBuf,
    /// Clean CSV written by cleaning, read by training and slice scoring
    pub clean_data: PathBuf,
    /// Directory of the model, encoder and binarizer artifacts
    pub model_dir: PathBuf,
    /// Slice metrics text file
    pub slice_report: PathBuf,
    /// Fraction of clean rows held out for validation
    pub test_size: f64,
    /// Seed of the train/validation split
    pub split_seed: u64,
    /// Cross-validation scorings logged during training
    pub scorings: Vec<Scoring>,
    /// Forest hyperparameters
    pub trainer: TrainerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data: env_path("CENSUS_RAW_DATA", DEFAULT_RAW_DATA),
            clean_data: env_path("CENSUS_CLEAN_DATA", DEFAULT_CLEAN_DATA),
            model_dir: env_path("CENSUS_MODEL_DIR", DEFAULT_MODEL_DIR),
            slice_report: env_path("CENSUS_SLICE_REPORT", DEFAULT_SLICE_REPORT),
            test_size: 0.2,
            split_seed: 42,
            scorings: vec![Scoring::Accuracy, Scoring::RocAuc, Scoring::F1],
            trainer: TrainerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults rooted under `dir` instead of the working directory
    pub fn rooted_at(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            raw_data: dir.join(DEFAULT_RAW_DATA),
            clean_data: dir.join(DEFAULT_CLEAN_DATA),
            model_dir: dir.join(DEFAULT_MODEL_DIR),
            slice_report: dir.join(DEFAULT_SLICE_REPORT),
            ..Self::default()
        }
    }

    pub fn with_raw_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_data = path.into();
        self
    }

    pub fn with_clean_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.clean_data = path.into();
        self
    }

    pub fn with_model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_dir = path.into();
        self
    }

    pub fn with_slice_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.slice_report = path.into();
        self
    }

    pub fn with_trainer(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }

    /// Parse comma separated scoring names, e.g. `accuracy,roc_auc,f1`
    pub fn with_scorings(mut self, names: &str) -> Result<Self> {
        self.scorings = names
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .collect::<Result<_>>()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::DataError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.trainer.n_estimators == 0 {
            return Err(PipelineError::TrainingError(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
