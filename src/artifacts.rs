//! Persistence of the trained model and its fitted encoders
//!
//! A training run writes three JSON files into one directory; evaluation and
//! inference load them back read-only.

use crate::error::{PipelineError, Result};
use crate::preprocessing::{LabelBinarizer, OneHotEncoder};
use crate::training::RandomForest;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_FILE: &str = "model.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const BINARIZER_FILE: &str = "binarizer.json";

/// The artifact triple produced by one training run
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model: RandomForest,
    pub encoder: OneHotEncoder,
    pub binarizer: LabelBinarizer,
}

/// Directory holding `model.json`, `encoder.json` and `binarizer.json`
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.dir.join(ENCODER_FILE)
    }

    pub fn binarizer_path(&self) -> PathBuf {
        self.dir.join(BINARIZER_FILE)
    }

    /// Write all three artifacts, creating the directory if needed
    pub fn save(&self, artifacts: &Artifacts) -> Result<()> {
        if !artifacts.model.is_fitted()
            || !artifacts.encoder.is_fitted()
            || !artifacts.binarizer.is_fitted()
        {
            return Err(PipelineError::ModelNotFitted);
        }

        std::fs::create_dir_all(&self.dir)?;
        write_json(&self.model_path(), &artifacts.model)?;
        write_json(&self.encoder_path(), &artifacts.encoder)?;
        write_json(&self.binarizer_path(), &artifacts.binarizer)?;

        info!(dir = %self.dir.display(), "Saved model artifacts");
        Ok(())
    }

    /// Load all three artifacts; any missing or unreadable file is an error
    pub fn load(&self) -> Result<Artifacts> {
        let artifacts = Artifacts {
            model: read_json(&self.model_path())?,
            encoder: read_json(&self.encoder_path())?,
            binarizer: read_json(&self.binarizer_path())?,
        };

        info!(
            dir = %self.dir.display(),
            n_trees = artifacts.model.n_trees(),
            n_features = artifacts.model.n_features(),
            "Loaded model artifacts"
        );
        Ok(artifacts)
    }

    /// True when every artifact file is present
    pub fn exists(&self) -> bool {
        self.model_path().is_file() && self.encoder_path().is_file() && self.binarizer_path().is_file()
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let load_error = |reason: String| PipelineError::ArtifactLoad {
        path: path.display().to_string(),
        reason,
    };
    let json = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| load_error(e.to_string()))
}
