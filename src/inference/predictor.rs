//! Single-record prediction with the persisted artifacts

use super::CensusRecord;
use crate::artifacts::{ArtifactStore, Artifacts};
use crate::error::{PipelineError, Result};
use crate::preprocessing::{process_apply, LabelBinarizer, OneHotEncoder};
use crate::schema::{CATEGORICAL_FEATURES, NUMERICAL_FEATURES};
use crate::training::RandomForest;
use polars::prelude::DataFrame;
use tracing::debug;

/// Read-only bundle of model, encoder and binarizer
#[derive(Debug, Clone)]
pub struct Predictor {
    model: RandomForest,
    encoder: OneHotEncoder,
    binarizer: LabelBinarizer,
}

impl Predictor {
    pub fn new(artifacts: Artifacts) -> Self {
        Self {
            model: artifacts.model,
            encoder: artifacts.encoder,
            binarizer: artifacts.binarizer,
        }
    }

    /// Load the artifact triple from `store`
    pub fn from_store(store: &ArtifactStore) -> Result<Self> {
        Ok(Self::new(store.load()?))
    }

    /// Predict the label of one record.
    ///
    /// The record is validated first, so an out-of-vocabulary value never
    /// reaches the model.
    pub fn predict_one(&self, record: &CensusRecord) -> Result<String> {
        record.validate()?;
        let label = single_prediction(self.predict_batch(&record.to_batch()?)?)?;
        debug!(prediction = %label, "Predicted single record");
        Ok(label)
    }

    /// Predict labels for a batch of unlabeled or labeled rows
    pub fn predict_batch(&self, batch: &DataFrame) -> Result<Vec<String>> {
        let processed = process_apply(
            batch,
            &CATEGORICAL_FEATURES,
            &NUMERICAL_FEATURES,
            &self.encoder,
            &self.binarizer,
        )?;
        let predictions = self.model.predict(&processed.features)?;
        self.binarizer.inverse_transform(&predictions)
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }

    pub fn binarizer(&self) -> &LabelBinarizer {
        &self.binarizer
    }
}

/// The one label of a one-row batch
fn single_prediction(mut labels: Vec<String>) -> Result<String> {
    match (labels.pop(), labels.len()) {
        (Some(label), 0) => Ok(label),
        (last, rest) => Err(PipelineError::ShapeError {
            expected: "1 prediction".to_string(),
            actual: format!("{} predictions", rest + usize::from(last.is_some())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prediction() {
        assert_eq!(single_prediction(vec![">50K".to_string()]).unwrap(), ">50K");
    }

    #[test]
    fn test_empty_prediction_batch_is_error() {
        let err = single_prediction(Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeError { ref actual, .. } if actual == "0 predictions"));
    }

    #[test]
    fn test_extra_predictions_are_error() {
        let labels = vec!["<=50K".to_string(), ">50K".to_string()];
        let err = single_prediction(labels).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeError { ref actual, .. } if actual == "2 predictions"));
    }
}
