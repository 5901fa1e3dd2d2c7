//! Label binarization

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Maps a finite set of label strings to classifier targets and back.
///
/// Classes are kept sorted. With two classes `classes[0]` maps to 0 and
/// `classes[1]` to 1; with more, each label maps to a one-hot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBinarizer {
    classes: Vec<String>,
    is_fitted: bool,
}

impl Default for LabelBinarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelBinarizer {
    /// Create a new, unfitted binarizer
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the label vocabulary
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<&mut Self> {
        if labels.is_empty() {
            return Err(PipelineError::DataError(
                "Cannot fit a label binarizer on zero labels".to_string(),
            ));
        }

        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort_unstable();
        classes.dedup();

        self.classes = classes;
        self.is_fitted = true;
        Ok(self)
    }

    /// Binarized targets: one column for up to two classes, one column per class otherwise
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array2<f64>> {
        let indices = self.class_indices(labels)?;

        if self.classes.len() <= 2 {
            let column: Vec<f64> = indices.iter().map(|&i| i as f64).collect();
            return Ok(Array2::from_shape_vec((labels.len(), 1), column)?);
        }

        let mut out = Array2::zeros((labels.len(), self.classes.len()));
        for (row, &idx) in indices.iter().enumerate() {
            out[[row, idx]] = 1.0;
        }
        Ok(out)
    }

    /// Class index of each label, the target the forest trains on.
    ///
    /// For two classes this equals the binarized column.
    pub fn encode<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<f64>> {
        let indices = self.class_indices(labels)?;
        Ok(indices.into_iter().map(|i| i as f64).collect())
    }

    /// Map predictions back to label strings
    pub fn inverse_transform(&self, y: &Array1<f64>) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        y.iter()
            .map(|&v| {
                let idx = if self.classes.len() <= 2 {
                    usize::from(v > 0.5)
                } else {
                    v.round() as usize
                };
                self.classes.get(idx).cloned().ok_or_else(|| {
                    PipelineError::DataError(format!("Prediction {} has no matching class", v))
                })
            })
            .collect()
    }

    /// Sorted label vocabulary
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn class_indices<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.classes
                    .binary_search_by(|c| c.as_str().cmp(label))
                    .map_err(|_| PipelineError::UnseenLabel(label.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_binary_labels() {
        let mut lb = LabelBinarizer::new();
        lb.fit(&["<=50K", ">50K", "<=50K"]).unwrap();

        assert_eq!(lb.classes(), ["<=50K", ">50K"]);
        let y = lb.transform(&[">50K", "<=50K"]).unwrap();
        assert_eq!(y.shape(), &[2, 1]);
        assert_eq!(y.column(0).to_vec(), vec![1.0, 0.0]);

        let labels = lb.inverse_transform(&array![0.0, 1.0]).unwrap();
        assert_eq!(labels, vec!["<=50K", ">50K"]);
    }

    #[test]
    fn test_multiclass_labels() {
        let mut lb = LabelBinarizer::new();
        lb.fit(&["b", "a", "c"]).unwrap();

        let y = lb.transform(&["c", "a"]).unwrap();
        assert_eq!(y.shape(), &[2, 3]);
        assert_eq!(y.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(lb.encode(&["c", "a"]).unwrap().to_vec(), vec![2.0, 0.0]);
        assert_eq!(lb.inverse_transform(&array![1.0]).unwrap(), vec!["b"]);
    }

    #[test]
    fn test_unseen_label() {
        let mut lb = LabelBinarizer::new();
        lb.fit(&["no", "yes"]).unwrap();
        assert!(matches!(lb.encode(&["maybe"]), Err(PipelineError::UnseenLabel(_))));
    }

    #[test]
    fn test_unfitted() {
        let lb = LabelBinarizer::new();
        assert!(matches!(lb.transform(&["x"]), Err(PipelineError::ModelNotFitted)));
        assert!(LabelBinarizer::new().fit::<&str>(&[]).is_err());
    }
}
