//! Classification metrics
//!
//! Binary metrics treat class `1` as the positive label. Precision and recall
//! are defined as 1.0 when their denominator is zero.

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Confusion-matrix based metrics for a binary classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub n_samples: usize,
}

impl ClassificationMetrics {
    /// Compute all metrics from true and predicted class indices
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let counts = ConfusionCounts::from_labels(y_true, y_pred)?;
        Ok(Self {
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1_score: counts.f1(),
            n_samples: y_true.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ConfusionCounts {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl ConfusionCounts {
    fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (is_positive(t)?, is_positive(p)?) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / self.total() as f64
    }

    fn precision(&self) -> f64 {
        ratio_or_one(self.tp, self.tp + self.fp)
    }

    fn recall(&self) -> f64 {
        ratio_or_one(self.tp, self.tp + self.fn_)
    }

    fn f1(&self) -> f64 {
        ratio_or_one(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }
}

fn ratio_or_one(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn is_positive(label: f64) -> Result<bool> {
    if label == 0.0 {
        Ok(false)
    } else if label == 1.0 {
        Ok(true)
    } else {
        Err(PipelineError::MetricError(format!(
            "Binary metric got label {}, expected 0 or 1",
            label
        )))
    }
}

fn check_lengths(a: &Array1<f64>, b: &Array1<f64>) -> Result<()> {
    if a.len() != b.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("{} values", a.len()),
            actual: format!("{} values", b.len()),
        });
    }
    Ok(())
}

/// Fraction of exact matches; works for any number of classes
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    if y_true.is_empty() {
        return Err(PipelineError::MetricError(
            "Accuracy of an empty batch".to_string(),
        ));
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// tp / (tp + fp), 1.0 when nothing is predicted positive
pub fn precision(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    Ok(ConfusionCounts::from_labels(y_true, y_pred)?.precision())
}

/// tp / (tp + fn), 1.0 when there are no positives
pub fn recall(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    Ok(ConfusionCounts::from_labels(y_true, y_pred)?.recall())
}

/// Harmonic mean of precision and recall
pub fn f1_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    Ok(ConfusionCounts::from_labels(y_true, y_pred)?.f1())
}

/// Area under the ROC curve from positive-class scores.
///
/// Computed as the Mann-Whitney statistic with average ranks for ties.
/// Undefined, and an error, when `y_true` holds a single class.
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, scores)?;

    let positives: Vec<bool> = y_true.iter().map(|&t| is_positive(t)).collect::<Result<_>>()?;
    let n_pos = positives.iter().filter(|&&p| p).count();
    let n_neg = positives.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(PipelineError::MetricError(
            "ROC AUC is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average 1-based rank of each tie group
    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let average_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = average_rank;
        }
        start = end;
    }

    let positive_rank_sum: f64 = ranks
        .iter()
        .zip(&positives)
        .filter(|(_, p)| **p)
        .map(|(r, _)| r)
        .sum();
    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;

    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}
