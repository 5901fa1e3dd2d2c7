//! Model training with cross-validated scoring

use super::cross_validation::{CVResults, CrossValidator};
use super::decision_tree::Criterion;
use super::metrics;
use super::random_forest::RandomForest;
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

/// Scoring rule for cross-validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    Accuracy,
    RocAuc,
    F1,
    Precision,
    Recall,
}

impl Scoring {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scoring::Accuracy => "accuracy",
            Scoring::RocAuc => "roc_auc",
            Scoring::F1 => "f1",
            Scoring::Precision => "precision",
            Scoring::Recall => "recall",
        }
    }

    /// Score a fitted model on held-out rows
    pub fn score(&self, model: &RandomForest, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        match self {
            Scoring::RocAuc => metrics::roc_auc(y, &model.positive_scores(x)?),
            Scoring::Accuracy => metrics::accuracy(y, &model.predict(x)?),
            Scoring::F1 => metrics::f1_score(y, &model.predict(x)?),
            Scoring::Precision => metrics::precision(y, &model.predict(x)?),
            Scoring::Recall => metrics::recall(y, &model.predict(x)?),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scoring {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accuracy" => Ok(Scoring::Accuracy),
            "roc_auc" => Ok(Scoring::RocAuc),
            "f1" => Ok(Scoring::F1),
            "precision" => Ok(Scoring::Precision),
            "recall" => Ok(Scoring::Recall),
            other => Err(PipelineError::UnsupportedMetric(other.to_string())),
        }
    }
}

/// Forest hyperparameters and cross-validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub criterion: Criterion,
    pub random_state: u64,
    pub cv_folds: usize,
    pub cv_seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 5,
            criterion: Criterion::Entropy,
            random_state: 42,
            cv_folds: 10,
            cv_seed: 42,
        }
    }
}

impl TrainerConfig {
    /// An unfitted forest with these hyperparameters
    pub fn build_forest(&self) -> RandomForest {
        RandomForest::new(self.n_estimators)
            .with_max_depth(self.max_depth)
            .with_criterion(self.criterion)
            .with_random_state(self.random_state)
    }

    pub fn cross_validator(&self) -> CrossValidator {
        CrossValidator::new(self.cv_folds)
            .with_shuffle(true)
            .with_random_state(self.cv_seed)
    }
}

/// Cross-validate `forest`'s hyperparameters.
///
/// Each fold fits one fresh forest and scores it with every requested rule.
pub fn cross_validate(
    forest: &RandomForest,
    x: &Array2<f64>,
    y: &Array1<f64>,
    cv: &CrossValidator,
    scorings: &[Scoring],
) -> Result<BTreeMap<Scoring, CVResults>> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }

    debug!(folds = cv.n_splits(), metrics = scorings.len(), "Cross-validating forest");

    let mut fold_scores: BTreeMap<Scoring, Vec<f64>> =
        scorings.iter().map(|&s| (s, Vec::new())).collect();

    for split in cv.split(x.nrows())? {
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test = y.select(Axis(0), &split.test_indices);

        let mut model = forest.unfitted();
        model.fit(&x_train, &y_train)?;

        for (scoring, scores) in fold_scores.iter_mut() {
            let score = scoring.score(&model, &x_test, &y_test)?;
            debug!(fold = split.fold_idx, metric = %scoring, score, "Fold scored");
            scores.push(score);
        }
    }

    Ok(fold_scores
        .into_iter()
        .map(|(scoring, scores)| (scoring, CVResults::from_scores(scores)))
        .collect())
}

/// Train the census classifier.
///
/// Logs a cross-validation score summary for each requested scoring, then
/// fits and returns a forest on all of `x`. The cross-validation never
/// influences the returned model.
pub fn train_model(x: &Array2<f64>, y: &Array1<f64>, scorings: &[Scoring]) -> Result<RandomForest> {
    train_model_with(&TrainerConfig::default(), x, y, scorings)
}

/// [`train_model`] with explicit hyperparameters
pub fn train_model_with(
    config: &TrainerConfig,
    x: &Array2<f64>,
    y: &Array1<f64>,
    scorings: &[Scoring],
) -> Result<RandomForest> {
    let forest = config.build_forest();

    if !scorings.is_empty() {
        let start = Instant::now();
        let results = cross_validate(&forest, x, y, &config.cross_validator(), scorings)?;
        for (scoring, result) in &results {
            info!(
                metric = %scoring,
                mean = result.mean_score,
                std = result.std_score,
                folds = result.n_folds,
                "Cross-validation score"
            );
        }
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Cross-validation finished");
    }

    let start = Instant::now();
    let mut model = forest;
    model.fit(x, y)?;
    info!(
        n_trees = model.n_trees(),
        n_samples = x.nrows(),
        n_features = x.ncols(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Trained random forest"
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_data() -> (Array2<f64>, Array1<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let v = i as f64;
            rows.extend_from_slice(&[v, (i % 3) as f64]);
            labels.push(if i >= 20 { 1.0 } else { 0.0 });
        }
        (
            Array2::from_shape_vec((40, 2), rows).unwrap(),
            Array1::from_vec(labels),
        )
    }

    fn small_config() -> TrainerConfig {
        TrainerConfig {
            n_estimators: 10,
            cv_folds: 4,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_scoring_parse() {
        assert_eq!("accuracy".parse::<Scoring>().unwrap(), Scoring::Accuracy);
        assert_eq!("roc_auc".parse::<Scoring>().unwrap(), Scoring::RocAuc);
        assert_eq!("F1".parse::<Scoring>().unwrap(), Scoring::F1);
        assert!(matches!(
            "log_loss".parse::<Scoring>(),
            Err(PipelineError::UnsupportedMetric(_))
        ));
        assert_eq!(Scoring::RocAuc.to_string(), "roc_auc");
    }

    #[test]
    fn test_default_hyperparameters() {
        let forest = TrainerConfig::default().build_forest();
        assert_eq!(forest.n_estimators, 200);
        assert_eq!(forest.max_depth, Some(5));
        assert_eq!(forest.criterion, Criterion::Entropy);
        assert_eq!(forest.random_state, Some(42));
    }

    #[test]
    fn test_cross_validate_scores_every_metric() {
        let (x, y) = toy_data();
        let config = small_config();
        let results = cross_validate(
            &config.build_forest(),
            &x,
            &y,
            &config.cross_validator(),
            &[Scoring::Accuracy, Scoring::RocAuc, Scoring::F1],
        )
        .unwrap();

        assert_eq!(results.len(), 3);
        for result in results.values() {
            assert_eq!(result.n_folds, 4);
            assert!(result.mean_score > 0.8, "mean {}", result.mean_score);
        }
    }

    #[test]
    fn test_train_model_fits_on_all_rows() {
        let (x, y) = toy_data();
        let model = train_model_with(&small_config(), &x, &y, &[Scoring::Accuracy]).unwrap();

        assert_eq!(model.n_trees(), 10);
        let predictions = model.predict(&array![[2.0, 0.0], [37.0, 1.0]]).unwrap();
        assert_eq!(predictions.to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_roc_auc_on_single_class_fold_is_an_error() {
        let x = Array2::from_shape_vec((8, 1), (0..8).map(f64::from).collect()).unwrap();
        let y = Array1::from_elem(8, 1.0);
        let config = small_config();

        let err = cross_validate(
            &config.build_forest(),
            &x,
            &y,
            &config.cross_validator(),
            &[Scoring::RocAuc],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::MetricError(_)));
    }
}
