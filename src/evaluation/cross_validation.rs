//! K-fold cross-validation

use super::metrics::{accuracy, r2_score};
use crate::error::{ModelError, Result};
use crate::preprocessing::{mean, std_dev};
use crate::training::{check_training_set, Classifier, Label, Regressor};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A single train/test split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldSplit {
    pub fold_idx: usize,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Contiguous, unshuffled k-fold splitter.
///
/// Fold `i` tests on rows `i * size .. (i + 1) * size` with
/// `size = n / folds`. Rows past `folds * size` are never tested but are
/// part of every training set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFold {
    folds: usize,
}

impl KFold {
    pub fn new(folds: usize) -> Result<Self> {
        if folds < 2 {
            return Err(ModelError::invalid_parameter("folds", folds, "must be at least 2"));
        }
        Ok(Self { folds })
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Generate train/test splits over `n_samples` rows
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if n_samples < self.folds {
            return Err(ModelError::DegenerateInput(format!(
                "n_samples ({}) must be >= folds ({})",
                n_samples, self.folds
            )));
        }

        let fold_size = n_samples / self.folds;
        Ok((0..self.folds)
            .map(|fold_idx| {
                let test_start = fold_idx * fold_size;
                let test_end = test_start + fold_size;
                FoldSplit {
                    fold_idx,
                    train_indices: (0..test_start).chain(test_end..n_samples).collect(),
                    test_indices: (test_start..test_end).collect(),
                }
            })
            .collect())
    }
}

/// Per-fold scores with their mean and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub fold_scores: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
}

impl CrossValidationReport {
    fn from_scores(fold_scores: Vec<f64>) -> Result<Self> {
        let scores = Array1::from(fold_scores);
        Ok(Self {
            mean: mean(scores.view())?,
            std_dev: std_dev(scores.view())?,
            fold_scores: scores.to_vec(),
        })
    }
}

/// Train a fresh classifier per fold and score it by accuracy
pub fn cross_validate<M, F, L>(
    factory: F,
    x: &Array2<f64>,
    y: &[L],
    folds: usize,
) -> Result<CrossValidationReport>
where
    F: Fn() -> M,
    M: Classifier<L>,
    L: Label,
{
    check_training_set(x, y.len())?;
    let splits = KFold::new(folds)?.split(x.nrows())?;

    let mut scores = Vec::with_capacity(splits.len());
    for split in &splits {
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train: Vec<L> = split.train_indices.iter().map(|&i| y[i].clone()).collect();
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test: Vec<L> = split.test_indices.iter().map(|&i| y[i].clone()).collect();

        let mut model = factory();
        model.fit(&x_train, &y_train)?;
        let predictions = model.predict_batch(&x_test)?;
        let score = accuracy(&y_test, &predictions)?;
        trace!(fold = split.fold_idx, score, "scored fold");
        scores.push(score);
    }

    let report = CrossValidationReport::from_scores(scores)?;
    debug!(folds, mean = report.mean, std_dev = report.std_dev, "cross-validated classifier");
    Ok(report)
}

/// Train a fresh regressor per fold and score it by R²
pub fn cross_validate_regressor<M, F>(
    factory: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    folds: usize,
) -> Result<CrossValidationReport>
where
    F: Fn() -> M,
    M: Regressor,
{
    check_training_set(x, y.len())?;
    let splits = KFold::new(folds)?.split(x.nrows())?;

    let mut scores = Vec::with_capacity(splits.len());
    for split in &splits {
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = y.select(Axis(0), &split.train_indices);
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test = y.select(Axis(0), &split.test_indices);

        let mut model = factory();
        model.fit(&x_train, &y_train)?;
        let predictions = model.predict_batch(&x_test)?;
        let score = r2_score(&y_test, &predictions)?;
        trace!(fold = split.fold_idx, score, "scored fold");
        scores.push(score);
    }

    let report = CrossValidationReport::from_scores(scores)?;
    debug!(folds, mean = report.mean, std_dev = report.std_dev, "cross-validated regressor");
    Ok(report)
}
