//! Classification and regression metrics

use crate::error::{ModelError, Result};
use crate::preprocessing::variance;
use crate::training::Label;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

fn check_pairs(n_true: usize, n_pred: usize) -> Result<()> {
    if n_true != n_pred {
        return Err(ModelError::length_mismatch("predictions", n_true, n_pred));
    }
    if n_true == 0 {
        return Err(ModelError::DegenerateInput("no observations to evaluate".to_string()));
    }
    Ok(())
}

/// Counts of (actual, predicted) label pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix<L> {
    /// Labels in first-seen order over the true then predicted sequence
    labels: Vec<L>,
    /// `counts[actual][predicted]`, indexed like `labels`
    counts: Vec<Vec<usize>>,
}

impl<L: Label> ConfusionMatrix<L> {
    pub fn new(y_true: &[L], y_pred: &[L]) -> Result<Self> {
        check_pairs(y_true.len(), y_pred.len())?;

        let mut labels: Vec<L> = Vec::new();
        for label in y_true.iter().chain(y_pred.iter()) {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }

        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (actual, predicted) in y_true.iter().zip(y_pred.iter()) {
            if let (Some(a), Some(p)) = (
                labels.iter().position(|l| l == actual),
                labels.iter().position(|l| l == predicted),
            ) {
                counts[a][p] += 1;
            }
        }

        Ok(Self { labels, counts })
    }

    /// Observations of class `actual` predicted as `predicted`
    pub fn count(&self, actual: &L, predicted: &L) -> usize {
        match (self.index_of(actual), self.index_of(predicted)) {
            (Some(a), Some(p)) => self.counts[a][p],
            _ => 0,
        }
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Share of observations on the diagonal
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.labels.len()).map(|i| self.counts[i][i]).sum();
        correct as f64 / self.total() as f64
    }

    fn index_of(&self, label: &L) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

/// Fraction of predictions equal to the truth
pub fn accuracy<L: Label>(y_true: &[L], y_pred: &[L]) -> Result<f64> {
    check_pairs(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// (true positives, false positives, false negatives) for one class
fn positive_counts<L: Label>(
    y_true: &[L],
    y_pred: &[L],
    positive: &L,
) -> Result<(usize, usize, usize)> {
    check_pairs(y_true.len(), y_pred.len())?;
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        match (t == positive, p == positive) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    Ok((tp, fp, fn_))
}

fn ratio_or_zero(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// TP / (TP + FP); 0.0 when `positive` is never predicted
pub fn precision<L: Label>(y_true: &[L], y_pred: &[L], positive: &L) -> Result<f64> {
    let (tp, fp, _) = positive_counts(y_true, y_pred, positive)?;
    Ok(ratio_or_zero(tp, tp + fp))
}

/// TP / (TP + FN); 0.0 when `positive` never occurs
pub fn recall<L: Label>(y_true: &[L], y_pred: &[L], positive: &L) -> Result<f64> {
    let (tp, _, fn_) = positive_counts(y_true, y_pred, positive)?;
    Ok(ratio_or_zero(tp, tp + fn_))
}

/// Harmonic mean of precision and recall; 0.0 when both are 0
pub fn f1_score<L: Label>(y_true: &[L], y_pred: &[L], positive: &L) -> Result<f64> {
    let p = precision(y_true, y_pred, positive)?;
    let r = recall(y_true, y_pred, positive)?;
    if p + r == 0.0 {
        return Ok(0.0);
    }
    Ok(2.0 * p * r / (p + r))
}

/// Area under the ROC curve by pairwise comparison.
///
/// Counts every (positive, negative) pair: 1 when the positive scores
/// higher, 0.5 on a tie. Returns `None` when either class is absent.
pub fn roc_auc<L: Label>(y_true: &[L], scores: &[f64], positive: &L) -> Result<Option<f64>> {
    check_pairs(y_true.len(), scores.len())?;

    let (pos, neg): (Vec<(&L, &f64)>, Vec<(&L, &f64)>) =
        y_true.iter().zip(scores.iter()).partition(|(label, _)| *label == positive);
    if pos.is_empty() || neg.is_empty() {
        return Ok(None);
    }

    let mut wins = 0.0;
    for (_, &p) in &pos {
        for (_, &n) in &neg {
            if p > n {
                wins += 1.0;
            } else if p == n {
                wins += 0.5;
            }
        }
    }
    Ok(Some(wins / (pos.len() * neg.len()) as f64))
}

fn residuals(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Array1<f64>> {
    check_pairs(y_true.len(), y_pred.len())?;
    Ok(y_true - y_pred)
}

pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    let r = residuals(y_true, y_pred)?;
    Ok(r.mapv(f64::abs).sum() / r.len() as f64)
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    let r = residuals(y_true, y_pred)?;
    Ok(r.dot(&r) / r.len() as f64)
}

pub fn root_mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    mean_squared_error(y_true, y_pred).map(f64::sqrt)
}

/// Coefficient of determination; 0.0 when the truth has no variance
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    let r = residuals(y_true, y_pred)?;
    let ss_tot = variance(y_true.view())? * y_true.len() as f64;
    if ss_tot == 0.0 {
        return Ok(0.0);
    }
    Ok(1.0 - r.dot(&r) / ss_tot)
}

/// All regression metrics for one set of predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

pub fn regression_report(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<RegressionReport> {
    let mse = mean_squared_error(y_true, y_pred)?;
    Ok(RegressionReport {
        mae: mean_absolute_error(y_true, y_pred)?,
        mse,
        rmse: mse.sqrt(),
        r2: r2_score(y_true, y_pred)?,
    })
}
