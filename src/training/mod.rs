//! Model training module
//!
//! Provides the trainable predictors of the toolkit:
//! - Linear regression (closed-form OLS, single feature)
//! - Multiple regression (batch gradient descent)
//! - Decision tree classifier (Gini impurity)
//! - Gaussian Naive Bayes
//! - K-Nearest Neighbors classifier
//!
//! Every model owns its fitted state exclusively. `fit` creates or replaces
//! that state, and prediction borrows it immutably.

mod config;
pub mod decision_tree;
pub mod knn;
pub mod linear_models;
pub mod naive_bayes;

pub use config::{DecisionTreeConfig, KnnConfig, MultipleRegressionConfig, NaiveBayesConfig};
pub use decision_tree::{DecisionTreeClassifier, TreeNode};
pub use knn::KnnClassifier;
pub use linear_models::{FeatureWeight, LinearRegression, MultipleRegression, TrainingStep};
pub use naive_bayes::{ClassStatistics, GaussianNaiveBayes};

use crate::error::{ModelError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use std::fmt::Debug;
use std::hash::Hash;

/// Bound for categorical labels (outcomes such as win/loss/push)
pub trait Label: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Label for T {}

/// A model predicting a continuous target
pub trait Regressor {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict the target for one feature vector
    fn predict(&self, features: ArrayView1<f64>) -> Result<f64>;

    /// Predict every row of `x`
    fn predict_batch(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict(row))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from_vec)
    }
}

/// A model predicting a categorical label
pub trait Classifier<L: Label> {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()>;

    /// Predict the label for one feature vector
    fn predict(&self, features: ArrayView1<f64>) -> Result<L>;

    /// Predict every row of `x`
    fn predict_batch(&self, x: &Array2<f64>) -> Result<Vec<L>> {
        x.rows().into_iter().map(|row| self.predict(row)).collect()
    }
}

/// A classifier that can report a probability per class
pub trait ProbabilisticClassifier<L: Label>: Classifier<L> {
    /// Probability of each training class, in training class order
    fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Vec<(L, f64)>>;
}

// Boxed models keep their capabilities, so ensembles can mix model types.

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        (**self).predict(features)
    }
}

impl<L: Label, C: Classifier<L> + ?Sized> Classifier<L> for Box<C> {
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        (**self).predict(features)
    }
}

impl<L: Label, C: ProbabilisticClassifier<L> + ?Sized> ProbabilisticClassifier<L> for Box<C> {
    fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Vec<(L, f64)>> {
        (**self).predict_proba(features)
    }
}

/// Validate a training set: non-empty, at least one feature, `n_targets` rows
pub(crate) fn check_training_set(x: &Array2<f64>, n_targets: usize) -> Result<()> {
    if x.nrows() != n_targets {
        return Err(ModelError::length_mismatch("targets", x.nrows(), n_targets));
    }
    if x.nrows() == 0 {
        return Err(ModelError::DegenerateInput(
            "training set has no observations".to_string(),
        ));
    }
    if x.ncols() == 0 {
        return Err(ModelError::DegenerateInput(
            "training set has no features".to_string(),
        ));
    }
    Ok(())
}

/// Validate the length of a feature vector at predict time
pub(crate) fn check_features(expected: usize, features: &ArrayView1<f64>) -> Result<()> {
    if features.len() != expected {
        return Err(ModelError::length_mismatch("features", expected, features.len()));
    }
    Ok(())
}

/// Count labels, keeping the order in which each label is first encountered
pub(crate) fn label_counts<'a, L, I>(labels: I) -> Vec<(&'a L, usize)>
where
    L: Label + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let mut counts: Vec<(&'a L, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
}

/// Most frequent label; ties go to the label encountered first
pub(crate) fn majority_label<'a, L, I>(labels: I) -> Option<L>
where
    L: Label + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let mut best: Option<(&L, usize)> = None;
    for (label, count) in label_counts(labels) {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone())
}

/// Distinct labels in first-seen order
pub(crate) fn distinct_labels<L: Label>(labels: &[L]) -> Vec<L> {
    label_counts(labels)
        .into_iter()
        .map(|(label, _)| label.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_majority_tie_goes_to_first_seen() {
        let labels = ["loss", "win", "win", "loss"];
        assert_eq!(majority_label(labels.iter()), Some("loss"));

        let labels = ["push", "win", "win"];
        assert_eq!(majority_label(labels.iter()), Some("win"));

        let empty: [i64; 0] = [];
        assert_eq!(majority_label(empty.iter()), None);
    }

    #[test]
    fn test_distinct_labels_order() {
        assert_eq!(distinct_labels(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn test_check_training_set() {
        let x = array![[1.0], [2.0]];
        assert!(check_training_set(&x, 2).is_ok());
        assert!(matches!(
            check_training_set(&x, 3),
            Err(ModelError::DimensionMismatch { .. })
        ));

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            check_training_set(&empty, 0),
            Err(ModelError::DegenerateInput(_))
        ));
    }
}
