//! Naive Bayes classifiers
//!
//! Implements Gaussian Naive Bayes for continuous features.

use super::config::NaiveBayesConfig;
use super::{
    check_features, check_training_set, distinct_labels, Classifier, Label,
    ProbabilisticClassifier,
};
use crate::error::{ModelError, Result};
use crate::preprocessing::{mean, variance};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Fitted statistics of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    /// Empirical class frequency
    pub prior: f64,
    /// Mean of each feature within the class
    pub means: Vec<f64>,
    /// Variance of each feature within the class (smoothing included)
    pub variances: Vec<f64>,
}

/// Gaussian Naive Bayes Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes<L> {
    config: NaiveBayesConfig,
    /// Classes in training order
    classes: Vec<L>,
    /// Statistics, parallel to `classes`
    statistics: Vec<ClassStatistics>,
    n_features: usize,
}

impl<L: Label> Default for GaussianNaiveBayes<L> {
    fn default() -> Self {
        Self {
            config: NaiveBayesConfig::default(),
            classes: Vec::new(),
            statistics: Vec::new(),
            n_features: 0,
        }
    }
}

impl<L: Label> GaussianNaiveBayes<L> {
    pub fn new(config: NaiveBayesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Set variance smoothing parameter
    pub fn with_var_smoothing(mut self, smoothing: f64) -> Result<Self> {
        self.config.var_smoothing = smoothing;
        self.config.validate()?;
        Ok(self)
    }

    /// Fit the classifier
    pub fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<&mut Self> {
        check_training_set(x, y.len())?;

        let n_samples = x.nrows() as f64;
        let n_features = x.ncols();
        let classes = distinct_labels(y);
        let mut statistics = Vec::with_capacity(classes.len());

        for class in &classes {
            let rows: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, label)| *label == class)
                .map(|(i, _)| i)
                .collect();
            let n_class = rows.len() as f64;
            let class_rows = x.select(Axis(0), &rows);

            let mut means = Vec::with_capacity(n_features);
            let mut variances = Vec::with_capacity(n_features);
            for (j, column) in class_rows.axis_iter(Axis(1)).enumerate() {
                let var = variance(column)? + self.config.var_smoothing;
                if var <= 0.0 {
                    return Err(ModelError::DegenerateInput(format!(
                        "feature {} has zero variance within class {:?}",
                        j, class
                    )));
                }
                means.push(mean(column)?);
                variances.push(var);
            }

            statistics.push(ClassStatistics {
                prior: n_class / n_samples,
                means,
                variances,
            });
        }

        debug!(
            samples = x.nrows(),
            features = n_features,
            classes = classes.len(),
            "fitted gaussian naive bayes"
        );

        self.classes = classes;
        self.statistics = statistics;
        self.n_features = n_features;
        Ok(self)
    }

    /// Predict the class with the largest joint log-likelihood
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        let scores = self.joint_log_likelihood(features)?;
        let mut best = 0;
        for (idx, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = idx;
            }
        }
        Ok(self.classes[best].clone())
    }

    /// Posterior probability of each class, normalised to sum to 1
    pub fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Vec<(L, f64)>> {
        let scores = self.joint_log_likelihood(features)?;

        // Shift by the max before exponentiating so tiny likelihoods do not underflow
        let max_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = scores.iter().map(|s| (s - max_score).exp()).collect();
        let total: f64 = weights.iter().sum();

        Ok(self
            .classes
            .iter()
            .cloned()
            .zip(weights.into_iter().map(|w| w / total))
            .collect())
    }

    /// ln P(class) + Σ ln N(x_j | μ, σ²) for every class
    fn joint_log_likelihood(&self, features: ArrayView1<f64>) -> Result<Vec<f64>> {
        if self.classes.is_empty() {
            return Err(ModelError::UntrainedModel);
        }
        check_features(self.n_features, &features)?;

        Ok(self
            .statistics
            .iter()
            .map(|stats| {
                let log_likelihood: f64 = features
                    .iter()
                    .zip(stats.means.iter().zip(stats.variances.iter()))
                    .map(|(&xi, (&mean, &var))| {
                        -0.5 * ((xi - mean).powi(2) / var + var.ln() + (2.0 * PI).ln())
                    })
                    .sum();
                stats.prior.ln() + log_likelihood
            })
            .collect())
    }

    /// Classes in training order
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Prior probability of a class
    pub fn class_prior(&self, class: &L) -> Option<f64> {
        self.class_statistics(class).map(|stats| stats.prior)
    }

    /// Fitted statistics of a class
    pub fn class_statistics(&self, class: &L) -> Option<&ClassStatistics> {
        self.classes
            .iter()
            .position(|c| c == class)
            .map(|idx| &self.statistics[idx])
    }
}

impl<L: Label> Classifier<L> for GaussianNaiveBayes<L> {
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        GaussianNaiveBayes::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        GaussianNaiveBayes::predict(self, features)
    }
}

impl<L: Label> ProbabilisticClassifier<L> for GaussianNaiveBayes<L> {
    fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Vec<(L, f64)>> {
        GaussianNaiveBayes::predict_proba(self, features)
    }
}
