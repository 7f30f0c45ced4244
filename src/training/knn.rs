//! K-Nearest Neighbors implementation

use super::config::KnnConfig;
use super::{
    check_features, check_training_set, distinct_labels, label_counts, majority_label,
    Classifier, Label, ProbabilisticClassifier,
};
use crate::error::{ModelError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// K-Nearest Neighbors Classifier
///
/// Training only retains the observations; all work happens at predict time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier<L> {
    config: KnnConfig,
    x_train: Option<Array2<f64>>,
    y_train: Vec<L>,
    /// Distinct labels in training order
    classes: Vec<L>,
}

impl<L: Label> Default for KnnClassifier<L> {
    fn default() -> Self {
        Self {
            config: KnnConfig::default(),
            x_train: None,
            y_train: Vec::new(),
            classes: Vec::new(),
        }
    }
}

impl<L: Label> KnnClassifier<L> {
    pub fn new(config: KnnConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Create with default config and specified k
    pub fn with_k(k: usize) -> Result<Self> {
        Self::new(KnnConfig { k })
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Fit the classifier (stores training data)
    pub fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<&mut Self> {
        check_training_set(x, y.len())?;
        debug!(
            samples = x.nrows(),
            features = x.ncols(),
            k = self.config.k,
            "stored knn training set"
        );
        self.x_train = Some(x.clone());
        self.y_train = y.to_vec();
        self.classes = distinct_labels(y);
        Ok(self)
    }

    /// Majority label among the k nearest stored observations
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        let neighbors = self.nearest(features)?;
        majority_label(neighbors.iter().map(|&i| &self.y_train[i])).ok_or_else(|| {
            ModelError::DegenerateInput("no neighbors available".to_string())
        })
    }

    /// Vote share of every training class among the k nearest observations,
    /// in training class order. Classes without a vote get 0.0.
    pub fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Vec<(L, f64)>> {
        let neighbors = self.nearest(features)?;
        let k = neighbors.len() as f64;
        let votes = label_counts(neighbors.iter().map(|&i| &self.y_train[i]));
        Ok(self
            .classes
            .iter()
            .map(|class| {
                let count = votes
                    .iter()
                    .find(|(label, _)| *label == class)
                    .map_or(0, |&(_, count)| count);
                (class.clone(), count as f64 / k)
            })
            .collect())
    }

    /// Classes in training order
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Indices of the k closest training rows; equal distances keep training order
    fn nearest(&self, features: ArrayView1<f64>) -> Result<Vec<usize>> {
        let x_train = self.x_train.as_ref().ok_or(ModelError::UntrainedModel)?;
        check_features(x_train.ncols(), &features)?;

        let mut distances: Vec<(usize, f64)> = x_train
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| (i, euclidean_distance(row, features)))
            .collect();
        // sort_by is stable, so ties stay in training order
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let k = self.config.k;
        if k > distances.len() {
            warn!(k, samples = distances.len(), "k exceeds training size, using every observation");
        }

        Ok(distances.into_iter().take(k).map(|(i, _)| i).collect())
    }
}

/// Euclidean (L2) distance
fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

impl<L: Label> Classifier<L> for KnnClassifier<L> {
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        KnnClassifier::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        KnnClassifier::predict(self, features)
    }
}

impl<L: Label> ProbabilisticClassifier<L> for KnnClassifier<L> {
    fn predict_proba(&self, features: ArrayView1<f64>) -> Result<Vec<(L, f64)>> {
        KnnClassifier::predict_proba(self, features)
    }
}
