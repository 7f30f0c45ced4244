//! Training configuration
//!
//! Every configurable model takes one of these structs. Defaults live in the
//! `Default` impls, and `validate` runs once in the model constructor.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Gradient descent settings for [`MultipleRegression`](super::MultipleRegression)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MultipleRegressionConfig {
    /// Step size applied to each gradient
    pub learning_rate: f64,
    /// Number of full-batch updates
    pub iterations: usize,
    /// Record the training loss every this many iterations
    pub history_interval: usize,
}

impl Default for MultipleRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            iterations: 1000,
            history_interval: 100,
        }
    }
}

impl MultipleRegressionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ModelError::invalid_parameter(
                "learning_rate",
                self.learning_rate,
                "must be finite and positive",
            ));
        }
        if self.iterations == 0 {
            return Err(ModelError::invalid_parameter(
                "iterations",
                self.iterations,
                "must be at least 1",
            ));
        }
        if self.history_interval == 0 {
            return Err(ModelError::invalid_parameter(
                "history_interval",
                self.history_interval,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Decision tree settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionTreeConfig {
    /// Maximum number of split levels below the root
    pub max_depth: usize,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

impl DecisionTreeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ModelError::invalid_parameter(
                "max_depth",
                self.max_depth,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Gaussian Naive Bayes settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NaiveBayesConfig {
    /// Added to every per-class variance
    pub var_smoothing: f64,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        Self { var_smoothing: 1e-9 }
    }
}

impl NaiveBayesConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.var_smoothing.is_finite() || self.var_smoothing < 0.0 {
            return Err(ModelError::invalid_parameter(
                "var_smoothing",
                self.var_smoothing,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// K-Nearest Neighbors settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnnConfig {
    /// Number of neighbors
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl KnnConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(ModelError::invalid_parameter("k", self.k, "must be at least 1"));
        }
        Ok(())
    }
}
