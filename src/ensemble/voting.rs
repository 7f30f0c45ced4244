//! Voting and averaging ensembles

use crate::error::{ModelError, Result};
use crate::training::{majority_label, Classifier, Label, Regressor};
use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

fn check_members(n_models: usize) -> Result<()> {
    if n_models == 0 {
        return Err(ModelError::invalid_parameter(
            "models",
            n_models,
            "at least one model is required",
        ));
    }
    Ok(())
}

fn check_weights(weights: &[f64], n_models: usize) -> Result<()> {
    if weights.len() != n_models {
        return Err(ModelError::invalid_parameter(
            "weights",
            weights.len(),
            &format!("expected one weight per model ({})", n_models),
        ));
    }
    if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ModelError::invalid_parameter(
            "weights",
            bad,
            "weights must be finite and non-negative",
        ));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(ModelError::invalid_parameter(
            "weights",
            total,
            "weights must sum to more than 0",
        ));
    }
    Ok(())
}

/// Most common prediction across classifiers; ties go to the label
/// predicted first in model order
pub fn majority_vote<L, M>(models: &[M], features: ArrayView1<f64>) -> Result<L>
where
    L: Label,
    M: Classifier<L>,
{
    check_members(models.len())?;
    let predictions = models
        .iter()
        .map(|m| m.predict(features))
        .collect::<Result<Vec<L>>>()?;
    majority_label(predictions.iter())
        .ok_or_else(|| ModelError::DegenerateInput("no predictions to vote on".to_string()))
}

/// Unweighted mean of the regressors' predictions
pub fn average<M: Regressor>(models: &[M], features: ArrayView1<f64>) -> Result<f64> {
    check_members(models.len())?;
    let mut sum = 0.0;
    for model in models {
        sum += model.predict(features)?;
    }
    Ok(sum / models.len() as f64)
}

/// Σ wᵢ·pᵢ / Σ wᵢ over the regressors' predictions
pub fn weighted_average<M: Regressor>(
    models: &[M],
    weights: &[f64],
    features: ArrayView1<f64>,
) -> Result<f64> {
    check_members(models.len())?;
    check_weights(weights, models.len())?;

    let mut weighted = 0.0;
    for (model, &w) in models.iter().zip(weights.iter()) {
        weighted += w * model.predict(features)?;
    }
    Ok(weighted / weights.iter().sum::<f64>())
}

/// Hard-voting classifier that owns its members
#[derive(Debug, Clone)]
pub struct VotingClassifier<M> {
    models: Vec<M>,
}

impl<M> VotingClassifier<M> {
    pub fn new(models: Vec<M>) -> Result<Self> {
        check_members(models.len())?;
        Ok(Self { models })
    }

    pub fn models(&self) -> &[M] {
        &self.models
    }
}

impl<L: Label, M: Classifier<L>> Classifier<L> for VotingClassifier<M> {
    /// Fit every member on the full training set
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        for model in &mut self.models {
            model.fit(x, y)?;
        }
        debug!(members = self.models.len(), samples = x.nrows(), "fitted voting classifier");
        Ok(())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        majority_vote(&self.models, features)
    }
}

/// Averaging regressor that owns its members, optionally weighted
#[derive(Debug, Clone)]
pub struct AveragingRegressor<M> {
    models: Vec<M>,
    weights: Option<Vec<f64>>,
}

impl<M> AveragingRegressor<M> {
    pub fn new(models: Vec<M>) -> Result<Self> {
        check_members(models.len())?;
        Ok(Self {
            models,
            weights: None,
        })
    }

    /// Weight each member's prediction
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        check_weights(&weights, self.models.len())?;
        self.weights = Some(weights);
        Ok(self)
    }

    pub fn models(&self) -> &[M] {
        &self.models
    }
}

impl<M: Regressor> Regressor for AveragingRegressor<M> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        for model in &mut self.models {
            model.fit(x, y)?;
        }
        debug!(members = self.models.len(), samples = x.nrows(), "fitted averaging regressor");
        Ok(())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        match &self.weights {
            Some(weights) => weighted_average(&self.models, weights, features),
            None => average(&self.models, features),
        }
    }
}
