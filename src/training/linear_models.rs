//! Linear model implementations

use super::config::MultipleRegressionConfig;
use super::{check_features, check_training_set, Regressor};
use crate::error::{ModelError, Result};
use crate::preprocessing::{mean, variance};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Single-feature linear regression fitted with the closed-form OLS estimator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted slope
    slope: Option<f64>,
    /// Fitted intercept
    intercept: Option<f64>,
}

impl LinearRegression {
    /// Create a new, unfitted model
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit slope and intercept to paired observations
    pub fn fit(&mut self, x: &Array1<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.len() != y.len() {
            return Err(ModelError::length_mismatch("y length", x.len(), y.len()));
        }
        if x.is_empty() {
            return Err(ModelError::DegenerateInput(
                "training set has no observations".to_string(),
            ));
        }

        if variance(x.view())? == 0.0 {
            return Err(ModelError::DegenerateInput(
                "feature has zero variance, slope is undefined".to_string(),
            ));
        }

        let x_mean = mean(x.view())?;
        let y_mean = mean(y.view())?;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            sxy += (xi - x_mean) * (yi - y_mean);
            sxx += (xi - x_mean).powi(2);
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        debug!(samples = x.len(), slope, intercept, "fitted linear regression");

        self.slope = Some(slope);
        self.intercept = Some(intercept);
        Ok(self)
    }

    /// Fit from a single-column feature matrix
    pub fn fit_matrix(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.ncols() != 1 {
            return Err(ModelError::length_mismatch("features", 1, x.ncols()));
        }
        let column = x.column(0).to_owned();
        self.fit(&column, y)
    }

    /// Predict the target for one feature value
    pub fn predict(&self, x: f64) -> Result<f64> {
        let (slope, intercept) = self.coefficients()?;
        Ok(slope * x + intercept)
    }

    /// Predict the target for every feature value
    pub fn predict_many(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        let (slope, intercept) = self.coefficients()?;
        Ok(x.mapv(|v| slope * v + intercept))
    }

    pub fn slope(&self) -> Option<f64> {
        self.slope
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    /// Coefficient of determination against a dataset
    pub fn r_squared(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<f64> {
        let residuals = self.residuals(x, y)?;
        let ss_tot = variance(y.view())? * y.len() as f64;
        if ss_tot == 0.0 {
            return Err(ModelError::DegenerateInput(
                "target has zero variance, R² is undefined".to_string(),
            ));
        }
        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        Ok(1.0 - ss_res / ss_tot)
    }

    /// Mean squared error against a dataset
    pub fn mse(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<f64> {
        let residuals = self.residuals(x, y)?;
        Ok(residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64)
    }

    /// Root mean squared error against a dataset
    pub fn rmse(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<f64> {
        self.mse(x, y).map(f64::sqrt)
    }

    fn coefficients(&self) -> Result<(f64, f64)> {
        match (self.slope, self.intercept) {
            (Some(slope), Some(intercept)) => Ok((slope, intercept)),
            _ => Err(ModelError::UntrainedModel),
        }
    }

    fn residuals(&self, x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
        if x.len() != y.len() {
            return Err(ModelError::length_mismatch("y length", x.len(), y.len()));
        }
        if x.is_empty() {
            return Err(ModelError::DegenerateInput(
                "evaluation set has no observations".to_string(),
            ));
        }
        Ok(y - &self.predict_many(x)?)
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.fit_matrix(x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        check_features(1, &features)?;
        LinearRegression::predict(self, features[0])
    }
}

/// One sampled point of the gradient descent loss curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingStep {
    /// Iteration whose predictions were scored
    pub iteration: usize,
    /// Mean squared error at that iteration
    pub mse: f64,
}

/// A fitted weight and the feature it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub index: usize,
    pub weight: f64,
}

/// Multi-feature linear regression trained by batch gradient descent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleRegression {
    config: MultipleRegressionConfig,
    weights: Option<Array1<f64>>,
    bias: f64,
    history: Vec<TrainingStep>,
}

impl Default for MultipleRegression {
    fn default() -> Self {
        Self {
            config: MultipleRegressionConfig::default(),
            weights: None,
            bias: 0.0,
            history: Vec::new(),
        }
    }
}

impl MultipleRegression {
    /// Create an unfitted model with a validated configuration
    pub fn new(config: MultipleRegressionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Result<Self> {
        self.config.learning_rate = learning_rate;
        self.config.validate()?;
        Ok(self)
    }

    /// Set the number of iterations
    pub fn with_iterations(mut self, iterations: usize) -> Result<Self> {
        self.config.iterations = iterations;
        self.config.validate()?;
        Ok(self)
    }

    pub fn config(&self) -> &MultipleRegressionConfig {
        &self.config
    }

    /// Fit weights and bias by gradient descent starting from zero
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_training_set(x, y.len())?;

        let n = x.nrows() as f64;
        let lr = self.config.learning_rate;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let mut history = Vec::new();

        for iteration in 0..self.config.iterations {
            let errors = x.dot(&weights) + bias - y;
            let loss = errors.dot(&errors) / n;

            if !loss.is_finite() {
                warn!(iteration, learning_rate = lr, "gradient descent diverged");
                return Err(ModelError::DegenerateInput(format!(
                    "gradient descent diverged at iteration {} (learning rate {})",
                    iteration, lr
                )));
            }

            if iteration % self.config.history_interval == 0 {
                trace!(iteration, mse = loss, "gradient descent progress");
                history.push(TrainingStep { iteration, mse: loss });
            }

            let weight_gradient = x.t().dot(&errors) / n;
            let bias_gradient = errors.sum() / n;

            weights.scaled_add(-lr, &weight_gradient);
            bias -= lr * bias_gradient;
        }

        let errors = x.dot(&weights) + bias - y;
        let final_loss = errors.dot(&errors) / n;
        if !final_loss.is_finite() {
            warn!(learning_rate = lr, "gradient descent diverged on the final update");
            return Err(ModelError::DegenerateInput(
                "gradient descent diverged on the final update".to_string(),
            ));
        }
        history.push(TrainingStep {
            iteration: self.config.iterations,
            mse: final_loss,
        });

        debug!(
            samples = x.nrows(),
            features = x.ncols(),
            iterations = self.config.iterations,
            mse = final_loss,
            "fitted multiple regression"
        );

        self.weights = Some(weights);
        self.bias = bias;
        self.history = history;
        Ok(self)
    }

    /// Predict the target for one feature vector
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        let weights = self.weights.as_ref().ok_or(ModelError::UntrainedModel)?;
        check_features(weights.len(), &features)?;
        Ok(features.dot(weights) + self.bias)
    }

    /// Fitted weights, one per feature
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn bias(&self) -> Option<f64> {
        self.weights.as_ref().map(|_| self.bias)
    }

    /// Sampled training loss
    pub fn history(&self) -> &[TrainingStep] {
        &self.history
    }

    /// Weights ordered by absolute magnitude, largest first
    pub fn feature_importance(&self) -> Result<Vec<FeatureWeight>> {
        let weights = self.weights.as_ref().ok_or(ModelError::UntrainedModel)?;
        let mut ranked: Vec<FeatureWeight> = weights
            .iter()
            .enumerate()
            .map(|(index, &weight)| FeatureWeight { index, weight })
            .collect();
        // stable: equal magnitudes keep feature order
        ranked.sort_by(|a, b| {
            b.weight
                .abs()
                .partial_cmp(&a.weight.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranked)
    }
}

impl Regressor for MultipleRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        MultipleRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        MultipleRegression::predict(self, features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ols_recovers_line() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        assert!((model.slope().unwrap() - 2.0).abs() < 1e-12);
        assert!(model.intercept().unwrap().abs() < 1e-12);
        assert!((model.predict(5.0).unwrap() - 10.0).abs() < 1e-12);
        assert!((model.r_squared(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!(model.mse(&x, &y).unwrap() < 1e-20);
    }

    #[test]
    fn test_ols_noise_free_lines() {
        for &(m, b) in &[(0.5, -3.0), (-1.25, 10.0), (3.0, 0.75)] {
            let x = array![-2.0, 0.0, 1.5, 3.0, 8.0, 11.0];
            let y = x.mapv(|v| m * v + b);
            let mut model = LinearRegression::new();
            model.fit(&x, &y).unwrap();
            assert!((model.slope().unwrap() - m).abs() < 1e-9);
            assert!((model.intercept().unwrap() - b).abs() < 1e-9);
            assert!((model.r_squared(&x, &y).unwrap() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ols_errors() {
        let model = LinearRegression::new();
        assert_eq!(model.predict(1.0).unwrap_err(), ModelError::UntrainedModel);

        let mut model = LinearRegression::new();
        let err = model.fit(&array![2.0, 2.0, 2.0], &array![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateInput(_)));

        let err = model.fit(&array![1.0, 2.0], &array![1.0]).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_ols_inexact_constant_feature() {
        // 0.1, 0.7 and 3.3 have no exact binary form, so their mean is off by an ulp
        for c in [0.1, 0.7, 3.3] {
            let mut model = LinearRegression::new();
            let err = model.fit(&array![c, c, c], &array![1.0, 2.0, 4.0]).unwrap_err();
            assert!(matches!(err, ModelError::DegenerateInput(_)), "x = {}", c);
            assert!(model.slope().is_none());
        }
    }

    #[test]
    fn test_ols_rmse() {
        let x = array![0.0, 1.0, 2.0];
        let y = array![1.0, 3.0, 5.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let shifted = array![2.0, 4.0, 6.0];
        assert!((model.mse(&x, &shifted).unwrap() - 1.0).abs() < 1e-12);
        assert!((model.rmse(&x, &shifted).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ols_as_regressor() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new();
        Regressor::fit(&mut model, &x, &y).unwrap();
        let prediction = Regressor::predict(&model, array![5.0].view()).unwrap();
        assert!((prediction - 10.0).abs() < 1e-12);

        let err = Regressor::predict(&model, array![5.0, 1.0].view()).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_gradient_descent_converges() {
        // y = 2*x1 - 1*x2 + 0.5
        let x = array![
            [0.0, 1.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0],
            [2.0, 2.0],
            [3.0, 1.0],
            [0.0, 2.0],
        ];
        let y: Array1<f64> = x.rows().into_iter().map(|r| 2.0 * r[0] - r[1] + 0.5).collect();

        let config = MultipleRegressionConfig {
            learning_rate: 0.05,
            iterations: 5000,
            history_interval: 100,
        };
        let mut model = MultipleRegression::new(config).unwrap();
        model.fit(&x, &y).unwrap();

        let weights = model.weights().unwrap();
        assert!((weights[0] - 2.0).abs() < 1e-3, "w0 = {}", weights[0]);
        assert!((weights[1] + 1.0).abs() < 1e-3, "w1 = {}", weights[1]);
        assert!((model.bias().unwrap() - 0.5).abs() < 1e-3);

        let prediction = model.predict(array![4.0, 3.0].view()).unwrap();
        assert!((prediction - 5.5).abs() < 1e-2);
    }

    #[test]
    fn test_gradient_descent_history() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 3.0];
        let config = MultipleRegressionConfig {
            learning_rate: 0.05,
            iterations: 250,
            history_interval: 100,
        };
        let mut model = MultipleRegression::new(config).unwrap();
        model.fit(&x, &y).unwrap();

        let iterations: Vec<usize> = model.history().iter().map(|s| s.iteration).collect();
        assert_eq!(iterations, vec![0, 100, 200, 250]);

        // Zero weights predict 0, so the first loss is mean(y^2)
        assert!((model.history()[0].mse - 14.0 / 3.0).abs() < 1e-12);
        let losses: Vec<f64> = model.history().iter().map(|s| s.mse).collect();
        assert!(losses.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_gradient_descent_divergence() {
        let x = array![[100.0], [200.0], [300.0]];
        let y = array![1.0, 2.0, 3.0];
        let config = MultipleRegressionConfig {
            learning_rate: 10.0,
            iterations: 1000,
            history_interval: 100,
        };
        let mut model = MultipleRegression::new(config).unwrap();
        let err = model.fit(&x, &y).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateInput(_)));
        assert!(model.weights().is_none());
    }

    #[test]
    fn test_predict_checks() {
        let model = MultipleRegression::default();
        assert_eq!(
            model.predict(array![1.0].view()).unwrap_err(),
            ModelError::UntrainedModel
        );

        let mut model = MultipleRegression::default();
        model.fit(&array![[1.0, 2.0], [2.0, 1.0]], &array![1.0, 2.0]).unwrap();
        assert!(matches!(
            model.predict(array![1.0].view()),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_feature_importance_order() {
        let mut model = MultipleRegression::default();
        model.weights = Some(array![0.5, -3.0, 0.5, 2.0]);

        let ranked: Vec<usize> = model
            .feature_importance()
            .unwrap()
            .into_iter()
            .map(|fw| fw.index)
            .collect();
        assert_eq!(ranked, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_invalid_config() {
        assert!(MultipleRegression::default().with_learning_rate(0.0).is_err());
        assert!(MultipleRegression::default().with_iterations(0).is_err());
    }
}
