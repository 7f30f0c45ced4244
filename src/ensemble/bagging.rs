//! Bootstrap aggregating

use crate::error::{ModelError, Result};
use crate::training::{
    check_features, check_training_set, majority_label, Classifier, Label, Regressor,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for bagging ensembles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BaggingConfig {
    /// Number of models trained on independent resamples
    pub n_estimators: usize,
    /// Seed for `fit`; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for BaggingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            seed: None,
        }
    }
}

impl BaggingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ModelError::invalid_parameter(
                "n_estimators",
                self.n_estimators,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// `n` row indices drawn uniformly with replacement
fn bootstrap_indices<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Bagging regressor: mean prediction of models fitted on bootstrap resamples
///
/// A member whose fit rejects its resample fails the whole fit, and the
/// previously fitted estimators are kept. On small training sets a
/// resample can repeat a single row, which a [`LinearRegression`] member
/// rejects as a zero-variance feature even though the full data fits.
///
/// [`LinearRegression`]: crate::training::LinearRegression
pub struct BaggingRegressor<F, M> {
    config: BaggingConfig,
    factory: F,
    estimators: Vec<M>,
    n_features: usize,
}

impl<F, M: std::fmt::Debug> std::fmt::Debug for BaggingRegressor<F, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaggingRegressor")
            .field("config", &self.config)
            .field("estimators", &self.estimators)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl<F, M> BaggingRegressor<F, M>
where
    F: Fn() -> M,
    M: Regressor,
{
    pub fn new(config: BaggingConfig, factory: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            factory,
            estimators: Vec::new(),
            n_features: 0,
        })
    }

    /// Fit with a generator seeded from the config
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let mut rng = self.config.rng();
        self.fit_with_rng(x, y, &mut rng)
    }

    /// Fit every estimator on its own resample drawn from `rng`
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rng: &mut R,
    ) -> Result<&mut Self> {
        check_training_set(x, y.len())?;
        let n = x.nrows();

        let mut estimators = Vec::with_capacity(self.config.n_estimators);
        for _ in 0..self.config.n_estimators {
            let indices = bootstrap_indices(n, rng);
            let mut model = (self.factory)();
            model.fit(&x.select(Axis(0), &indices), &y.select(Axis(0), &indices))?;
            estimators.push(model);
        }

        debug!(estimators = estimators.len(), samples = n, "fitted bagging regressor");
        self.estimators = estimators;
        self.n_features = x.ncols();
        Ok(self)
    }

    /// Mean of the estimators' predictions
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        if self.estimators.is_empty() {
            return Err(ModelError::UntrainedModel);
        }
        check_features(self.n_features, &features)?;

        let mut sum = 0.0;
        for model in &self.estimators {
            sum += model.predict(features)?;
        }
        Ok(sum / self.estimators.len() as f64)
    }

    pub fn estimators(&self) -> &[M] {
        &self.estimators
    }
}

impl<F, M> Regressor for BaggingRegressor<F, M>
where
    F: Fn() -> M,
    M: Regressor,
{
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        BaggingRegressor::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        BaggingRegressor::predict(self, features)
    }
}

/// Bagging classifier: majority vote of models fitted on bootstrap resamples
pub struct BaggingClassifier<F, M> {
    config: BaggingConfig,
    factory: F,
    estimators: Vec<M>,
    n_features: usize,
}

impl<F, M> BaggingClassifier<F, M> {
    pub fn new(config: BaggingConfig, factory: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            factory,
            estimators: Vec::new(),
            n_features: 0,
        })
    }

    /// Fit with a generator seeded from the config
    pub fn fit<L>(&mut self, x: &Array2<f64>, y: &[L]) -> Result<&mut Self>
    where
        F: Fn() -> M,
        M: Classifier<L>,
        L: Label,
    {
        let mut rng = self.config.rng();
        self.fit_with_rng(x, y, &mut rng)
    }

    /// Fit every estimator on its own resample drawn from `rng`
    pub fn fit_with_rng<L, R>(
        &mut self,
        x: &Array2<f64>,
        y: &[L],
        rng: &mut R,
    ) -> Result<&mut Self>
    where
        F: Fn() -> M,
        M: Classifier<L>,
        L: Label,
        R: Rng,
    {
        check_training_set(x, y.len())?;
        let n = x.nrows();

        let mut estimators = Vec::with_capacity(self.config.n_estimators);
        for _ in 0..self.config.n_estimators {
            let indices = bootstrap_indices(n, rng);
            let y_sample: Vec<L> = indices.iter().map(|&i| y[i].clone()).collect();
            let mut model = (self.factory)();
            model.fit(&x.select(Axis(0), &indices), &y_sample)?;
            estimators.push(model);
        }

        debug!(estimators = estimators.len(), samples = n, "fitted bagging classifier");
        self.estimators = estimators;
        self.n_features = x.ncols();
        Ok(self)
    }

    /// Majority vote; ties go to the label predicted first in estimator order
    pub fn predict<L>(&self, features: ArrayView1<f64>) -> Result<L>
    where
        M: Classifier<L>,
        L: Label,
    {
        if self.estimators.is_empty() {
            return Err(ModelError::UntrainedModel);
        }
        check_features(self.n_features, &features)?;

        let votes = self
            .estimators
            .iter()
            .map(|m| m.predict(features))
            .collect::<Result<Vec<L>>>()?;
        majority_label(votes.iter())
            .ok_or_else(|| ModelError::DegenerateInput("no votes".to_string()))
    }

    pub fn estimators(&self) -> &[M] {
        &self.estimators
    }
}

impl<F, M, L> Classifier<L> for BaggingClassifier<F, M>
where
    F: Fn() -> M,
    M: Classifier<L>,
    L: Label,
{
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        BaggingClassifier::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        BaggingClassifier::predict(self, features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{DecisionTreeClassifier, KnnClassifier, LinearRegression};
    use ndarray::array;
    use rand::rngs::mock::StepRng;

    fn line_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((12, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| -1.5 * v + 4.0);
        (x, y)
    }

    #[test]
    fn test_bootstrap_indices() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let indices = bootstrap_indices(50, &mut rng);
        assert_eq!(indices.len(), 50);
        assert!(indices.iter().all(|&i| i < 50));

        let mut again = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(bootstrap_indices(50, &mut again), indices);
    }

    #[test]
    fn test_single_estimator_matches_base_model() {
        let (x, y) = line_data();

        let mut base = LinearRegression::new();
        Regressor::fit(&mut base, &x, &y).unwrap();

        let config = BaggingConfig {
            n_estimators: 1,
            seed: Some(42),
        };
        let mut bagged = BaggingRegressor::new(config, LinearRegression::new).unwrap();
        bagged.fit(&x, &y).unwrap();

        // Any resample of noise-free points lies on the same line
        for v in [0.0, 5.5, 20.0] {
            let expected = base.predict(v).unwrap();
            let actual = bagged.predict(array![v].view()).unwrap();
            assert!((expected - actual).abs() < 1e-9, "{} vs {}", expected, actual);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| i as f64);
        let y: Array1<f64> = (0..30).map(|i| ((i * 7) % 11) as f64).collect();

        let config = BaggingConfig {
            n_estimators: 5,
            seed: Some(3),
        };
        let mut first = BaggingRegressor::new(config.clone(), LinearRegression::new).unwrap();
        first.fit(&x, &y).unwrap();
        let mut second = BaggingRegressor::new(config, LinearRegression::new).unwrap();
        second.fit(&x, &y).unwrap();

        for (a, b) in first.estimators().iter().zip(second.estimators()) {
            assert_eq!(a.slope(), b.slope());
            assert_eq!(a.intercept(), b.intercept());
        }
    }

    #[test]
    fn test_bagging_classifier() {
        let x = array![[1.0], [1.5], [2.0], [2.5], [3.0], [8.0], [8.5], [9.0], [9.5], [10.0]];
        let y = [
            "under", "under", "under", "under", "under", "over", "over", "over", "over", "over",
        ];

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut bagged = BaggingClassifier::new(BaggingConfig::default(), || {
            KnnClassifier::with_k(1).unwrap_or_default()
        })
        .unwrap();
        bagged.fit_with_rng(&x, &y, &mut rng).unwrap();

        assert_eq!(bagged.estimators().len(), 10);
        assert_eq!(bagged.predict(array![2.0].view()).unwrap(), "under");
        assert_eq!(bagged.predict(array![9.0].view()).unwrap(), "over");
    }

    #[test]
    fn test_bagging_through_trait() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [5.0, 5.0], [5.0, 6.0], [0.5, 0.5], [5.5, 5.5]];
        let y = [false, false, true, true, false, true];

        let config = BaggingConfig {
            n_estimators: 3,
            seed: Some(5),
        };
        let mut bagged = BaggingClassifier::new(config, DecisionTreeClassifier::default).unwrap();
        Classifier::fit(&mut bagged, &x, &y).unwrap();
        assert_eq!(bagged.estimators().len(), 3);
    }

    #[test]
    fn test_member_failure_fails_the_fit() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut direct = LinearRegression::new();
        direct.fit_matrix(&x, &y).unwrap();

        // A generator stuck at zero resamples row 0 three times
        let mut stuck = StepRng::new(0, 0);
        assert_eq!(bootstrap_indices(3, &mut stuck), vec![0, 0, 0]);

        let mut bagged =
            BaggingRegressor::new(BaggingConfig::default(), LinearRegression::new).unwrap();
        let err = bagged.fit_with_rng(&x, &y, &mut stuck).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateInput(_)));
        assert!(bagged.estimators().is_empty());
        assert_eq!(
            bagged.predict(array![1.0].view()).unwrap_err(),
            ModelError::UntrainedModel
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            BaggingRegressor::new(
                BaggingConfig { n_estimators: 0, seed: None },
                LinearRegression::new
            ),
            Err(ModelError::InvalidParameter { .. })
        ));

        let bagged =
            BaggingRegressor::new(BaggingConfig::default(), LinearRegression::new).unwrap();
        assert_eq!(
            bagged.predict(array![1.0].view()).unwrap_err(),
            ModelError::UntrainedModel
        );
    }
}
