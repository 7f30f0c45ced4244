//! Stacking ensemble method
//!
//! Base models train on the leading rows of the training set. Their
//! predictions on the trailing holdout rows become the features of a meta
//! model, which learns how to combine them.

use crate::error::{ModelError, Result};
use crate::training::{
    check_features, check_training_set, distinct_labels, Classifier, Label,
    ProbabilisticClassifier, Regressor,
};
use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for stacking ensembles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StackingConfig {
    /// Share of trailing rows held out to train the meta model
    pub holdout_fraction: f64,
}

impl Default for StackingConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.3,
        }
    }
}

impl StackingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(ModelError::invalid_parameter(
                "holdout_fraction",
                self.holdout_fraction,
                "must be in (0, 1)",
            ));
        }
        Ok(())
    }

    /// Number of leading rows used to train the base models
    fn split_point(&self, n_samples: usize) -> Result<usize> {
        let n_holdout = (n_samples as f64 * self.holdout_fraction).round() as usize;
        let n_train = n_samples.saturating_sub(n_holdout);
        if n_holdout == 0 || n_train == 0 {
            return Err(ModelError::DegenerateInput(format!(
                "{} rows cannot be split into base and holdout sets at fraction {}",
                n_samples, self.holdout_fraction
            )));
        }
        Ok(n_train)
    }
}

type Factory<M> = Box<dyn Fn() -> M>;

fn check_bases(n_bases: usize) -> Result<()> {
    if n_bases == 0 {
        return Err(ModelError::invalid_parameter(
            "base_models",
            n_bases,
            "at least one base model is required",
        ));
    }
    Ok(())
}

/// Stacking regressor
pub struct StackingRegressor<B, M> {
    config: StackingConfig,
    base_factories: Vec<Factory<B>>,
    meta_factory: Factory<M>,
    /// Fitted base models, parallel to `base_factories`
    base_models: Vec<B>,
    /// Fitted meta model
    meta_model: Option<M>,
    n_features: usize,
}

impl<B: Regressor, M: Regressor> StackingRegressor<B, M> {
    /// Create a stacking regressor around a meta model factory
    pub fn new(config: StackingConfig, meta_factory: impl Fn() -> M + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            base_factories: Vec::new(),
            meta_factory: Box::new(meta_factory),
            base_models: Vec::new(),
            meta_model: None,
            n_features: 0,
        })
    }

    /// Add a base model
    pub fn add_base_model(mut self, factory: impl Fn() -> B + 'static) -> Self {
        self.base_factories.push(Box::new(factory));
        self
    }

    /// Fit the stacking ensemble
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_bases(self.base_factories.len())?;
        check_training_set(x, y.len())?;
        let n_train = self.config.split_point(x.nrows())?;

        let x_base = x.slice(s![..n_train, ..]).to_owned();
        let y_base = y.slice(s![..n_train]).to_owned();
        let x_holdout = x.slice(s![n_train.., ..]);

        let mut base_models = Vec::with_capacity(self.base_factories.len());
        for factory in &self.base_factories {
            let mut model = factory();
            model.fit(&x_base, &y_base)?;
            base_models.push(model);
        }

        let mut meta_x = Array2::zeros((x_holdout.nrows(), base_models.len()));
        for (i, row) in x_holdout.rows().into_iter().enumerate() {
            for (j, model) in base_models.iter().enumerate() {
                meta_x[[i, j]] = model.predict(row)?;
            }
        }

        let mut meta_model = (self.meta_factory)();
        meta_model.fit(&meta_x, &y.slice(s![n_train..]).to_owned())?;

        debug!(
            bases = base_models.len(),
            base_rows = n_train,
            holdout_rows = meta_x.nrows(),
            "fitted stacking regressor"
        );

        self.base_models = base_models;
        self.meta_model = Some(meta_model);
        self.n_features = x.ncols();
        Ok(self)
    }

    /// Feed the base predictions to the meta model
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        let meta_model = self.meta_model.as_ref().ok_or(ModelError::UntrainedModel)?;
        check_features(self.n_features, &features)?;

        let meta_features = self
            .base_models
            .iter()
            .map(|m| m.predict(features))
            .collect::<Result<Array1<f64>>>()?;
        meta_model.predict(meta_features.view())
    }

    pub fn base_models(&self) -> &[B] {
        &self.base_models
    }
}

impl<B: Regressor, M: Regressor> Regressor for StackingRegressor<B, M> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        StackingRegressor::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<f64> {
        StackingRegressor::predict(self, features)
    }
}

/// Stacking classifier over class probabilities
///
/// The meta features of a row are every base model's probability for each
/// training class, giving `bases × classes` columns.
pub struct StackingClassifier<B, M, L> {
    config: StackingConfig,
    base_factories: Vec<Factory<B>>,
    meta_factory: Factory<M>,
    base_models: Vec<B>,
    meta_model: Option<M>,
    /// Classes of the full training set in first-seen order
    classes: Vec<L>,
    n_features: usize,
}

impl<B, M, L> StackingClassifier<B, M, L>
where
    B: ProbabilisticClassifier<L>,
    M: Classifier<L>,
    L: Label,
{
    /// Create a stacking classifier around a meta model factory
    pub fn new(config: StackingConfig, meta_factory: impl Fn() -> M + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            base_factories: Vec::new(),
            meta_factory: Box::new(meta_factory),
            base_models: Vec::new(),
            meta_model: None,
            classes: Vec::new(),
            n_features: 0,
        })
    }

    /// Add a base model
    pub fn add_base_model(mut self, factory: impl Fn() -> B + 'static) -> Self {
        self.base_factories.push(Box::new(factory));
        self
    }

    /// Fit the stacking ensemble
    pub fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<&mut Self> {
        check_bases(self.base_factories.len())?;
        check_training_set(x, y.len())?;
        let n_train = self.config.split_point(x.nrows())?;
        let classes = distinct_labels(y);

        let x_base = x.slice(s![..n_train, ..]).to_owned();
        let x_holdout = x.slice(s![n_train.., ..]);

        let mut base_models = Vec::with_capacity(self.base_factories.len());
        for factory in &self.base_factories {
            let mut model = factory();
            model.fit(&x_base, &y[..n_train])?;
            base_models.push(model);
        }

        let width = base_models.len() * classes.len();
        let mut meta_x = Array2::zeros((x_holdout.nrows(), width));
        for (i, row) in x_holdout.rows().into_iter().enumerate() {
            let meta_row = Self::meta_features(&base_models, &classes, row)?;
            meta_x.row_mut(i).assign(&meta_row);
        }

        let mut meta_model = (self.meta_factory)();
        meta_model.fit(&meta_x, &y[n_train..])?;

        debug!(
            bases = base_models.len(),
            classes = classes.len(),
            base_rows = n_train,
            holdout_rows = meta_x.nrows(),
            "fitted stacking classifier"
        );

        self.base_models = base_models;
        self.meta_model = Some(meta_model);
        self.classes = classes;
        self.n_features = x.ncols();
        Ok(self)
    }

    /// Feed the base probabilities to the meta model
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        let meta_model = self.meta_model.as_ref().ok_or(ModelError::UntrainedModel)?;
        check_features(self.n_features, &features)?;

        let meta_row = Self::meta_features(&self.base_models, &self.classes, features)?;
        meta_model.predict(meta_row.view())
    }

    /// Training classes in meta-feature order
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn base_models(&self) -> &[B] {
        &self.base_models
    }

    /// Probability of each class from each base model; a class a base model
    /// never saw gets 0
    fn meta_features(
        base_models: &[B],
        classes: &[L],
        row: ArrayView1<f64>,
    ) -> Result<Array1<f64>> {
        let mut meta = Vec::with_capacity(base_models.len() * classes.len());
        for model in base_models {
            let proba = model.predict_proba(row)?;
            for class in classes {
                let p = proba
                    .iter()
                    .find(|(label, _)| label == class)
                    .map_or(0.0, |(_, p)| *p);
                meta.push(p);
            }
        }
        Ok(Array1::from_vec(meta))
    }
}

impl<B, M, L> Classifier<L> for StackingClassifier<B, M, L>
where
    B: ProbabilisticClassifier<L>,
    M: Classifier<L>,
    L: Label,
{
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        StackingClassifier::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        StackingClassifier::predict(self, features)
    }
}
