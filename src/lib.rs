//! Wager Models - statistical modeling toolkit for sports betting analytics
//!
//! This crate provides the building blocks for predicting game outcomes
//! and betting lines from numeric feature matrices:
//! - Normalization and feature scaling
//! - Regression, decision tree, Naive Bayes and KNN models
//! - Time series smoothing, decomposition and forecasting
//! - Feature engineering for lagged and categorical data
//! - Evaluation metrics and k-fold cross-validation
//! - Voting, averaging, stacking and bagging ensembles
//!
//! # Modules
//!
//! ## Core
//! - [`error`] - Error type shared by every operation
//! - [`preprocessing`] - Summary statistics, normalization, scaling
//! - [`training`] - Trainable models and the `Regressor`/`Classifier` traits
//!
//! ## Data processing
//! - [`timeseries`] - Moving averages, differencing, decomposition, forecasts
//! - [`feature_engineering`] - Lags, rolling statistics, encoders, interactions
//!
//! ## Model quality
//! - [`evaluation`] - Classification/regression metrics, cross-validation
//! - [`ensemble`] - Combining models
//!
//! All models are single-threaded and own their fitted state. Inputs are
//! `ndarray` matrices with one row per observation.

// Core error handling
pub mod error;

// Core modules
pub mod preprocessing;
pub mod training;

// Data processing
pub mod feature_engineering;
pub mod timeseries;

// Model quality
pub mod ensemble;
pub mod evaluation;

pub use error::{ModelError, Result};
