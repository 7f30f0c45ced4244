//! Ensemble methods module
//!
//! Provides ensemble strategies over any model implementing the training
//! traits:
//! - Majority voting (classification)
//! - Simple and weighted averaging (regression)
//! - Stacking on a trailing holdout block
//! - Bagging on bootstrap resamples
//!
//! Ensembles that train their own members take factories (`Fn() -> M`)
//! and call them once per member, so no member shares state with another.

mod bagging;
mod stacking;
mod voting;

pub use bagging::{BaggingClassifier, BaggingConfig, BaggingRegressor};
pub use stacking::{StackingClassifier, StackingConfig, StackingRegressor};
pub use voting::{average, majority_vote, weighted_average, AveragingRegressor, VotingClassifier};
