//! Feature engineering module
//!
//! Deterministic transforms that turn raw observations into model inputs:
//! - Lag features and rolling window statistics over a series
//! - Polynomial and pairwise interaction terms over a named record set
//! - Equal-width binning
//! - Target and one-hot encoding of categorical fields

mod encoding;
mod interactions;
mod temporal;

pub use encoding::{equal_width_bins, OneHotEncoder, TargetEncoder};
pub use interactions::{polynomial_features, FeatureFrame};
pub use temporal::{lag, lag_matrix, rolling, RollingStat};
