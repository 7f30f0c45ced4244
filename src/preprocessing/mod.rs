//! Data preprocessing module
//!
//! Shared numeric helpers used across the toolkit:
//! - Summary statistics (mean, population variance, standard deviation)
//! - Z-score and min-max normalization of a single sequence
//! - Column-wise feature scaling with inverse transform

mod normalize;
mod scaler;

pub use normalize::{is_constant, mean, min_max, std_dev, variance, z_score};
pub use scaler::{Scaler, ScalerType};
