//! Time series module
//!
//! Forecasting helpers for ordered series (scores, lines, handle per game):
//! - Moving averages (simple, weighted, exponential)
//! - Linear trend extraction and extrapolation
//! - Differencing and additive seasonal decomposition
//! - A simplified autoregressive forecast on a differenced series
//!
//! All functions are pure and take the series oldest-first.

mod forecast;
mod smoothing;
mod transforms;

pub use forecast::{arima_forecast, linear_trend, ArimaConfig, LinearTrend};
pub use smoothing::{exponential_moving_average, simple_moving_average, weighted_moving_average};
pub use transforms::{difference, seasonal_decompose, Decomposition};
