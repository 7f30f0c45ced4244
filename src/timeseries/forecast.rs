//! Trend and autoregressive forecasting

use super::transforms::diff_once;
use crate::error::{ModelError, Result};
use crate::preprocessing::mean;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Least-squares line through a series indexed 0..len
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    /// Number of observations the trend was fitted on
    pub len: usize,
}

impl LinearTrend {
    /// Trend value at time index `t`
    pub fn value_at(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }

    /// Extrapolate the trend to indices `len..len + steps`
    pub fn forecast(&self, steps: usize) -> Array1<f64> {
        (self.len..self.len + steps)
            .map(|t| self.value_at(t as f64))
            .collect()
    }
}

/// Fit a linear trend to a series against its time index
pub fn linear_trend(series: &Array1<f64>) -> Result<LinearTrend> {
    let n = series.len();
    if n < 2 {
        return Err(ModelError::DegenerateInput(format!(
            "trend needs at least 2 observations, got {}",
            n
        )));
    }

    let t_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(series.view())?;

    let mut sty = 0.0;
    let mut stt = 0.0;
    for (t, &y) in series.iter().enumerate() {
        let dt = t as f64 - t_mean;
        sty += dt * (y - y_mean);
        stt += dt * dt;
    }

    let slope = sty / stt;
    Ok(LinearTrend {
        slope,
        intercept: y_mean - slope * t_mean,
        len: n,
    })
}

/// Settings for [`arima_forecast`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArimaConfig {
    /// Number of trailing values averaged for each forecast
    pub p: usize,
    /// Differencing order
    pub d: usize,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self { p: 1, d: 1 }
    }
}

impl ArimaConfig {
    pub fn validate(&self) -> Result<()> {
        if self.p == 0 {
            return Err(ModelError::invalid_parameter("p", self.p, "must be at least 1"));
        }
        Ok(())
    }
}

/// Forecast `steps` values past the end of the series.
///
/// The series is differenced `d` times. Each forecast of the differenced
/// series is the plain mean of its last `p` values, and the window rolls
/// forward over earlier forecasts. This approximates an AR(p) model without
/// fitting coefficients. The forecasts are then integrated back through
/// every differencing level starting from its last observed value.
pub fn arima_forecast(
    series: &Array1<f64>,
    config: &ArimaConfig,
    steps: usize,
) -> Result<Array1<f64>> {
    config.validate()?;

    let mut levels = vec![series.clone()];
    for _ in 0..config.d {
        let next = diff_once(&levels[levels.len() - 1]);
        levels.push(next);
    }

    let stationary = &levels[config.d];
    if stationary.len() < config.p {
        return Err(ModelError::DegenerateInput(format!(
            "{} values remain after differencing {} times, need at least p = {}",
            stationary.len(),
            config.d,
            config.p
        )));
    }

    let mut window = stationary.to_vec();
    for _ in 0..steps {
        let next = mean(ArrayView1::from(&window[window.len() - config.p..]))?;
        window.push(next);
    }
    let mut forecasts = window.split_off(stationary.len());

    for level in levels[..config.d].iter().rev() {
        let mut last = level[level.len() - 1];
        for value in forecasts.iter_mut() {
            last += *value;
            *value = last;
        }
    }

    debug!(p = config.p, d = config.d, steps, observations = series.len(), "arima forecast");
    Ok(Array1::from_vec(forecasts))
}
