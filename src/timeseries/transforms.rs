//! Time series transformations

use crate::error::{ModelError, Result};
use ndarray::{s, Array1};
use serde::{Deserialize, Serialize};

/// Apply `order` rounds of first differences.
///
/// Each round shortens the series by one; `order == 0` returns the series
/// unchanged.
pub fn difference(series: &Array1<f64>, order: usize) -> Result<Array1<f64>> {
    if order >= series.len() && order > 0 {
        return Err(ModelError::DegenerateInput(format!(
            "cannot difference {} times a series of length {}",
            order,
            series.len()
        )));
    }

    let mut result = series.clone();
    for _ in 0..order {
        result = diff_once(&result);
    }
    Ok(result)
}

pub(crate) fn diff_once(series: &Array1<f64>) -> Array1<f64> {
    let n = series.len();
    if n <= 1 {
        return Array1::zeros(0);
    }

    let mut result = Array1::zeros(n - 1);
    for i in 1..n {
        result[i - 1] = series[i] - series[i - 1];
    }
    result
}

/// Additive seasonal decomposition: observed = trend + seasonal + residual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Moving-average trend, `None` where the window does not fit
    pub trend: Vec<Option<f64>>,
    /// Seasonal component repeated over the series
    pub seasonal: Vec<f64>,
    /// What remains, `None` where the trend is undefined
    pub residual: Vec<Option<f64>>,
    /// Period of seasonality
    pub period: usize,
}

impl Decomposition {
    /// One cycle of the seasonal component, indexed by position mod period
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }
}

/// Split a series into trend, seasonal and residual components.
///
/// The trend at `i` averages the `period` values starting `period / 2`
/// steps before `i`. For even periods this window holds one more value
/// before `i` than after it.
pub fn seasonal_decompose(series: &Array1<f64>, period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(ModelError::invalid_parameter("period", period, "must be at least 2"));
    }
    let n = series.len();
    if n < period * 2 {
        return Err(ModelError::DegenerateInput(format!(
            "series of length {} is shorter than two periods of {}",
            n, period
        )));
    }

    let trend = centered_trend(series, period);
    let pattern = compute_seasonal(series, &trend, period);

    let seasonal: Vec<f64> = (0..n).map(|i| pattern[i % period]).collect();
    let residual = trend
        .iter()
        .enumerate()
        .map(|(i, t)| t.map(|t| series[i] - t - seasonal[i]))
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
        period,
    })
}

fn centered_trend(series: &Array1<f64>, period: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let half = period / 2;

    (0..n)
        .map(|i| {
            let start = i.checked_sub(half)?;
            let end = start + period;
            (end <= n).then(|| series.slice(s![start..end]).sum() / period as f64)
        })
        .collect()
}

/// Average detrended value at each seasonal position; positions with no
/// defined trend stay at 0
fn compute_seasonal(series: &Array1<f64>, trend: &[Option<f64>], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];

    for (i, t) in trend.iter().enumerate() {
        if let Some(t) = t {
            sums[i % period] += series[i] - t;
            counts[i % period] += 1;
        }
    }

    sums.iter()
        .zip(counts.iter())
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect()
}
