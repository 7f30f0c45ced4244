//! Moving averages

use crate::error::{ModelError, Result};
use crate::preprocessing::mean;
use ndarray::Array1;

fn check_window(series: &Array1<f64>, window: usize) -> Result<()> {
    if window == 0 {
        return Err(ModelError::invalid_parameter("window", window, "must be at least 1"));
    }
    if window > series.len() {
        return Err(ModelError::DegenerateInput(format!(
            "window of {} exceeds series length {}",
            window,
            series.len()
        )));
    }
    Ok(())
}

/// Mean of every full window; output `i` covers `series[i..i + window]`
pub fn simple_moving_average(series: &Array1<f64>, window: usize) -> Result<Array1<f64>> {
    check_window(series, window)?;
    series.windows(window).into_iter().map(mean).collect()
}

/// Linearly weighted average of every full window.
///
/// Within a window the oldest value gets weight 1 and the most recent
/// gets weight `window`.
pub fn weighted_moving_average(series: &Array1<f64>, window: usize) -> Result<Array1<f64>> {
    check_window(series, window)?;
    let total_weight = (window * (window + 1)) as f64 / 2.0;
    Ok(series
        .windows(window)
        .into_iter()
        .map(|w| {
            w.iter()
                .enumerate()
                .map(|(j, v)| (j + 1) as f64 * v)
                .sum::<f64>()
                / total_weight
        })
        .collect())
}

/// Exponentially smoothed series, seeded with the first observation
pub fn exponential_moving_average(series: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(ModelError::invalid_parameter("alpha", alpha, "must be in (0, 1]"));
    }
    let Some(&first) = series.get(0) else {
        return Err(ModelError::DegenerateInput("series is empty".to_string()));
    };

    let mut smoothed = Array1::zeros(series.len());
    let mut current = first;
    for (i, &value) in series.iter().enumerate() {
        if i > 0 {
            current = alpha * value + (1.0 - alpha) * current;
        }
        smoothed[i] = current;
    }
    Ok(smoothed)
}
