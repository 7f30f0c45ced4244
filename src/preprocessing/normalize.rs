//! Summary statistics and single-sequence normalization

use crate::error::{ModelError, Result};
use ndarray::{Array1, ArrayView1};

/// Arithmetic mean
pub fn mean(values: ArrayView1<f64>) -> Result<f64> {
    if values.is_empty() {
        return Err(ModelError::DegenerateInput(
            "cannot compute the mean of an empty sequence".to_string(),
        ));
    }
    Ok(values.sum() / values.len() as f64)
}

/// Population variance (divides by n)
///
/// A constant sequence has a variance of exactly 0.0, even when its
/// computed mean carries rounding error.
pub fn variance(values: ArrayView1<f64>) -> Result<f64> {
    let mean = mean(values)?;
    if is_constant(values) {
        return Ok(0.0);
    }
    Ok(values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: ArrayView1<f64>) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

/// True when every value equals the first; an empty sequence counts as constant
pub fn is_constant(values: ArrayView1<f64>) -> bool {
    match values.iter().next() {
        Some(&first) => values.iter().all(|&v| v == first),
        None => true,
    }
}

/// Z-score normalization: (x - mean) / std
pub fn z_score(values: ArrayView1<f64>) -> Result<Array1<f64>> {
    let mean = mean(values)?;
    let std = std_dev(values)?;
    if std == 0.0 {
        return Err(ModelError::DegenerateInput(
            "z-score of a zero-variance sequence".to_string(),
        ));
    }
    Ok(values.mapv(|v| (v - mean) / std))
}

/// Min-max scaling onto [0, 1]: (x - min) / (max - min)
pub fn min_max(values: ArrayView1<f64>) -> Result<Array1<f64>> {
    if values.is_empty() {
        return Err(ModelError::DegenerateInput(
            "cannot scale an empty sequence".to_string(),
        ));
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return Err(ModelError::DegenerateInput(
            "min-max scaling of a constant sequence".to_string(),
        ));
    }
    Ok(values.mapv(|v| (v - min) / range))
}
