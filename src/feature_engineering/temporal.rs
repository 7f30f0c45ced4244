//! Lag and rolling-window features

use crate::error::{ModelError, Result};
use crate::preprocessing::{mean, std_dev};
use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Statistic computed over a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollingStat {
    Mean,
    /// Population standard deviation
    Std,
    Min,
    Max,
}

impl RollingStat {
    fn compute(&self, values: ArrayView1<f64>) -> Result<f64> {
        match self {
            RollingStat::Mean => mean(values),
            RollingStat::Std => std_dev(values),
            RollingStat::Min => Ok(values.iter().copied().fold(f64::INFINITY, f64::min)),
            RollingStat::Max => Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        }
    }
}

/// Value `k` steps back; `None` for the first `k` positions
pub fn lag(series: &Array1<f64>, k: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| i.checked_sub(k).map(|j| series[j]))
        .collect()
}

/// Build a supervised matrix from a series.
///
/// Row `r` corresponds to time `t = max_lag + r`; column `c` holds the value
/// at `t - lags[c]` and the target is the value at `t`. The result feeds
/// straight into a regressor.
pub fn lag_matrix(series: &Array1<f64>, lags: &[usize]) -> Result<(Array2<f64>, Array1<f64>)> {
    let Some(&max_lag) = lags.iter().max() else {
        return Err(ModelError::invalid_parameter("lags", "[]", "at least one lag is required"));
    };
    if lags.contains(&0) {
        return Err(ModelError::invalid_parameter(
            "lags",
            format!("{:?}", lags),
            "lags must be at least 1",
        ));
    }
    let n = series.len();
    if n <= max_lag {
        return Err(ModelError::DegenerateInput(format!(
            "series of length {} is not longer than the largest lag {}",
            n, max_lag
        )));
    }

    let rows = n - max_lag;
    let features = Array2::from_shape_fn((rows, lags.len()), |(r, c)| {
        series[max_lag + r - lags[c]]
    });
    let target = series.slice(s![max_lag..]).to_owned();
    Ok((features, target))
}

/// Statistic over the trailing window ending at each position; `None`
/// until the window is full
pub fn rolling(
    series: &Array1<f64>,
    window: usize,
    stat: RollingStat,
) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(ModelError::invalid_parameter("window", window, "must be at least 1"));
    }

    (0..series.len())
        .map(|i| match (i + 1).checked_sub(window) {
            Some(start) => stat.compute(series.slice(s![start..=i])).map(Some),
            None => Ok(None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_lag_features() {
        let series = array![1.0, 2.0, 3.0, 4.0, 5.0];

        assert_eq!(lag(&series, 1), vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(lag(&series, 0), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]);
        assert!(lag(&series, 7).iter().all(Option::is_none));
    }

    #[test]
    fn test_lag_matrix() {
        let series = array![10.0, 11.0, 12.0, 13.0, 14.0];
        let (x, y) = lag_matrix(&series, &[1, 3]).unwrap();

        assert_eq!(x.dim(), (2, 2));
        assert_eq!(x, array![[12.0, 10.0], [13.0, 11.0]]);
        assert_eq!(y, array![13.0, 14.0]);
    }

    #[test]
    fn test_lag_matrix_validation() {
        let series = array![1.0, 2.0, 3.0];
        assert!(matches!(
            lag_matrix(&series, &[]),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            lag_matrix(&series, &[0, 1]),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            lag_matrix(&series, &[3]),
            Err(ModelError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_rolling_mean() {
        let series = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let means = rolling(&series, 3, RollingStat::Mean).unwrap();

        assert!(means[0].is_none() && means[1].is_none());
        assert!((means[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((means[4].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_stats() {
        let series = array![4.0, 2.0, 6.0, 8.0];

        let std = rolling(&series, 2, RollingStat::Std).unwrap();
        assert!(std[0].is_none());
        assert!((std[1].unwrap() - 1.0).abs() < 1e-12);
        assert!((std[2].unwrap() - 2.0).abs() < 1e-12);

        let min = rolling(&series, 3, RollingStat::Min).unwrap();
        assert_eq!(min, vec![None, None, Some(2.0), Some(2.0)]);

        let max = rolling(&series, 3, RollingStat::Max).unwrap();
        assert_eq!(max, vec![None, None, Some(6.0), Some(8.0)]);

        assert!(matches!(
            rolling(&series, 0, RollingStat::Mean),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_rolling_std_of_flat_stretch() {
        let series = array![1.0, 0.1, 0.1, 0.1, 0.7, 0.7, 0.7];
        let std = rolling(&series, 3, RollingStat::Std).unwrap();
        assert_eq!(std[3], Some(0.0));
        assert_eq!(std[6], Some(0.0));
        assert!(std[4].unwrap() > 0.0);
    }
}
