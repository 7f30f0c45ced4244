//! Feature scaling implementations

use crate::error::{ModelError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Column-wise feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to every column of `x`
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(ModelError::DegenerateInput(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }

        let mut params = Vec::with_capacity(x.ncols());
        for (idx, column) in x.axis_iter(Axis(1)).enumerate() {
            let column_params = match self.scaler_type {
                ScalerType::Standard => {
                    let center = super::mean(column)?;
                    let scale = super::std_dev(column)?;
                    ScalerParams { center, scale }
                }
                ScalerType::MinMax => {
                    let min = column.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    ScalerParams {
                        center: min,
                        scale: max - min,
                    }
                }
            };
            if column_params.scale == 0.0 {
                return Err(ModelError::DegenerateInput(format!(
                    "column {} is constant and cannot be scaled",
                    idx
                )));
            }
            params.push(column_params);
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale `x` with the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let mut result = x.clone();
        for (mut column, params) in result.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Map scaled values back onto the original units
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let mut result = x.clone();
        for (mut column, params) in result.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            column.mapv_inplace(|v| v * params.scale + params.center);
        }
        Ok(result)
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(ModelError::UntrainedModel);
        }
        if x.ncols() != self.params.len() {
            return Err(ModelError::length_mismatch("columns", self.params.len(), x.ncols()));
        }
        Ok(())
    }
}
