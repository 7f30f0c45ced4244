//! Binning and categorical encoders

use crate::error::{ModelError, Result};
use crate::preprocessing::mean;
use crate::training::Label;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Assign each value to one of `bins` equal-width intervals over [min, max].
///
/// The maximum lands in the last bin. When every value is equal the range
/// is zero and every value lands in bin 0.
pub fn equal_width_bins(values: &Array1<f64>, bins: usize) -> Result<Vec<usize>> {
    if bins == 0 {
        return Err(ModelError::invalid_parameter("bins", bins, "must be at least 1"));
    }
    if values.is_empty() {
        return Err(ModelError::DegenerateInput("no values to bin".to_string()));
    }

    let min_val = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_val = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let range = max_val - min_val;
    if range <= 0.0 {
        return Ok(vec![0; values.len()]);
    }

    let bin_width = range / bins as f64;
    Ok(values
        .iter()
        .map(|&v| {
            let bin = ((v - min_val) / bin_width) as usize;
            bin.min(bins - 1)
        })
        .collect())
}

/// Replaces each category with the mean target observed for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEncoder<C: Label> {
    encodings: HashMap<C, f64>,
    global_mean: Option<f64>,
}

impl<C: Label> Default for TargetEncoder<C> {
    fn default() -> Self {
        Self {
            encodings: HashMap::new(),
            global_mean: None,
        }
    }
}

impl<C: Label> TargetEncoder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the per-category target mean
    pub fn fit(&mut self, categories: &[C], target: &Array1<f64>) -> Result<&mut Self> {
        if categories.len() != target.len() {
            return Err(ModelError::length_mismatch("target", categories.len(), target.len()));
        }
        if categories.is_empty() {
            return Err(ModelError::DegenerateInput("no observations to encode".to_string()));
        }

        let mut sums: HashMap<C, (f64, usize)> = HashMap::new();
        for (category, &value) in categories.iter().zip(target.iter()) {
            let entry = sums.entry(category.clone()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        self.encodings = sums
            .into_iter()
            .map(|(category, (sum, count))| (category, sum / count as f64))
            .collect();
        self.global_mean = Some(mean(target.view())?);

        debug!(
            observations = categories.len(),
            categories = self.encodings.len(),
            "fitted target encoder"
        );
        Ok(self)
    }

    /// Encode categories; unseen categories get the global target mean
    pub fn transform(&self, categories: &[C]) -> Result<Array1<f64>> {
        let global_mean = self.global_mean.ok_or(ModelError::UntrainedModel)?;
        Ok(categories
            .iter()
            .map(|c| self.encodings.get(c).copied().unwrap_or(global_mean))
            .collect())
    }

    /// Learned mean for a seen category
    pub fn encoding(&self, category: &C) -> Option<f64> {
        self.encodings.get(category).copied()
    }

    pub fn global_mean(&self) -> Option<f64> {
        self.global_mean
    }
}

/// One 0/1 column per category observed at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder<C> {
    categories: Vec<C>,
}

impl<C: Label> Default for OneHotEncoder<C> {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
        }
    }
}

impl<C: Label> OneHotEncoder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record categories in first-seen order
    pub fn fit(&mut self, categories: &[C]) -> Result<&mut Self> {
        if categories.is_empty() {
            return Err(ModelError::DegenerateInput("no observations to encode".to_string()));
        }
        let mut seen: Vec<C> = Vec::new();
        for category in categories {
            if !seen.contains(category) {
                seen.push(category.clone());
            }
        }
        self.categories = seen;
        Ok(self)
    }

    /// Indicator matrix; an unseen category yields an all-zero row
    pub fn transform(&self, categories: &[C]) -> Result<Array2<f64>> {
        if self.categories.is_empty() {
            return Err(ModelError::UntrainedModel);
        }

        let index: HashMap<&C, usize> = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c, i))
            .collect();

        let mut encoded = Array2::zeros((categories.len(), self.categories.len()));
        for (row, category) in categories.iter().enumerate() {
            if let Some(&col) = index.get(category) {
                encoded[[row, col]] = 1.0;
            }
        }
        Ok(encoded)
    }

    pub fn fit_transform(&mut self, categories: &[C]) -> Result<Array2<f64>> {
        self.fit(categories)?;
        self.transform(categories)
    }

    /// Categories in column order
    pub fn categories(&self) -> &[C] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_equal_width_bins() {
        let values = array![0.0, 2.5, 5.0, 7.5, 10.0];
        assert_eq!(equal_width_bins(&values, 4).unwrap(), vec![0, 1, 2, 3, 3]);
        assert_eq!(equal_width_bins(&values, 1).unwrap(), vec![0; 5]);
    }

    #[test]
    fn test_bins_zero_range() {
        let values = array![3.0, 3.0, 3.0];
        assert_eq!(equal_width_bins(&values, 5).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_bins_validation() {
        assert!(matches!(
            equal_width_bins(&array![1.0], 0),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            equal_width_bins(&Array1::zeros(0), 3),
            Err(ModelError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_target_encoder() {
        let teams = ["BOS", "LAL", "BOS", "MIA"];
        let margin = array![4.0, -2.0, 8.0, 1.0];

        let mut encoder = TargetEncoder::new();
        encoder.fit(&teams, &margin).unwrap();

        assert_eq!(encoder.encoding(&"BOS"), Some(6.0));
        assert_eq!(encoder.encoding(&"LAL"), Some(-2.0));
        assert_eq!(encoder.global_mean(), Some(2.75));

        let encoded = encoder.transform(&["MIA", "NYK"]).unwrap();
        assert_eq!(encoded, array![1.0, 2.75]);
    }

    #[test]
    fn test_target_encoder_errors() {
        let encoder: TargetEncoder<&str> = TargetEncoder::new();
        assert_eq!(encoder.transform(&["BOS"]).unwrap_err(), ModelError::UntrainedModel);

        let mut encoder = TargetEncoder::new();
        assert!(matches!(
            encoder.fit(&["BOS", "LAL"], &array![1.0]),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_one_hot_encoder() {
        let venues = ["home", "away", "home", "neutral"];

        let mut encoder = OneHotEncoder::new();
        let encoded = encoder.fit_transform(&venues).unwrap();

        assert_eq!(encoder.categories(), &["home", "away", "neutral"]);
        assert_eq!(
            encoded,
            array![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
            ]
        );

        let unseen = encoder.transform(&["dome"]).unwrap();
        assert_eq!(unseen, array![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_one_hot_untrained() {
        let encoder: OneHotEncoder<i64> = OneHotEncoder::new();
        assert_eq!(encoder.transform(&[1]).unwrap_err(), ModelError::UntrainedModel);
    }
}
