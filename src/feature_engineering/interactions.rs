//! Named record sets and polynomial interaction terms

use crate::error::{ModelError, Result};
use ndarray::{s, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// A feature matrix with one name per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    columns: Vec<String>,
    data: Array2<f64>,
}

impl FeatureFrame {
    pub fn new<S: Into<String>>(columns: Vec<S>, data: Array2<f64>) -> Result<Self> {
        if columns.len() != data.ncols() {
            return Err(ModelError::length_mismatch("columns", data.ncols(), columns.len()));
        }
        Ok(Self {
            columns: columns.into_iter().map(Into::into).collect(),
            data,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the frame, keeping only the matrix
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    /// Values of a named column
    pub fn column(&self, name: &str) -> Option<ArrayView1<f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.data.column(idx))
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }
}

/// Degree-2 expansion of a frame.
///
/// Output columns are the originals, then `c^2` for every column, then
/// `a*b` for every pair with `a` before `b`.
pub fn polynomial_features(frame: &FeatureFrame) -> FeatureFrame {
    let k = frame.columns.len();
    let n_out = 2 * k + k * k.saturating_sub(1) / 2;

    let mut columns = frame.columns.clone();
    let mut data = Array2::zeros((frame.n_rows(), n_out));
    data.slice_mut(s![.., ..k]).assign(&frame.data);

    for (j, name) in frame.columns.iter().enumerate() {
        columns.push(format!("{}^2", name));
        let col = frame.data.column(j);
        data.column_mut(k + j).assign(&(&col * &col));
    }

    let mut next = 2 * k;
    for a in 0..k {
        for b in (a + 1)..k {
            columns.push(format!("{}*{}", frame.columns[a], frame.columns[b]));
            data.column_mut(next)
                .assign(&(&frame.data.column(a) * &frame.data.column(b)));
            next += 1;
        }
    }

    FeatureFrame { columns, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_frame_validation() {
        let err = FeatureFrame::new(vec!["a"], array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_column_lookup() {
        let frame =
            FeatureFrame::new(vec!["points", "rebounds"], array![[20.0, 5.0], [25.0, 7.0]])
                .unwrap();
        assert_eq!(frame.column("rebounds").unwrap().to_vec(), vec![5.0, 7.0]);
        assert!(frame.column("assists").is_none());
    }

    #[test]
    fn test_polynomial_features() {
        let frame = FeatureFrame::new(
            vec!["a", "b", "c"],
            array![[1.0, 2.0, 3.0], [2.0, 0.5, -1.0]],
        )
        .unwrap();

        let expanded = polynomial_features(&frame);
        assert_eq!(
            expanded.columns(),
            &["a", "b", "c", "a^2", "b^2", "c^2", "a*b", "a*c", "b*c"]
        );
        assert_eq!(
            expanded.data(),
            &array![
                [1.0, 2.0, 3.0, 1.0, 4.0, 9.0, 2.0, 3.0, 6.0],
                [2.0, 0.5, -1.0, 4.0, 0.25, 1.0, 1.0, -2.0, -0.5],
            ]
        );
    }

    #[test]
    fn test_single_column_has_no_pairs() {
        let frame = FeatureFrame::new(vec!["x"], array![[3.0], [4.0]]).unwrap();
        let expanded = polynomial_features(&frame);
        assert_eq!(expanded.columns(), &["x", "x^2"]);
        assert_eq!(expanded.into_data(), array![[3.0, 9.0], [4.0, 16.0]]);
    }
}
