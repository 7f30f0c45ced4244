//! Decision tree implementation

use super::config::DecisionTreeConfig;
use super::{
    check_features, check_training_set, label_counts, majority_label, Classifier, Label,
};
use crate::error::{ModelError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode<L> {
    /// Leaf node with predicted label
    Leaf { label: L, n_samples: usize },
    /// Internal node with split; values below `threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode<L>>,
        right: Box<TreeNode<L>>,
        n_samples: usize,
        impurity: f64,
    },
}

impl<L> TreeNode<L> {
    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Binary CART-style classification tree using Gini impurity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier<L> {
    config: DecisionTreeConfig,
    root: Option<TreeNode<L>>,
    n_features: usize,
}

impl<L: Label> Default for DecisionTreeClassifier<L> {
    fn default() -> Self {
        Self {
            config: DecisionTreeConfig::default(),
            root: None,
            n_features: 0,
        }
    }
}

impl<L: Label> DecisionTreeClassifier<L> {
    /// Create an unfitted tree with a validated configuration
    pub fn new(config: DecisionTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            root: None,
            n_features: 0,
        })
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Result<Self> {
        self.config.max_depth = depth;
        self.config.validate()?;
        Ok(self)
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<&mut Self> {
        check_training_set(x, y.len())?;

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = self.build_tree(x, y, &indices, 0)?;

        debug!(
            samples = x.nrows(),
            features = x.ncols(),
            depth = root.depth(),
            leaves = root.n_leaves(),
            "fitted decision tree"
        );

        self.n_features = x.ncols();
        self.root = Some(root);
        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &[L],
        indices: &[usize],
        depth: usize,
    ) -> Result<TreeNode<L>> {
        let n_samples = indices.len();
        let label = majority_label(indices.iter().map(|&i| &y[i])).ok_or_else(|| {
            ModelError::DegenerateInput("cannot build a tree node from zero rows".to_string())
        })?;
        let leaf = TreeNode::Leaf { label, n_samples };

        let is_pure = label_counts(indices.iter().map(|&i| &y[i])).len() == 1;
        if depth >= self.config.max_depth || is_pure {
            return Ok(leaf);
        }

        let Some((feature_idx, threshold, impurity)) = find_best_split(x, y, indices) else {
            return Ok(leaf);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] < threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return Ok(leaf);
        }

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1)?);
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1)?);

        Ok(TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity,
        })
    }

    /// Predict the label for one feature vector
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        let mut node = self.root.as_ref().ok_or(ModelError::UntrainedModel)?;
        check_features(self.n_features, &features)?;

        loop {
            match node {
                TreeNode::Leaf { label, .. } => return Ok(label.clone()),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if features[*feature_idx] < *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Root of the fitted tree
    pub fn root(&self) -> Option<&TreeNode<L>> {
        self.root.as_ref()
    }

    /// Number of split levels on the longest path (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::n_leaves)
    }
}

impl<L: Label> Classifier<L> for DecisionTreeClassifier<L> {
    fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<()> {
        DecisionTreeClassifier::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, features: ArrayView1<f64>) -> Result<L> {
        DecisionTreeClassifier::predict(self, features)
    }
}

/// Search every feature and every midpoint between consecutive distinct values.
/// Returns (feature, threshold, weighted impurity); the first candidate wins ties.
fn find_best_split<L: Label>(
    x: &Array2<f64>,
    y: &[L],
    indices: &[usize],
) -> Option<(usize, f64, f64)> {
    let n = indices.len() as f64;
    let mut best: Option<(usize, f64, f64)> = None;

    for feature_idx in 0..x.ncols() {
        let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();

        for window in values.windows(2) {
            let threshold = (window[0] + window[1]) / 2.0;

            let mut left: Vec<&L> = Vec::new();
            let mut right: Vec<&L> = Vec::new();
            for &i in indices {
                if x[[i, feature_idx]] < threshold {
                    left.push(&y[i]);
                } else {
                    right.push(&y[i]);
                }
            }

            if left.is_empty() || right.is_empty() {
                continue;
            }

            let impurity = (left.len() as f64 * gini(left.iter().copied())
                + right.len() as f64 * gini(right.iter().copied()))
                / n;

            if best.map_or(true, |(_, _, best_impurity)| impurity < best_impurity) {
                best = Some((feature_idx, threshold, impurity));
            }
        }
    }

    best
}

/// Gini impurity: 1 - Σ p²
fn gini<'a, L, I>(labels: I) -> f64
where
    L: Label + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let counts = label_counts(labels);
    let n: usize = counts.iter().map(|(_, c)| c).sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&(_, c)| (c as f64 / n).powi(2))
        .sum::<f64>()
}
