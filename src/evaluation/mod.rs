//! Model evaluation module
//!
//! Pure functions over (true, predicted) sequences plus a k-fold
//! cross-validation driver that trains fresh models from a factory.

mod cross_validation;
mod metrics;

pub use cross_validation::{
    cross_validate, cross_validate_regressor, CrossValidationReport, FoldSplit, KFold,
};
pub use metrics::{
    accuracy, f1_score, mean_absolute_error, mean_squared_error, precision, r2_score,
    recall, regression_report, roc_auc, root_mean_squared_error, ConfusionMatrix,
    RegressionReport,
};
