//! Regression models
//!
//! - [`RandomForestRegressor`]: bagged CART trees, the primary model
//! - [`LinearRegression`]: ridge-stabilised least squares, the secondary model
//!
//! Both implement [`rsvp_spi::Regressor`] and serialize with serde so the
//! artifact store can persist them as-is.

pub mod forest;
pub mod linear;
pub mod tree;

pub use forest::RandomForestRegressor;
pub use linear::LinearRegression;
pub use tree::{RegressionTree, TreeNode, TreeParams};

use rsvp_spi::{Result, RsvpError};

/// Validate a training matrix and return its row width
pub(crate) fn check_training_data(
    features: &[Vec<f64>],
    targets: &[f64],
    min_rows: usize,
) -> Result<usize> {
    if features.len() != targets.len() {
        return Err(RsvpError::invalid_parameter(
            "targets",
            format!(
                "expected {} targets for {} rows, got {}",
                features.len(),
                features.len(),
                targets.len()
            ),
        ));
    }
    if features.len() < min_rows {
        return Err(RsvpError::InsufficientData {
            required: min_rows,
            actual: features.len(),
        });
    }

    let width = features[0].len();
    for (idx, row) in features.iter().enumerate() {
        if row.len() != width {
            return Err(RsvpError::invalid_parameter(
                "features",
                format!("row {} has {} columns, expected {}", idx, row.len(), width),
            ));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(RsvpError::DataQuality(format!(
                "row {} contains a non-finite feature value",
                idx
            )));
        }
    }
    if targets.iter().any(|v| !v.is_finite()) {
        return Err(RsvpError::DataQuality(
            "targets contain a non-finite value".to_string(),
        ));
    }
    Ok(width)
}

/// Reject a prediction row of the wrong width
pub(crate) fn check_row(row: &[f64], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(RsvpError::ModelExecution(format!(
            "expected {} features, got {}",
            expected,
            row.len()
        )));
    }
    Ok(())
}
