//! Regressor contract
//!
//! Defines the fit-predict interface that the trainer and the prediction
//! service use without knowing which model sits behind it.

use crate::error::Result;

/// A supervised regression model over dense numeric rows
///
/// Rows passed to [`Regressor::predict_row`] must have the same width as the
/// rows the model was fitted on.
///
/// # Example
///
/// ```rust,ignore
/// use rsvp_spi::Regressor;
///
/// fn fit_and_score<R: Regressor>(model: &mut R, x: &[Vec<f64>], y: &[f64]) -> rsvp_spi::Result<Vec<f64>> {
///     model.fit(x, y)?;
///     model.predict(x)
/// }
/// ```
pub trait Regressor: Send + Sync {
    /// Fit the model to a feature matrix (one row per sample) and targets
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict the target for a single row
    fn predict_row(&self, row: &[f64]) -> Result<f64>;

    /// Predict the target for every row
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        features.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;

    /// Width of the rows the model was fitted on (0 before fitting)
    fn n_features(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RsvpError;

    // ==========================================================================
    // Mock Implementation for Testing the Trait Definition
    // ==========================================================================

    /// Predicts the mean target regardless of the row
    struct MockMeanRegressor {
        mean: Option<f64>,
        width: usize,
    }

    impl Regressor for MockMeanRegressor {
        fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
            if features.len() != targets.len() || targets.is_empty() {
                return Err(RsvpError::InsufficientData {
                    required: 1,
                    actual: targets.len(),
                });
            }
            self.width = features[0].len();
            self.mean = Some(targets.iter().sum::<f64>() / targets.len() as f64);
            Ok(())
        }

        fn predict_row(&self, row: &[f64]) -> Result<f64> {
            let mean = self.mean.ok_or(RsvpError::NotFitted)?;
            if row.len() != self.width {
                return Err(RsvpError::ModelExecution(format!(
                    "expected {} features, got {}",
                    self.width,
                    row.len()
                )));
            }
            Ok(mean)
        }

        fn is_fitted(&self) -> bool {
            self.mean.is_some()
        }

        fn n_features(&self) -> usize {
            self.width
        }
    }

    #[test]
    fn test_default_predict_maps_rows() {
        let mut model = MockMeanRegressor {
            mean: None,
            width: 0,
        };
        let x = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        model.fit(&x, &[10.0, 20.0]).unwrap();

        assert!(model.is_fitted());
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.predict(&x).unwrap(), vec![15.0, 15.0]);
    }

    #[test]
    fn test_default_predict_propagates_errors() {
        let mut model = MockMeanRegressor {
            mean: None,
            width: 0,
        };
        model.fit(&[vec![1.0, 2.0]], &[10.0]).unwrap();

        let result = model.predict(&[vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(result, Err(RsvpError::ModelExecution(_))));
    }

    #[test]
    fn test_unfitted_regressor_errors() {
        let model = MockMeanRegressor {
            mean: None,
            width: 0,
        };
        assert_eq!(model.predict_row(&[]), Err(RsvpError::NotFitted));
    }

    #[test]
    fn test_trait_object_usage() {
        let mut model: Box<dyn Regressor> = Box::new(MockMeanRegressor {
            mean: None,
            width: 0,
        });
        model.fit(&[vec![0.0]], &[3.0]).unwrap();
        assert_eq!(model.predict_row(&[9.0]).unwrap(), 3.0);
    }
}
