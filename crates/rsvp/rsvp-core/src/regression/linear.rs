//! Ridge-stabilised linear regression

use rsvp_spi::{LinearConfig, Regressor, Result, RsvpError};
use serde::{Deserialize, Serialize};

use super::{check_row, check_training_data};

/// Ordinary least squares with a small L2 penalty.
///
/// Columns are standardized before solving so the penalty treats them
/// evenly; the fitted coefficients are folded back to the raw scale. The
/// penalty keeps collinear one-hot groups solvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    l2_penalty: f64,
    coefficients: Vec<f64>,
    intercept: f64,
    r_squared: f64,
    fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::with_penalty(LinearConfig::default().l2_penalty)
    }
}

impl LinearRegression {
    pub fn new(config: &LinearConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_penalty(config.l2_penalty))
    }

    fn with_penalty(l2_penalty: f64) -> Self {
        Self {
            l2_penalty,
            coefficients: Vec::new(),
            intercept: 0.0,
            r_squared: 0.0,
            fitted: false,
        }
    }

    /// Raw-scale coefficients, one per column
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// In-sample coefficient of determination
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        let width = check_training_data(features, targets, 2)?;
        let n = features.len() as f64;

        let mut means = vec![0.0; width];
        for row in features {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / n;
            }
        }
        let mut scales = vec![0.0; width];
        for row in features {
            for j in 0..width {
                scales[j] += (row[j] - means[j]).powi(2) / n;
            }
        }
        for scale in &mut scales {
            *scale = scale.sqrt();
            // constant column: leave unscaled, the penalty pins it to zero
            if *scale < 1e-12 {
                *scale = 1.0;
            }
        }
        let target_mean = targets.iter().sum::<f64>() / n;

        let mut gram = vec![vec![0.0; width]; width];
        let mut rhs = vec![0.0; width];
        let mut z = vec![0.0; width];
        for (row, &y) in features.iter().zip(targets) {
            for j in 0..width {
                z[j] = (row[j] - means[j]) / scales[j];
            }
            for i in 0..width {
                rhs[i] += z[i] * (y - target_mean);
                for j in 0..width {
                    gram[i][j] += z[i] * z[j];
                }
            }
        }
        for (i, row) in gram.iter_mut().enumerate() {
            row[i] += self.l2_penalty;
        }

        let beta = solve(gram, rhs)?;

        self.coefficients = beta
            .iter()
            .zip(&scales)
            .map(|(b, scale)| b / scale)
            .collect();
        self.intercept = target_mean
            - self
                .coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();
        self.fitted = true;

        let predictions = self.predict(features)?;
        let ss_res: f64 = targets
            .iter()
            .zip(&predictions)
            .map(|(y, p)| (y - p).powi(2))
            .sum();
        let ss_tot: f64 = targets.iter().map(|y| (y - target_mean).powi(2)).sum();
        self.r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(RsvpError::NotFitted);
        }
        check_row(row, self.coefficients.len())?;

        let value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        if !value.is_finite() {
            return Err(RsvpError::ModelExecution(
                "linear model produced a non-finite value".to_string(),
            ));
        }
        Ok(value)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(RsvpError::NumericalError(
                "normal equations are singular".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_linear_relation() {
        // y = 3 + 2a - b
        let features: Vec<Vec<f64>> = vec![
            vec![1.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 5.0],
            vec![4.0, 2.0],
            vec![5.0, 7.0],
            vec![6.0, 3.0],
        ];
        let targets: Vec<f64> = features.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();

        let mut model = LinearRegression::new(&LinearConfig { l2_penalty: 1e-9 }).unwrap();
        model.fit(&features, &targets).unwrap();

        assert!((model.coefficients()[0] - 2.0).abs() < 1e-4);
        assert!((model.coefficients()[1] + 1.0).abs() < 1e-4);
        assert!((model.intercept() - 3.0).abs() < 1e-3);
        assert!(model.r_squared() > 0.999_999);
        assert!((model.predict_row(&[10.0, 4.0]).unwrap() - 19.0).abs() < 1e-3);
    }

    #[test]
    fn test_collinear_one_hot_group_is_solvable() {
        // Two indicator columns that always sum to one, plus an intercept
        let features = vec![
            vec![100.0, 1.0, 0.0],
            vec![200.0, 0.0, 1.0],
            vec![300.0, 1.0, 0.0],
            vec![400.0, 0.0, 1.0],
        ];
        let targets = vec![90.0, 170.0, 270.0, 350.0];

        let mut model = LinearRegression::default();
        model.fit(&features, &targets).unwrap();

        let predictions = model.predict(&features).unwrap();
        for (p, y) in predictions.iter().zip(&targets) {
            assert!((p - y).abs() < 1.0, "prediction {} vs {}", p, y);
        }
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let features = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let targets = vec![2.0, 4.0, 6.0];

        let mut model = LinearRegression::default();
        model.fit(&features, &targets).unwrap();
        assert!(model.coefficients()[1].abs() < 1e-9);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LinearRegression::default();
        assert!(matches!(model.predict_row(&[1.0]), Err(RsvpError::NotFitted)));
    }

    #[test]
    fn test_wrong_row_width() {
        let mut model = LinearRegression::default();
        model
            .fit(&[vec![1.0], vec![2.0], vec![3.0]], &[1.0, 2.0, 3.0])
            .unwrap();
        assert!(matches!(
            model.predict_row(&[1.0, 2.0]),
            Err(RsvpError::ModelExecution(_))
        ));
    }
}
