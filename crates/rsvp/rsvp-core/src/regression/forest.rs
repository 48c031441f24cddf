//! Random forest regression
//!
//! Bagged ensemble of [`RegressionTree`]s grown in parallel. Tree `i` draws
//! its bootstrap sample from an RNG seeded with `seed + i`, so a fit is
//! reproducible regardless of thread scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rsvp_spi::{ForestConfig, Regressor, Result, RsvpError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::{RegressionTree, TreeParams};
use super::{check_row, check_training_data};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    oob_rmse: Option<f64>,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            oob_rmse: None,
            feature_importances: Vec::new(),
        })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// RMSE of out-of-bag predictions; `None` without bootstrap or when no
    /// row was ever left out
    pub fn oob_rmse(&self) -> Option<f64> {
        self.oob_rmse
    }

    /// Impurity-based importances, normalized to sum to one
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Check every tree against the forest's feature width
    pub fn validate(&self) -> Result<()> {
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                RsvpError::invalid_parameter("trees", format!("tree {}: {}", idx, e))
            })?;
        }
        Ok(())
    }
}

/// Bootstrap sample for tree `tree_idx` and its in-bag mask
fn draw_sample(config: &ForestConfig, n: usize, tree_idx: usize) -> (Vec<usize>, Vec<bool>) {
    if !config.bootstrap {
        return ((0..n).collect(), vec![true; n]);
    }
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_idx as u64));
    let mut in_bag = vec![false; n];
    let samples = (0..n)
        .map(|_| {
            let idx = rng.gen_range(0..n);
            in_bag[idx] = true;
            idx
        })
        .collect();
    (samples, in_bag)
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        let width = check_training_data(features, targets, 2)?;
        let n = targets.len();
        let params = TreeParams::from(&self.config);
        let config = &self.config;

        let grown: Vec<(RegressionTree, Vec<bool>)> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let (samples, in_bag) = draw_sample(config, n, tree_idx);
                RegressionTree::fit(features, targets, &samples, &params).map(|tree| (tree, in_bag))
            })
            .collect::<Result<_>>()?;

        // Out-of-bag error
        let mut oob_sum = vec![0.0; n];
        let mut oob_count = vec![0usize; n];
        for (tree, in_bag) in &grown {
            for row in 0..n {
                if !in_bag[row] {
                    oob_sum[row] += tree.predict_row(&features[row]);
                    oob_count[row] += 1;
                }
            }
        }
        let (sq_err, covered) = (0..n)
            .filter(|&row| oob_count[row] > 0)
            .fold((0.0, 0usize), |(acc, count), row| {
                let pred = oob_sum[row] / oob_count[row] as f64;
                (acc + (pred - targets[row]).powi(2), count + 1)
            });
        self.oob_rmse = (covered > 0).then(|| (sq_err / covered as f64).sqrt());

        let mut gains = vec![0.0; width];
        for (tree, _) in &grown {
            for (total, gain) in gains.iter_mut().zip(tree.feature_gains()) {
                *total += gain;
            }
        }
        let total_gain: f64 = gains.iter().sum();
        if total_gain > 0.0 {
            for gain in &mut gains {
                *gain /= total_gain;
            }
        }

        self.trees = grown.into_iter().map(|(tree, _)| tree).collect();
        self.n_features = width;
        self.feature_importances = gains;

        debug!(
            trees = self.trees.len(),
            features = width,
            oob_rmse = ?self.oob_rmse,
            "random forest fitted"
        );
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(RsvpError::NotFitted);
        }
        check_row(row, self.n_features)?;

        let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
        let value = sum / self.trees.len() as f64;
        if !value.is_finite() {
            return Err(RsvpError::ModelExecution(
                "random forest produced a non-finite value".to_string(),
            ));
        }
        Ok(value)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
