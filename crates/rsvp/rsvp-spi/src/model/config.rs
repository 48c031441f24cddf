//! Training configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RsvpError};

// ============================================================================
// Forest Configuration
// ============================================================================

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Minimum samples a node needs before it may be split.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
    /// Draw a bootstrap sample per tree.
    pub bootstrap: bool,
    /// Base RNG seed; tree `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 3,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(RsvpError::invalid_parameter("n_trees", "must be at least 1"));
        }
        if self.max_depth == 0 {
            return Err(RsvpError::invalid_parameter("max_depth", "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(RsvpError::invalid_parameter(
                "min_samples_split",
                "must be at least 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(RsvpError::invalid_parameter(
                "min_samples_leaf",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Linear Configuration
// ============================================================================

/// Linear model hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// L2 penalty applied to standardized coefficients. Keeps the normal
    /// equations solvable when one-hot groups are collinear.
    pub l2_penalty: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self { l2_penalty: 1e-3 }
    }
}

impl LinearConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.l2_penalty.is_finite() || self.l2_penalty <= 0.0 {
            return Err(RsvpError::invalid_parameter(
                "l2_penalty",
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Training Configuration
// ============================================================================

/// End-to-end training configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub forest: ForestConfig,
    pub linear: LinearConfig,
    /// Fewer usable rows than this aborts training.
    pub min_rows: usize,
    /// Year attached to `DD-Mon` dates in historical data.
    pub reference_year: i32,
    /// Confidence level of the persisted prediction bound.
    pub confidence_level: f64,
    /// Explicit version token; defaults to the training timestamp.
    pub model_version: Option<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            linear: LinearConfig::default(),
            min_rows: 5,
            reference_year: 2025,
            confidence_level: 0.95,
            model_version: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        self.forest.validate()?;
        self.linear.validate()?;
        if self.min_rows < 2 {
            return Err(RsvpError::invalid_parameter("min_rows", "must be at least 2"));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(RsvpError::invalid_parameter(
                "confidence_level",
                "must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = TrainingConfig::default();
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.max_depth, 10);
        assert_eq!(config.forest.min_samples_split, 3);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.min_rows, 5);
        assert_eq!(config.reference_year, 2025);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trees_rejected() {
        let mut config = TrainingConfig::default();
        config.forest.n_trees = 0;
        assert!(matches!(
            config.validate(),
            Err(RsvpError::InvalidParameter { name, .. }) if name == "n_trees"
        ));
    }

    #[test]
    fn test_non_positive_penalty_rejected() {
        let config = LinearConfig { l2_penalty: 0.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_confidence_level_bounds() {
        let mut config = TrainingConfig::default();
        config.confidence_level = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"forest": {"n_trees": 10}, "min_rows": 8}"#).unwrap();
        assert_eq!(config.forest.n_trees, 10);
        assert_eq!(config.forest.max_depth, 10);
        assert_eq!(config.min_rows, 8);
        assert_eq!(config.linear, LinearConfig::default());
    }
}
