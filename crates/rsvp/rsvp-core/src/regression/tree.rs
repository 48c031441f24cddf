//! CART regression tree
//!
//! Splits greedily on the threshold that most reduces squared error. Nodes
//! live in a flat arena indexed by position, root first.

use rsvp_spi::{ForestConfig, Result, RsvpError};
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl From<&ForestConfig> for TreeParams {
    fn from(config: &ForestConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `row[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
        samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    /// Total squared-error reduction credited to each feature
    feature_gains: Vec<f64>,
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree on the given sample indices (duplicates allowed)
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        samples: &[usize],
        params: &TreeParams,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(RsvpError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let n_features = features.first().map_or(0, Vec::len);
        let mut tree = Self {
            nodes: Vec::new(),
            n_features,
            feature_gains: vec![0.0; n_features],
        };
        tree.grow(features, targets, samples.to_vec(), 0, params);
        Ok(tree)
    }

    fn grow(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let n = samples.len();
        let mean = samples.iter().map(|&i| targets[i]).sum::<f64>() / n as f64;

        let node_id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            value: mean,
            samples: n,
        });

        if depth >= params.max_depth || n < params.min_samples_split {
            return node_id;
        }
        let Some(split) = self.best_split(features, targets, &samples, params.min_samples_leaf)
        else {
            return node_id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| features[i][split.feature] <= split.threshold);
        self.feature_gains[split.feature] += split.gain;

        let left_id = self.grow(features, targets, left, depth + 1, params);
        let right_id = self.grow(features, targets, right, depth + 1, params);
        self.nodes[node_id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        node_id
    }

    fn best_split(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        samples: &[usize],
        min_samples_leaf: usize,
    ) -> Option<Split> {
        let n = samples.len();
        let total: f64 = samples.iter().map(|&i| targets[i]).sum();
        let parent_term = total * total / n as f64;
        let min_gain = 1e-9 * (1.0 + parent_term.abs());

        let mut best: Option<Split> = None;
        let mut order = samples.to_vec();
        for feature in 0..self.n_features {
            order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += targets[order[pos]];
                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < min_samples_leaf || right_n < min_samples_leaf {
                    continue;
                }
                let current = features[order[pos]][feature];
                let next = features[order[pos + 1]][feature];
                if next <= current {
                    continue;
                }

                let right_sum = total - left_sum;
                let gain = left_sum * left_sum / left_n as f64
                    + right_sum * right_sum / right_n as f64
                    - parent_term;
                let threshold_to_beat = best.as_ref().map_or(min_gain, |b| b.gain);
                if gain > threshold_to_beat {
                    best = Some(Split {
                        feature,
                        threshold: current + (next - current) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Structural check for trees read back from disk.
    ///
    /// Children always sit after their parent in the arena, which rules out
    /// cycles as well as dangling indices.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(malformed("tree has no nodes"));
        }
        if self.n_features != n_features {
            return Err(malformed(format!(
                "tree expects {} features, forest expects {}",
                self.n_features, n_features
            )));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(malformed(format!(
                        "node {} splits on feature {} of {}",
                        idx, feature, n_features
                    )));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(malformed(format!(
                            "node {} points to child {} of {}",
                            idx,
                            child,
                            self.nodes.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn feature_gains(&self) -> &[f64] {
        &self.feature_gains
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

fn malformed(reason: impl Into<String>) -> RsvpError {
    RsvpError::invalid_parameter("nodes", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    #[test]
    fn test_single_split_on_step_function() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0], vec![12.0]];
        let targets = vec![5.0, 5.0, 5.0, 50.0, 50.0, 50.0];
        let samples: Vec<usize> = (0..6).collect();

        let tree = RegressionTree::fit(&features, &targets, &samples, &params(5)).unwrap();

        match &tree.nodes()[0] {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert!((threshold - 6.5).abs() < 1e-12);
            }
            other => panic!("expected split at root, got {:?}", other),
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(&[0.0]), 5.0);
        assert_eq!(tree.predict_row(&[6.5]), 5.0);
        assert_eq!(tree.predict_row(&[100.0]), 50.0);
    }

    #[test]
    fn test_picks_informative_feature() {
        // Feature 0 is noise, feature 1 decides the target
        let features = vec![
            vec![3.0, 0.0],
            vec![1.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 1.0],
        ];
        let targets = vec![10.0, 10.0, 30.0, 30.0, 10.0, 30.0];
        let samples: Vec<usize> = (0..6).collect();

        let tree = RegressionTree::fit(&features, &targets, &samples, &params(3)).unwrap();

        assert!(matches!(tree.nodes()[0], TreeNode::Split { feature: 1, .. }));
        assert!(tree.feature_gains()[1] > 0.0);
        assert_eq!(tree.feature_gains()[0], 0.0);
    }

    #[test]
    fn test_depth_limit_respected() {
        let features: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..32).map(|i| (i * i) as f64).collect();
        let samples: Vec<usize> = (0..32).collect();

        let tree = RegressionTree::fit(&features, &targets, &samples, &params(3)).unwrap();
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![7.0, 7.0, 7.0];
        let samples = vec![0, 1, 2];

        let tree = RegressionTree::fit(&features, &targets, &samples, &params(4)).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict_row(&[100.0]), 7.0);
    }

    #[test]
    fn test_min_samples_leaf() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let targets = vec![100.0, 0.0, 0.0, 0.0];
        let samples = vec![0, 1, 2, 3];
        let params = TreeParams {
            max_depth: 4,
            min_samples_split: 2,
            min_samples_leaf: 2,
        };

        let tree = RegressionTree::fit(&features, &targets, &samples, &params).unwrap();
        for node in tree.nodes() {
            if let TreeNode::Leaf { samples, .. } = node {
                assert!(*samples >= 2);
            }
        }
    }

    #[test]
    fn test_empty_sample_rejected() {
        let result = RegressionTree::fit(&[vec![1.0]], &[1.0], &[], &params(2));
        assert!(matches!(result, Err(RsvpError::InsufficientData { .. })));
    }

    // ========================================================================
    // Structure checks
    // ========================================================================

    fn fitted_tree() -> RegressionTree {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let targets = vec![5.0, 5.0, 50.0, 50.0];
        RegressionTree::fit(&features, &targets, &[0, 1, 2, 3], &params(3)).unwrap()
    }

    #[test]
    fn test_grown_tree_is_valid() {
        assert!(fitted_tree().validate(1).is_ok());
    }

    #[test]
    fn test_child_out_of_range_rejected() {
        let mut tree = fitted_tree();
        if let TreeNode::Split { right, .. } = &mut tree.nodes[0] {
            *right = 992;
        }
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_back_edge_rejected() {
        let mut tree = fitted_tree();
        if let TreeNode::Split { left, .. } = &mut tree.nodes[0] {
            *left = 0;
        }
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_feature_out_of_range_rejected() {
        let mut tree = fitted_tree();
        if let TreeNode::Split { feature, .. } = &mut tree.nodes[0] {
            *feature = 4;
        }
        assert!(tree.validate(1).is_err());
        assert!(fitted_tree().validate(2).is_err());
    }

    #[test]
    fn test_empty_tree_rejected() {
        let tree = RegressionTree {
            nodes: Vec::new(),
            n_features: 1,
            feature_gains: vec![0.0],
        };
        assert!(tree.validate(1).is_err());
    }
}
