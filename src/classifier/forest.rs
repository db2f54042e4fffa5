//! Random forest inference
//!
//! Trees use the flat array layout scikit-learn exposes as `tree_`: node `i`
//! splits on `feature[i]` at `threshold[i]` (go left when `x <= threshold`),
//! leaves have `children_left[i] == -1`, and `value[i]` holds per-class
//! weights. Forest probabilities are the mean of the per-tree leaf
//! distributions.

use serde::{Deserialize, Serialize};

use super::ProbabilisticModel;

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `[n_nodes][n_classes]`
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// A tree with a single leaf
    pub fn leaf(value: Vec<f64>) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_classes: usize, n_features: Option<usize>) -> Result<(), String> {
        let n = self.n_nodes();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("tree arrays disagree on node count ({n})"));
        }

        for i in 0..n {
            if self.value[i].len() != n_classes {
                return Err(format!(
                    "node {i} has {} class weights, expected {n_classes}",
                    self.value[i].len()
                ));
            }
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {i} has only one child"));
                }
                continue;
            }
            // Children always come after their parent, which rules out cycles
            for child in [left, right] {
                if child <= i as i64 || child as usize >= n {
                    return Err(format!("node {i} has invalid child {child}"));
                }
            }
            let feature = self.feature[i];
            if feature < 0 {
                return Err(format!("split node {i} has negative feature index"));
            }
            if let Some(width) = n_features {
                if feature as usize >= width {
                    return Err(format!(
                        "node {i} splits on feature {feature}, model has {width}"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Index of the leaf reached by `features`
    pub fn apply(&self, features: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features
                .get(self.feature[node] as usize)
                .copied()
                .unwrap_or(0.0);
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Normalized class distribution at the reached leaf
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let weights = &self.value[self.apply(features)];
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            weights.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Class labels in distribution order, e.g. `[0, 1]`
    pub classes: Vec<i64>,
    #[serde(default)]
    pub n_features: Option<usize>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("random forest has no classes".into());
        }
        if self.trees.is_empty() {
            return Err("random forest has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.classes.len(), self.n_features)
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}

impl ProbabilisticModel for RandomForest {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(features)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x[0] <= 0.5 -> mostly dissimilar, else mostly similar
    fn stump() -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![5.0, 5.0], vec![4.0, 1.0], vec![1.0, 4.0]],
        }
    }

    #[test]
    fn test_tree_routes_on_threshold() {
        let tree = stump();
        assert_eq!(tree.apply(&[0.5]), 1);
        assert_eq!(tree.apply(&[0.9]), 2);
        assert_eq!(tree.predict_proba(&[0.0]), vec![0.8, 0.2]);
        // Missing features read as zero
        assert_eq!(tree.apply(&[]), 1);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest {
            classes: vec![0, 1],
            n_features: Some(1),
            trees: vec![stump(), DecisionTree::leaf(vec![0.0, 1.0])],
        };
        forest.validate().unwrap();
        let proba = forest.predict_proba(&[1.0]);
        assert!((proba[0] - 0.1).abs() < 1e-9);
        assert!((proba[1] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_forest() {
        let forest = RandomForest {
            classes: vec![1],
            n_features: None,
            trees: vec![DecisionTree::leaf(vec![3.0])],
        };
        forest.validate().unwrap();
        assert_eq!(forest.predict_proba(&[0.0]), vec![1.0]);
    }

    #[test]
    fn test_validation_rejects_malformed_trees() {
        let mut tree = stump();
        tree.children_left[0] = 0;
        let forest = RandomForest {
            classes: vec![0, 1],
            n_features: None,
            trees: vec![tree],
        };
        assert!(forest.validate().unwrap_err().contains("invalid child"));

        let forest = RandomForest {
            classes: vec![0, 1],
            n_features: Some(1),
            trees: vec![DecisionTree::leaf(vec![1.0])],
        };
        assert!(forest.validate().unwrap_err().contains("class weights"));

        let mut tree = stump();
        tree.feature[0] = 4;
        let forest = RandomForest {
            classes: vec![0, 1],
            n_features: Some(2),
            trees: vec![tree],
        };
        assert!(forest.validate().unwrap_err().contains("splits on feature"));

        let forest = RandomForest {
            classes: vec![0, 1],
            n_features: None,
            trees: vec![],
        };
        assert!(forest.validate().is_err());
    }
}
