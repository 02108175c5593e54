//! CART decision tree stored as a flat node table.
//!
//! The root is node `0`. A split sends the sample to `left` when
//! `x[feature] <= threshold` and to `right` otherwise. Leaves hold the per-class
//! training weights that reached them; their normalized values are the class probabilities.

use super::Classify;
use crate::error::PredictionError;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DecisionTreeParams", into = "DecisionTreeParams")]
pub struct DecisionTreeClassifier {
    n_features: usize,
    n_classes: usize,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTreeParams {
    n_features: usize,
    n_classes: usize,
    nodes: Vec<TreeNode>,
}

impl TryFrom<DecisionTreeParams> for DecisionTreeClassifier {
    type Error = String;

    fn try_from(params: DecisionTreeParams) -> Result<Self, Self::Error> {
        DecisionTreeClassifier::new(params.n_features, params.n_classes, params.nodes)
    }
}

impl From<DecisionTreeClassifier> for DecisionTreeParams {
    fn from(tree: DecisionTreeClassifier) -> Self {
        DecisionTreeParams {
            n_features: tree.n_features,
            n_classes: tree.n_classes,
            nodes: tree.nodes,
        }
    }
}

impl DecisionTreeClassifier {
    /// Builds a tree after checking that every path from the root ends in a leaf.
    ///
    /// Children must come after their parent in the table, which rules out cycles.
    pub fn new(n_features: usize, n_classes: usize, nodes: Vec<TreeNode>) -> Result<Self, String> {
        if n_features == 0 || n_classes == 0 {
            return Err("decision tree needs at least one feature and one class".to_string());
        }
        if nodes.is_empty() {
            return Err("decision tree has no nodes".to_string());
        }
        for (i, node) in nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {i} splits on feature {feature} but the tree has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {i} has {} class weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {i} has invalid class weights"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {i} carries no weight"));
                    }
                }
            }
        }
        Ok(Self {
            n_features,
            n_classes,
            nodes,
        })
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Class weights of the leaf reached by `x`.
    fn leaf_for(&self, x: ArrayView1<'_, f64>) -> Result<&[f64], PredictionError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).ok_or_else(|| {
                        PredictionError::Inference(format!("missing feature {feature}"))
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value),
                None => {
                    return Err(PredictionError::Inference(format!(
                        "tree walked to missing node {index}"
                    )));
                }
            }
        }
    }
}

impl Classify for DecisionTreeClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>, PredictionError> {
        let weights = Array1::from(self.leaf_for(x)?.to_vec());
        let total = weights.sum();
        Ok(weights / total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_types::json::{self, json};
    use ndarray::array;

    fn stump() -> DecisionTreeClassifier {
        DecisionTreeClassifier::new(
            2,
            2,
            vec![
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: vec![3.0, 1.0],
                },
                TreeNode::Leaf {
                    value: vec![0.0, 5.0],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_threshold_is_inclusive_on_the_left() {
        let tree = stump();
        let (index, proba) = tree.predict(array![9.0, 0.5].view()).unwrap();
        assert_eq!(index, 0);
        assert_eq!(proba, array![0.75, 0.25]);

        let (index, proba) = tree.predict(array![9.0, 0.51].view()).unwrap();
        assert_eq!(index, 1);
        assert_eq!(proba, array![0.0, 1.0]);
    }

    #[test]
    fn test_rejects_cycles_and_dangling_children() {
        let cycle = DecisionTreeClassifier::new(
            1,
            1,
            vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        );
        assert!(cycle.is_err());

        let dangling = DecisionTreeClassifier::new(
            1,
            1,
            vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 1,
                right: 7,
            }],
        );
        assert!(dangling.is_err());
    }

    #[test]
    fn test_rejects_bad_leaves() {
        let wrong_width =
            DecisionTreeClassifier::new(1, 3, vec![TreeNode::Leaf { value: vec![1.0] }]);
        assert!(wrong_width.is_err());

        let zero_leaf = TreeNode::Leaf {
            value: vec![0.0, 0.0],
        };
        let empty = DecisionTreeClassifier::new(1, 2, vec![zero_leaf]);
        assert!(empty.is_err());
    }

    #[test]
    fn test_deserializes_node_table() {
        let tree: DecisionTreeClassifier = json::from_value(json!({
            "n_features": 2,
            "n_classes": 2,
            "nodes": [
                {"kind": "split", "feature": 1, "threshold": 0.5, "left": 1, "right": 2},
                {"kind": "leaf", "value": [3.0, 1.0]},
                {"kind": "leaf", "value": [0.0, 5.0]}
            ]
        }))
        .unwrap();
        assert_eq!(tree, stump());

        let bad: Result<DecisionTreeClassifier, _> = json::from_value(json!({
            "n_features": 1,
            "n_classes": 2,
            "nodes": [{"kind": "split", "feature": 3, "threshold": 0.5, "left": 1, "right": 2}]
        }));
        assert!(bad.is_err());
    }
}
