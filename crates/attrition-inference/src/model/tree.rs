//! Regression trees stored as flat node lists.

use serde::{Deserialize, Serialize};

/// One node of a regression tree.
///
/// Child indices point into the owning tree's node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Go to `left` if `features[feature] <= threshold`, else to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<Node>,
}

/// A regression tree whose root is node 0.
///
/// Every split's children lie after the split in the node list, so traversal
/// always moves forward and terminates at a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct Tree {
    nodes: Vec<Node>,
}

impl TryFrom<RawTree> for Tree {
    type Error = String;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        Tree::new(raw.nodes)
    }
}

impl Tree {
    /// Build a tree, checking node links and values.
    pub fn new(nodes: Vec<Node>) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= nodes.len() {
                            return Err(format!(
                                "node {} links to node {} (must be in {}..{})",
                                idx,
                                child,
                                idx + 1,
                                nodes.len()
                            ));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", idx));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Largest feature index used by a split.
    pub fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .max()
    }

    /// Number of splits on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                depths[left] = depths[left].max(depths[idx] + 1);
                depths[right] = depths[right].max(depths[idx] + 1);
            }
        }
        depths.into_iter().max().unwrap_or(0)
    }

    /// Leaf value reached by `features`.
    ///
    /// Callers guarantee `features` covers every split feature.
    pub(crate) fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        Tree::new(vec![
            Node::Split {
                feature: 1,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: -1.0 },
            Node::Leaf { value: 2.0 },
        ])
        .unwrap()
    }

    #[test]
    fn test_threshold_goes_left() {
        let tree = stump();
        assert_eq!(tree.predict(&[9.0, 0.5]), -1.0);
        assert_eq!(tree.predict(&[9.0, 0.49]), -1.0);
        assert_eq!(tree.predict(&[9.0, 0.51]), 2.0);
    }

    #[test]
    fn test_depth_and_max_feature() {
        let tree = stump();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.max_feature(), Some(1));

        let leaf = Tree::new(vec![Node::Leaf { value: 0.3 }]).unwrap();
        assert_eq!(leaf.depth(), 0);
        assert_eq!(leaf.max_feature(), None);
        assert_eq!(leaf.predict(&[]), 0.3);
    }

    #[test]
    fn test_backward_link_rejected() {
        let err = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 1.0,
                left: 1,
                right: 0,
            },
            Node::Leaf { value: 1.0 },
        ])
        .unwrap_err();
        assert!(err.contains("node 0 links to node 0"));
    }

    #[test]
    fn test_dangling_link_rejected() {
        let result = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 1.0,
                left: 1,
                right: 5,
            },
            Node::Leaf { value: 1.0 },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_tree_rejected() {
        assert!(Tree::new(Vec::new()).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{ "nodes": [
            { "type": "split", "feature": 0, "threshold": 0.2, "left": 1, "right": 2 },
            { "type": "leaf", "value": 0.7 },
            { "type": "leaf", "value": -0.4 }
        ] }"#;
        let tree: Tree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.nodes().len(), 3);

        let bad = r#"{ "nodes": [ { "type": "split", "feature": 0, "threshold": 0.2, "left": 0, "right": 0 } ] }"#;
        assert!(serde_json::from_str::<Tree>(bad).is_err());
    }
}
