//! Node-labelled source graphs (the input of task sampling).

use crate::graph::{EdgeList, FeatureMatrix};
use crate::{Error, Result};

/// A single large graph with one class label per node and split masks.
///
/// This is the shape citation datasets (Cora, CiteSeer, ...) arrive in.
#[derive(Debug, Clone)]
pub struct LabeledGraph {
    /// Node features, `(num_nodes, feature_dim)`.
    pub x: FeatureMatrix,
    /// Directed edges.
    pub edge_index: EdgeList,
    /// Class of every node.
    pub y: Vec<usize>,
    pub train_mask: Vec<bool>,
    pub val_mask: Vec<bool>,
    pub test_mask: Vec<bool>,
}

impl LabeledGraph {
    /// Build a labelled graph with every node in the training split.
    pub fn new(x: FeatureMatrix, edge_index: EdgeList, y: Vec<usize>) -> Result<Self> {
        let n = x.nrows();
        Self::with_masks(x, edge_index, y, vec![true; n], vec![false; n], vec![false; n])
    }

    /// Build a labelled graph with explicit split masks.
    pub fn with_masks(
        x: FeatureMatrix,
        edge_index: EdgeList,
        y: Vec<usize>,
        train_mask: Vec<bool>,
        val_mask: Vec<bool>,
        test_mask: Vec<bool>,
    ) -> Result<Self> {
        let n = x.nrows();
        for (what, len) in [
            ("labels", y.len()),
            ("train mask", train_mask.len()),
            ("val mask", val_mask.len()),
            ("test mask", test_mask.len()),
        ] {
            if len != n {
                return Err(Error::LengthMismatch {
                    what,
                    expected: n,
                    got: len,
                });
            }
        }
        if let Some(&(src, dst)) = edge_index.iter().find(|&&(s, d)| s >= n || d >= n) {
            return Err(Error::InvalidEdge {
                src,
                dst,
                num_nodes: n,
            });
        }

        Ok(Self {
            x,
            edge_index,
            y,
            train_mask,
            val_mask,
            test_mask,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.x.nrows()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }

    /// `max(label) + 1`, or 0 for a graph without nodes.
    pub fn num_classes(&self) -> usize {
        self.y.iter().max().map_or(0, |&c| c + 1)
    }

    /// Nodes carrying label `class`, ascending.
    pub fn nodes_with_label(&self, class: usize) -> Vec<usize> {
        self.y
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == class)
            .map(|(i, _)| i)
            .collect()
    }

    /// Nodes selected by a mask, ascending.
    pub fn masked_nodes(mask: &[bool]) -> Vec<usize> {
        mask.iter()
            .enumerate()
            .filter(|&(_, &m)| m)
            .map(|(i, _)| i)
            .collect()
    }

    /// Edges whose endpoints both satisfy `keep`.
    pub fn edges_within(&self, keep: &[bool]) -> EdgeList {
        self.edge_index
            .iter()
            .filter(|&&(s, d)| keep[s] && keep[d])
            .copied()
            .collect()
    }

    /// Average out-degree.
    pub fn average_degree(&self) -> f32 {
        if self.num_nodes() == 0 {
            return 0.0;
        }
        self.num_edges() as f32 / self.num_nodes() as f32
    }
}
