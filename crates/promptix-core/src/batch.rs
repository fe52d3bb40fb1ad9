//! Collating many small graphs into one disjoint-union graph.
//!
//! Node features are stacked in graph order, edges are shifted by the
//! cumulative node count of the graphs before them, and a `batch` vector
//! records which graph owns each node (the input of global pooling).
//!
//! ```text
//! graph 0: 2 nodes, edges (0,1)
//! graph 1: 3 nodes, edges (0,2)
//!
//! batch     = [0, 0, 1, 1, 1]
//! ptr       = [0, 2, 5]
//! edges     = (0,1), (2,4)
//! edge_ptr  = [0, 1, 2]
//! ```

use crate::graph::{EdgeList, FeatureMatrix, Graph, Label};
use crate::{Error, Result};
use ndarray::{s, Axis};

/// Index bookkeeping shared by every batched graph representation.
///
/// Kept separate from the feature storage so that tensor-valued batches
/// (prompted graphs) reuse the same offsets as array-valued ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchLayout {
    /// Concatenated, offset-shifted edges.
    pub edge_index: EdgeList,
    /// Owning graph of every node; non-decreasing.
    pub batch: Vec<usize>,
    /// Node offsets, `num_graphs + 1` entries.
    pub ptr: Vec<usize>,
    /// Edge offsets, `num_graphs + 1` entries.
    pub edge_ptr: Vec<usize>,
}

impl BatchLayout {
    /// Collate `(num_nodes, edges)` pairs in order.
    pub fn collate<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a EdgeList)>,
    {
        let mut layout = Self {
            ptr: vec![0],
            edge_ptr: vec![0],
            ..Self::default()
        };

        for (graph_id, (num_nodes, edges)) in parts.into_iter().enumerate() {
            let offset = layout.num_nodes();
            layout.edge_index.extend_from(&edges.shifted(offset));
            layout.batch.extend(std::iter::repeat(graph_id).take(num_nodes));
            layout.ptr.push(offset + num_nodes);
            layout.edge_ptr.push(layout.edge_index.len());
        }

        layout
    }

    pub fn num_graphs(&self) -> usize {
        self.ptr.len().saturating_sub(1)
    }

    pub fn num_nodes(&self) -> usize {
        self.ptr.last().copied().unwrap_or(0)
    }

    /// Edges of graph `i`, shifted back to local indices.
    pub fn local_edges(&self, i: usize) -> EdgeList {
        let offset = self.ptr[i];
        self.edge_index.as_slice()[self.edge_ptr[i]..self.edge_ptr[i + 1]]
            .iter()
            .map(|&(s, d)| (s - offset, d - offset))
            .collect()
    }

    /// Number of nodes owned by each graph.
    pub fn graph_sizes(&self) -> Vec<usize> {
        self.ptr.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// A batch of [`Graph`]s stored as one disjoint-union graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBatch {
    /// Stacked node features.
    pub x: FeatureMatrix,
    /// Offsets and shifted edges.
    pub layout: BatchLayout,
    /// One label slot per graph.
    pub y: Vec<Option<Label>>,
}

impl GraphBatch {
    /// Collate graphs in order.
    ///
    /// All graphs must share the same feature width.
    pub fn from_graphs(graphs: &[Graph]) -> Result<Self> {
        let dim = graphs.first().map_or(0, Graph::feature_dim);
        if let Some(g) = graphs.iter().find(|g| g.feature_dim() != dim) {
            return Err(Error::LengthMismatch {
                what: "feature dimension",
                expected: dim,
                got: g.feature_dim(),
            });
        }

        let layout = BatchLayout::collate(graphs.iter().map(|g| (g.num_nodes(), &g.edge_index)));

        let views: Vec<_> = graphs.iter().map(|g| g.x.view()).collect();
        let x = if views.is_empty() {
            FeatureMatrix::zeros((0, 0))
        } else {
            ndarray::concatenate(Axis(0), &views)?
        };

        Ok(Self {
            x,
            layout,
            y: graphs.iter().map(|g| g.y.clone()).collect(),
        })
    }

    pub fn num_graphs(&self) -> usize {
        self.layout.num_graphs()
    }

    pub fn num_nodes(&self) -> usize {
        self.layout.num_nodes()
    }

    pub fn edge_index(&self) -> &EdgeList {
        &self.layout.edge_index
    }

    pub fn batch(&self) -> &[usize] {
        &self.layout.batch
    }

    /// Graph `i` with local indices restored.
    pub fn get(&self, i: usize) -> Option<Graph> {
        if i >= self.num_graphs() {
            return None;
        }
        let (start, end) = (self.layout.ptr[i], self.layout.ptr[i + 1]);
        Some(Graph {
            x: self.x.slice(s![start..end, ..]).to_owned(),
            edge_index: self.layout.local_edges(i),
            y: self.y[i].clone(),
        })
    }

    /// Split the batch back into its graphs.
    pub fn to_graphs(&self) -> Vec<Graph> {
        (0..self.num_graphs()).filter_map(|i| self.get(i)).collect()
    }
}
