use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Node feature matrix: one row per node, one column per feature.
pub type FeatureMatrix = Array2<f32>;

/// Directed edge list over local node indices.
///
/// Order is preserved; callers that need a symmetric graph call
/// [`EdgeList::to_undirected`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeList(Vec<(usize, usize)>);

impl EdgeList {
    /// Create an empty edge list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, src: usize, dst: usize) {
        self.0.push((src, dst));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (usize, usize)> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[(usize, usize)] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<(usize, usize)> {
        self.0
    }

    /// Append every edge of `other`, keeping order.
    pub fn extend_from(&mut self, other: &EdgeList) {
        self.0.extend_from_slice(&other.0);
    }

    /// Both endpoints shifted by `offset`.
    pub fn shifted(&self, offset: usize) -> Self {
        self.0.iter().map(|&(s, d)| (s + offset, d + offset)).collect()
    }

    /// Only the target endpoint shifted by `offset`.
    ///
    /// Used for bipartite edges whose source side already lives in the
    /// leading index block.
    pub fn shift_targets(&self, offset: usize) -> Self {
        self.0.iter().map(|&(s, d)| (s, d + offset)).collect()
    }

    /// Largest node index referenced, if any.
    pub fn max_node(&self) -> Option<usize> {
        self.0.iter().map(|&(s, d)| s.max(d)).max()
    }

    /// Add the reverse of every edge, then sort and drop duplicates.
    pub fn to_undirected(&self) -> Self {
        let mut pairs: Vec<(usize, usize)> = self
            .0
            .iter()
            .flat_map(|&(s, d)| [(s, d), (d, s)])
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        Self(pairs)
    }

    /// Sources and targets as two `u32` rows (the `2 x E` layout GNN layers expect).
    pub fn to_index_rows(&self) -> (Vec<u32>, Vec<u32>) {
        self.0
            .iter()
            .map(|&(s, d)| (s as u32, d as u32))
            .unzip()
    }
}

impl From<Vec<(usize, usize)>> for EdgeList {
    fn from(pairs: Vec<(usize, usize)>) -> Self {
        Self(pairs)
    }
}

impl FromIterator<(usize, usize)> for EdgeList {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EdgeList {
    type Item = &'a (usize, usize);
    type IntoIter = std::slice::Iter<'a, (usize, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Graph-level label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Label {
    /// Single class index.
    Class(usize),
    /// Dense label vector (multi-label / one-hot targets).
    Vector(Vec<f32>),
}

impl Label {
    /// Class index, if this is a [`Label::Class`].
    pub fn class(&self) -> Option<usize> {
        match self {
            Label::Class(c) => Some(*c),
            Label::Vector(_) => None,
        }
    }
}

impl From<usize> for Label {
    fn from(class: usize) -> Self {
        Label::Class(class)
    }
}

/// A small attributed graph with local, contiguous node indices.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use promptix_core::{EdgeList, Graph, Label};
///
/// let g = Graph::new(
///     array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
///     EdgeList::from(vec![(0, 1), (1, 2)]),
///     Some(Label::Class(0)),
/// )
/// .unwrap();
///
/// assert_eq!(g.num_nodes(), 3);
/// assert_eq!(g.num_edges(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Node features, `(num_nodes, feature_dim)`.
    pub x: FeatureMatrix,
    /// Directed edges between rows of `x`.
    pub edge_index: EdgeList,
    /// Optional graph label.
    pub y: Option<Label>,
}

impl Graph {
    /// Build a graph, rejecting edges that point outside `x`.
    pub fn new(x: FeatureMatrix, edge_index: EdgeList, y: Option<Label>) -> Result<Self> {
        let graph = Self { x, edge_index, y };
        graph.validate()?;
        Ok(graph)
    }

    /// Graph with no nodes and no edges.
    pub fn empty(feature_dim: usize) -> Self {
        Self {
            x: FeatureMatrix::zeros((0, feature_dim)),
            edge_index: EdgeList::new(),
            y: None,
        }
    }

    /// Check that every edge endpoint indexes a row of `x`.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_nodes();
        match self.edge_index.iter().find(|&&(s, d)| s >= n || d >= n) {
            Some(&(src, dst)) => Err(Error::InvalidEdge {
                src,
                dst,
                num_nodes: n,
            }),
            None => Ok(()),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.x.nrows()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }

    pub fn feature_dim(&self) -> usize {
        self.x.ncols()
    }

    pub fn with_label(mut self, y: impl Into<Label>) -> Self {
        self.y = Some(y.into());
        self
    }
}
