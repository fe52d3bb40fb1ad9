//! Neighbourhood expansion and induced subgraphs.
//!
//! - [`NeighborIndex::k_hop`] - nodes reachable within `k` hops of a seed set
//! - [`induced_edges`] - edges with both endpoints in a node list, relabelled
//! - [`induced_graph`] - the same, plus the sliced feature rows

use crate::graph::{EdgeList, FeatureMatrix, Graph, Label};
use ndarray::Axis;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// Adjacency over a fixed node range for repeated neighbourhood queries.
///
/// Expansion follows messages: a node's neighbourhood is the set of
/// *sources* of edges pointing at it. On a symmetric edge list this is the
/// ordinary undirected neighbourhood.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    graph: DiGraph<(), ()>,
}

impl NeighborIndex {
    /// Index `edges` over nodes `0..num_nodes`.
    ///
    /// Edges referencing nodes at or above `num_nodes` are ignored.
    pub fn new(num_nodes: usize, edges: &EdgeList) -> Self {
        let mut graph = DiGraph::with_capacity(num_nodes, edges.len());
        for _ in 0..num_nodes {
            graph.add_node(());
        }
        for &(s, d) in edges {
            if s < num_nodes && d < num_nodes {
                graph.add_edge(NodeIndex::new(s), NodeIndex::new(d), ());
            }
        }
        Self { graph }
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// All nodes within `hops` hops of `seeds`, seeds included.
    ///
    /// Returned ascending and without duplicates.
    ///
    /// # Complexity
    /// O(hops * edges touched)
    pub fn k_hop(&self, seeds: &[usize], hops: usize) -> Vec<usize> {
        let n = self.num_nodes();
        let mut visited = vec![false; n];
        let mut frontier: Vec<usize> = Vec::with_capacity(seeds.len());
        for &s in seeds {
            if s < n && !visited[s] {
                visited[s] = true;
                frontier.push(s);
            }
        }

        for _ in 0..hops {
            let mut next = Vec::new();
            for &v in &frontier {
                for u in self
                    .graph
                    .neighbors_directed(NodeIndex::new(v), Direction::Incoming)
                {
                    let u = u.index();
                    if !visited[u] {
                        visited[u] = true;
                        next.push(u);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        visited
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Edges of `edges` with both endpoints in `nodes`, relabelled to positions
/// in `nodes`.
///
/// `num_nodes` bounds the original index space. Duplicate entries in `nodes`
/// keep their first position.
pub fn induced_edges(nodes: &[usize], edges: &EdgeList, num_nodes: usize) -> EdgeList {
    let mut position = vec![usize::MAX; num_nodes];
    for (i, &v) in nodes.iter().enumerate() {
        if v < num_nodes && position[v] == usize::MAX {
            position[v] = i;
        }
    }

    edges
        .iter()
        .filter(|&&(s, d)| s < num_nodes && d < num_nodes)
        .filter_map(|&(s, d)| {
            let (ps, pd) = (position[s], position[d]);
            (ps != usize::MAX && pd != usize::MAX).then_some((ps, pd))
        })
        .collect()
}

/// Node-induced subgraph: rows of `x` in `nodes` order plus [`induced_edges`].
pub fn induced_graph(
    x: &FeatureMatrix,
    edges: &EdgeList,
    nodes: &[usize],
    y: Option<Label>,
) -> Graph {
    Graph {
        x: x.select(Axis(0), nodes),
        edge_index: induced_edges(nodes, edges, x.nrows()),
        y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn path() -> EdgeList {
        // 0 - 1 - 2 - 3 - 4 (symmetric)
        EdgeList::from(vec![(0, 1), (1, 2), (2, 3), (3, 4)]).to_undirected()
    }

    #[test]
    fn test_k_hop_grows_with_hops() {
        let index = NeighborIndex::new(5, &path());
        assert_eq!(index.k_hop(&[2], 0), vec![2]);
        assert_eq!(index.k_hop(&[2], 1), vec![1, 2, 3]);
        assert_eq!(index.k_hop(&[2], 2), vec![0, 1, 2, 3, 4]);
        assert_eq!(index.k_hop(&[0, 4], 1), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_k_hop_follows_incoming_edges() {
        // only 0 -> 1
        let index = NeighborIndex::new(3, &EdgeList::from(vec![(0, 1)]));
        assert_eq!(index.k_hop(&[1], 1), vec![0, 1]);
        assert_eq!(index.k_hop(&[0], 1), vec![0]);
    }

    #[test]
    fn test_induced_edges_relabel_by_position() {
        let edges = path();
        let sub = induced_edges(&[3, 1, 2], &edges, 5);
        // 3->2, 2->1 ... relabelled: 3=0, 1=1, 2=2
        let mut pairs = sub.into_inner();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 2), (1, 2), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_induced_graph_slices_features() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let g = induced_graph(&x, &path(), &[4, 3], Some(Label::Class(2)));
        assert_eq!(g.x.column(0).to_vec(), vec![4.0, 3.0]);
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.y, Some(Label::Class(2)));
        assert!(g.validate().is_ok());
    }
}
