//! Graph augmentations for contrastive pretraining.
//!
//! Each operator consumes a graph and returns the perturbed view:
//!
//! | Operator | Nodes | Edges | Features |
//! |----------|-------|-------|----------|
//! | [`drop_nodes`] | `floor(N * r)` removed | incident edges removed | survivors' rows |
//! | [`permute_edges`] | unchanged | `floor(E * r)` removed | unchanged |
//! | [`mask_nodes`] | unchanged | unchanged | `floor(N * r)` rows set to the mean row |
//!
//! [`Augmentation::Random`] picks `drop_nodes` or `permute_edges` uniformly.

use crate::graph::{EdgeList, Graph};
use crate::{Error, Result};
use ndarray::Axis;
use rand::seq::index;
use rand::Rng;
use std::str::FromStr;
use tracing::debug;

/// Augmentation selector, parsed from the names `dropN`, `permE`, `maskN`, `random`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Augmentation {
    DropNodes,
    PermuteEdges,
    MaskNodes,
    /// Uniform choice between node dropping and edge permutation.
    Random,
}

impl FromStr for Augmentation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dropN" => Ok(Self::DropNodes),
            "permE" => Ok(Self::PermuteEdges),
            "maskN" => Ok(Self::MaskNodes),
            "random" => Ok(Self::Random),
            other => Err(Error::InvalidConfig(format!(
                "unknown augmentation {other:?}, expected dropN, permE, maskN or random"
            ))),
        }
    }
}

/// Apply `aug` with ratio `ratio`.
pub fn graph_views<R: Rng + ?Sized>(
    graph: Graph,
    aug: Augmentation,
    ratio: f64,
    rng: &mut R,
) -> Graph {
    match aug {
        Augmentation::DropNodes => drop_nodes(graph, ratio, rng),
        Augmentation::PermuteEdges => permute_edges(graph, ratio, rng),
        Augmentation::MaskNodes => mask_nodes(graph, ratio, rng),
        Augmentation::Random => {
            if rng.gen_bool(0.5) {
                drop_nodes(graph, ratio, rng)
            } else {
                permute_edges(graph, ratio, rng)
            }
        }
    }
}

/// `floor(n * ratio)`, clamped to `n`.
fn portion(n: usize, ratio: f64) -> usize {
    ((n as f64 * ratio.max(0.0)).floor() as usize).min(n)
}

/// Remove `floor(N * ratio)` random nodes and every edge touching them.
///
/// Survivors keep their relative order and are relabelled `0..`.
///
/// Fail-soft: if no edge survives, the input graph is returned unchanged.
/// An edgeless result cannot be told apart from a collapsed `2 x 0` edge
/// tensor by downstream consumers, so the view is skipped instead.
pub fn drop_nodes<R: Rng + ?Sized>(graph: Graph, ratio: f64, rng: &mut R) -> Graph {
    let n = graph.num_nodes();
    let drop_num = portion(n, ratio);
    if drop_num == 0 {
        return graph;
    }

    let perm = index::sample(rng, n, n).into_vec();
    let mut dropped = vec![false; n];
    for &i in &perm[..drop_num] {
        dropped[i] = true;
    }

    let mut relabel = vec![usize::MAX; n];
    let mut keep = Vec::with_capacity(n - drop_num);
    for i in (0..n).filter(|&i| !dropped[i]) {
        relabel[i] = keep.len();
        keep.push(i);
    }

    let edge_index: EdgeList = graph
        .edge_index
        .iter()
        .filter(|&&(s, d)| !dropped[s] && !dropped[d])
        .map(|&(s, d)| (relabel[s], relabel[d]))
        .collect();

    if edge_index.is_empty() {
        debug!(
            nodes = n,
            dropped = drop_num,
            "no edge survives node dropping, keeping original graph"
        );
        return graph;
    }

    Graph {
        x: graph.x.select(Axis(0), &keep),
        edge_index,
        y: graph.y,
    }
}

/// Remove `floor(E * ratio)` random edges without replacement.
///
/// Surviving edges keep their original order.
pub fn permute_edges<R: Rng + ?Sized>(mut graph: Graph, ratio: f64, rng: &mut R) -> Graph {
    let e = graph.num_edges();
    let remove = portion(e, ratio);
    if remove == 0 {
        return graph;
    }

    let mut kept = index::sample(rng, e, e - remove).into_vec();
    kept.sort_unstable();
    let edges = graph.edge_index.as_slice();
    graph.edge_index = kept.iter().map(|&i| edges[i]).collect();
    graph
}

/// Overwrite `floor(N * ratio)` random rows with the column mean taken
/// before masking.
pub fn mask_nodes<R: Rng + ?Sized>(mut graph: Graph, ratio: f64, rng: &mut R) -> Graph {
    let n = graph.num_nodes();
    let mask_num = portion(n, ratio);
    if mask_num == 0 {
        return graph;
    }
    let Some(token) = graph.x.mean_axis(Axis(0)) else {
        return graph;
    };

    for i in index::sample(rng, n, mask_num) {
        graph.x.row_mut(i).assign(&token);
    }
    graph
}
