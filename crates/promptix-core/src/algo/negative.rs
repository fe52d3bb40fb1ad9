//! Negative edge sampling for link-level objectives.

use crate::graph::{EdgeList, Graph};
use rand::Rng;
use std::collections::HashSet;

/// Sample node pairs that are not edges of `graph`.
///
/// Draws `5 * E` random `(u, v)` candidates and keeps, in draw order, those
/// that are not existing edges, not self loops and not already kept, stopping
/// once `E / 2` pairs are collected. Sparse graphs almost always reach the
/// quota; dense graphs may return fewer.
///
/// The quota is `E / 2` rounded down. With odd `E` a comparison against the
/// fractional half would never match, so every valid draw would be kept;
/// here sampling stops at `(E - 1) / 2` pairs, and a single-edge graph
/// yields none.
///
/// # Complexity
/// O(E) expected
pub fn negative_edges<R: Rng + ?Sized>(graph: &Graph, rng: &mut R) -> EdgeList {
    let n = graph.num_nodes();
    let e = graph.num_edges();
    let quota = e / 2;
    if n < 2 || quota == 0 {
        return EdgeList::new();
    }

    let existing: HashSet<(usize, usize)> = graph.edge_index.iter().copied().collect();
    let mut sampled = HashSet::with_capacity(quota);
    let mut out = EdgeList::with_capacity(quota);

    for _ in 0..5 * e {
        let pair = (rng.gen_range(0..n), rng.gen_range(0..n));
        if pair.0 != pair.1 && !existing.contains(&pair) && sampled.insert(pair) {
            out.push(pair.0, pair.1);
            if out.len() == quota {
                break;
            }
        }
    }

    out
}
