//! Similarity-pruned adjacency between node sets.
//!
//! Two rows are linked when `sigmoid(a_i . b_j)` clears a threshold:
//!
//! ```text
//! a (n x d)   b (m x d)
//!      \        /
//!   sigmoid(a b^T)  (n x m)   -->  [(i, j) | sim[i][j] >= t]   row-major
//! ```
//!
//! The same routine builds token-to-token edges inside a prompt graph and
//! token-to-node edges between a prompt and a target graph.

use crate::config::CrossPrune;
use crate::{Error, Result};
use candle_core::Tensor;
use promptix_core::EdgeList;

/// `sigmoid(a b^T)`, shape `(rows(a), rows(b))`.
pub fn similarity(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    check_width(a, b)?;
    let dot = a.matmul(&b.t()?)?;
    Ok(candle_nn::ops::sigmoid(&dot)?)
}

fn check_width(a: &Tensor, b: &Tensor) -> Result<()> {
    let (da, db) = (a.dim(1)?, b.dim(1)?);
    if da != db {
        return Err(Error::DimensionMismatch {
            expected: da,
            got: db,
        });
    }
    Ok(())
}

fn similarity_rows(a: &Tensor, b: &Tensor) -> Result<Option<Vec<Vec<f32>>>> {
    check_width(a, b)?;
    if a.dim(0)? == 0 || b.dim(0)? == 0 {
        return Ok(None);
    }
    Ok(Some(similarity(a, b)?.to_vec2::<f32>()?))
}

/// Edges `(i, j)` with `sigmoid(a_i . b_j) >= threshold`, row-major.
///
/// A threshold above 1 yields no edges; one at or below 0 yields the full
/// bipartite set.
///
/// ```rust
/// use candle_core::{Device, Tensor};
/// use promptix_nn::adjacency::build_adjacency;
///
/// let x = Tensor::new(&[[1f32, 0.], [0., 1.]], &Device::Cpu).unwrap();
/// let edges = build_adjacency(&x, &x, 0.6).unwrap();
/// assert_eq!(edges.as_slice(), &[(0, 0), (1, 1)]);
/// ```
pub fn build_adjacency(a: &Tensor, b: &Tensor, threshold: f32) -> Result<EdgeList> {
    let Some(sim) = similarity_rows(a, b)? else {
        return Ok(EdgeList::new());
    };

    let mut edges = EdgeList::new();
    for (i, row) in sim.iter().enumerate() {
        for (j, &s) in row.iter().enumerate() {
            if s >= threshold {
                edges.push(i, j);
            }
        }
    }
    Ok(edges)
}

/// Edges from each row of `a` to its `k` most similar rows of `b`.
///
/// Ties break toward the lower column. Output is row-major with columns
/// ascending inside a row.
pub fn top_k_adjacency(a: &Tensor, b: &Tensor, k: usize) -> Result<EdgeList> {
    let Some(sim) = similarity_rows(a, b)? else {
        return Ok(EdgeList::new());
    };

    let mut edges = EdgeList::with_capacity(sim.len() * k);
    for (i, row) in sim.iter().enumerate() {
        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by(|&x, &y| row[y].total_cmp(&row[x]).then(x.cmp(&y)));
        order.truncate(k);
        order.sort_unstable();
        for j in order {
            edges.push(i, j);
        }
    }
    Ok(edges)
}

/// Token-to-token edges of a prompt graph, self-loops included.
pub fn inner_edges(tokens: &Tensor, threshold: f32) -> Result<EdgeList> {
    build_adjacency(tokens, tokens, threshold)
}

/// Prompt-to-target edges under `mode`, target indices local to the target.
pub fn cross_edges(tokens: &Tensor, target: &Tensor, mode: CrossPrune) -> Result<EdgeList> {
    match mode {
        CrossPrune::Threshold(t) => build_adjacency(tokens, target, t),
        CrossPrune::TopK(k) => top_k_adjacency(tokens, target, k),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn identity_rows() -> Tensor {
        Tensor::new(&[[1f32, 0.], [0., 1.], [1., 1.]], &Device::Cpu).unwrap()
    }

    #[test]
    fn test_threshold_edges() {
        // sim: sigmoid of [[1,0,1],[0,1,1],[1,1,2]]
        // sigmoid(0) = 0.5, sigmoid(1) ~ 0.731, sigmoid(2) ~ 0.881
        let x = identity_rows();
        let edges = build_adjacency(&x, &x, 0.6).unwrap();
        assert_eq!(
            edges.as_slice(),
            &[(0, 0), (0, 2), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
        assert!(edges.iter().any(|&e| e == (2, 2)));
        assert!(!edges.iter().any(|&e| e == (0, 1)));
    }

    #[test]
    fn test_threshold_extremes() {
        let x = identity_rows();
        assert!(build_adjacency(&x, &x, 1.1).unwrap().is_empty());
        assert_eq!(build_adjacency(&x, &x, 0.0).unwrap().len(), 9);
    }

    #[test]
    fn test_top_k() {
        let x = identity_rows();
        let edges = top_k_adjacency(&x, &x, 1).unwrap();
        // row 0 best matches are columns 0 and 2 (tie at 1.0); lower wins
        assert_eq!(edges.as_slice(), &[(0, 0), (1, 1), (2, 2)]);

        let all = top_k_adjacency(&x, &x, 10).unwrap();
        assert_eq!(all.len(), 9);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Tensor::zeros((2, 3), candle_core::DType::F32, &Device::Cpu).unwrap();
        let b = Tensor::zeros((2, 4), candle_core::DType::F32, &Device::Cpu).unwrap();
        assert!(matches!(
            build_adjacency(&a, &b, 0.5),
            Err(Error::DimensionMismatch { expected: 3, got: 4 })
        ));
    }

    #[test]
    fn test_empty_side() {
        let a = identity_rows();
        let b = Tensor::zeros((0, 2), candle_core::DType::F32, &Device::Cpu).unwrap();
        assert!(build_adjacency(&a, &b, 0.0).unwrap().is_empty());
        assert!(cross_edges(&a, &b, CrossPrune::TopK(2)).unwrap().is_empty());
    }
}
