//! Prompt fusion: splice one prompt graph into every target graph.
//!
//! ```text
//!   prompt (k tokens)            target (n nodes)
//!   t0 -- t1   t2                v0 -> v1 -> v2
//!    \________________ cross ______/
//!
//!   fused: rows [t0 t1 t2 v0 v1 v2]
//!          edges = inner ++ (target + k) ++ (cross, dst + k)
//! ```
//!
//! Token rows come first, so node `j` of the target becomes node `k + j` of
//! the fused graph. Edge order inside each fused graph is fixed: inner
//! prompt edges, then shifted target edges, then cross edges.

use crate::adjacency::{cross_edges, inner_edges};
use crate::batch::PromptedBatch;
use crate::config::{CrossPrune, PromptConfig};
use crate::token::PromptTokens;
use crate::{Error, Result};
use candle_core::{Device, Tensor};
use promptix_core::{EdgeList, Graph, GraphBatch, RngState};
use tracing::trace;

/// A single learnable prompt graph inserted into each input graph.
#[derive(Debug)]
pub struct HeavyPrompt {
    tokens: PromptTokens,
    cross_prune: CrossPrune,
}

impl HeavyPrompt {
    pub fn new(
        token_dim: usize,
        token_num: usize,
        cross_prune: CrossPrune,
        inner_prune: f32,
        device: &Device,
        rng: &mut RngState,
    ) -> Result<Self> {
        let tokens = PromptTokens::new(
            token_dim,
            token_num,
            1,
            inner_prune,
            "kaiming_uniform",
            device,
            rng,
        )?;
        Ok(Self {
            tokens,
            cross_prune,
        })
    }

    /// Build from a config; `group_num` is ignored, a heavy prompt has one group.
    pub fn from_config(config: &PromptConfig, device: &Device, rng: &mut RngState) -> Result<Self> {
        config.validate()?;
        let tokens = PromptTokens::new(
            config.token_dim,
            config.token_num,
            1,
            config.inner_prune,
            &config.init_method,
            device,
            rng,
        )?;
        Ok(Self {
            tokens,
            cross_prune: config.cross_prune,
        })
    }

    pub fn tokens(&self) -> &PromptTokens {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut PromptTokens {
        &mut self.tokens
    }

    pub fn cross_prune(&self) -> CrossPrune {
        self.cross_prune
    }

    /// Token matrix and its pruned inner edges.
    pub fn prompt_graph(&self) -> Result<(Tensor, EdgeList)> {
        let tokens = self.token_matrix()?;
        let edges = inner_edges(&tokens, self.tokens.inner_prune())?;
        Ok((tokens, edges))
    }

    fn token_matrix(&self) -> Result<Tensor> {
        self.tokens
            .group(0)
            .cloned()
            .ok_or_else(|| Error::InvalidConfig("prompt has no token group".into()))
    }

    /// Fuse the prompt into each target, preserving order and labels.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if a non-empty target's feature width
    /// differs from `token_dim`.
    pub fn fuse(&self, targets: &[Graph]) -> Result<PromptedBatch> {
        let (tokens, inner) = self.prompt_graph()?;
        let device = tokens.device().clone();

        for g in targets {
            if g.num_nodes() > 0 && g.feature_dim() != self.tokens.token_dim() {
                return Err(Error::DimensionMismatch {
                    expected: self.tokens.token_dim(),
                    got: g.feature_dim(),
                });
            }
        }

        let parts = self.fuse_all(&tokens, &inner, targets)?;
        let labels = targets.iter().map(|g| g.y.clone()).collect();

        trace!(
            graphs = targets.len(),
            inner_edges = inner.len(),
            "fused prompt into batch"
        );
        PromptedBatch::from_parts(parts, labels, self.tokens.token_dim(), &device)
    }

    /// Un-batch, fuse each graph, re-batch.
    pub fn forward(&self, batch: &GraphBatch) -> Result<PromptedBatch> {
        self.fuse(&batch.to_graphs())
    }

    #[cfg(not(feature = "parallel"))]
    fn fuse_all(
        &self,
        tokens: &Tensor,
        inner: &EdgeList,
        targets: &[Graph],
    ) -> Result<Vec<(Tensor, EdgeList)>> {
        targets
            .iter()
            .map(|g| fuse_one(tokens, inner, g, self.cross_prune))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn fuse_all(
        &self,
        tokens: &Tensor,
        inner: &EdgeList,
        targets: &[Graph],
    ) -> Result<Vec<(Tensor, EdgeList)>> {
        use rayon::prelude::*;

        targets
            .par_iter()
            .map(|g| fuse_one(tokens, inner, g, self.cross_prune))
            .collect()
    }
}

fn fuse_one(
    tokens: &Tensor,
    inner: &EdgeList,
    target: &Graph,
    cross_prune: CrossPrune,
) -> Result<(Tensor, EdgeList)> {
    let token_num = tokens.dim(0)?;
    let mut edges = inner.clone();

    if target.num_nodes() == 0 {
        return Ok((tokens.clone(), edges));
    }

    let (n, d) = target.x.dim();
    let data: Vec<f32> = target.x.iter().copied().collect();
    let target_x = Tensor::from_vec(data, (n, d), tokens.device())?;

    edges.extend_from(&target.edge_index.shifted(token_num));
    let cross = cross_edges(tokens, &target_x, cross_prune)?;
    edges.extend_from(&cross.shift_targets(token_num));

    let x = Tensor::cat(&[tokens, &target_x], 0)?;
    Ok((x, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use promptix_core::Label;

    fn prompt(token_num: usize, cross: CrossPrune, inner: f32) -> HeavyPrompt {
        let mut rng = RngState::seed_everything(3);
        HeavyPrompt::new(2, token_num, cross, inner, &Device::Cpu, &mut rng).unwrap()
    }

    fn path3(y: usize) -> Graph {
        Graph::new(
            array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            EdgeList::from(vec![(0, 1), (1, 2)]),
            Some(Label::Class(y)),
        )
        .unwrap()
    }

    #[test]
    fn test_no_cross_no_inner() {
        let p = prompt(2, CrossPrune::Threshold(1.1), 1.1);
        let fused = p.fuse(&[path3(0)]).unwrap();

        assert_eq!(fused.num_nodes(), 5);
        assert_eq!(fused.edge_index().as_slice(), &[(2, 3), (3, 4)]);
        assert_eq!(fused.class_labels(), Some(vec![0]));
    }

    #[test]
    fn test_full_cross() {
        let p = prompt(2, CrossPrune::Threshold(0.0), 1.1);
        let fused = p.fuse(&[path3(1)]).unwrap();
        let edges = fused.edge_index().as_slice();

        // target edges first, then every token links to every target node
        assert_eq!(&edges[..2], &[(2, 3), (3, 4)]);
        assert_eq!(edges.len(), 2 + 2 * 3);
        for t in 0..2 {
            for v in 2..5 {
                assert!(edges.contains(&(t, v)));
            }
        }
    }

    #[test]
    fn test_token_rows_lead() {
        let p = prompt(2, CrossPrune::Threshold(0.5), 0.5);
        let fused = p.fuse(&[path3(0)]).unwrap();
        let rows = fused.x.to_vec2::<f32>().unwrap();
        let tokens = p.tokens().group(0).unwrap().to_vec2::<f32>().unwrap();

        assert_eq!(&rows[..2], &tokens[..]);
        assert_eq!(rows[2], vec![1.0, 0.0]);
    }

    #[test]
    fn test_empty_target() {
        let p = prompt(3, CrossPrune::Threshold(0.0), 1.1);
        let fused = p.fuse(&[Graph::empty(2)]).unwrap();
        assert_eq!(fused.num_nodes(), 3);
        assert!(fused.edge_index().is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let p = prompt(2, CrossPrune::Threshold(0.5), 0.5);
        let wide = Graph::new(array![[1.0, 2.0, 3.0]], EdgeList::new(), None).unwrap();
        assert!(matches!(
            p.fuse(&[wide]),
            Err(Error::DimensionMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_forward_keeps_order() {
        let p = prompt(2, CrossPrune::TopK(1), 0.5);
        let batch = GraphBatch::from_graphs(&[path3(0), path3(1), path3(0)]).unwrap();
        let fused = p.forward(&batch).unwrap();

        assert_eq!(fused.num_graphs(), 3);
        assert_eq!(fused.class_labels(), Some(vec![0, 1, 0]));
        assert_eq!(fused.layout.graph_sizes(), vec![5, 5, 5]);
    }
}
