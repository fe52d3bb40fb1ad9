//! Tensor-valued graph batches.

use crate::{Error, Result};
use candle_core::{DType, Device, Tensor};
use promptix_core::{BatchLayout, EdgeList, GraphBatch, Label};

/// A batch whose node features live in a tensor.
///
/// Produced by prompt fusion and token views; node features stay attached
/// to the autograd graph so gradients reach the prompt tokens.
#[derive(Debug, Clone)]
pub struct PromptedBatch {
    /// Stacked node features, `(num_nodes, dim)`.
    pub x: Tensor,
    pub layout: BatchLayout,
    /// One label per graph.
    pub y: Vec<Option<Label>>,
}

impl PromptedBatch {
    /// Collate per-graph `(features, edges)` parts.
    ///
    /// All parts must share the feature width. An empty `parts` yields an
    /// empty `(0, dim)` batch.
    pub fn from_parts(
        parts: Vec<(Tensor, EdgeList)>,
        y: Vec<Option<Label>>,
        dim: usize,
        device: &Device,
    ) -> Result<Self> {
        if y.len() != parts.len() {
            return Err(Error::Graph(promptix_core::Error::LengthMismatch {
                what: "labels",
                expected: parts.len(),
                got: y.len(),
            }));
        }

        let mut sizes = Vec::with_capacity(parts.len());
        for (x, _) in &parts {
            let (rows, cols) = x.dims2()?;
            if cols != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    got: cols,
                });
            }
            sizes.push(rows);
        }

        let layout = BatchLayout::collate(sizes.iter().copied().zip(parts.iter().map(|(_, e)| e)));
        let xs: Vec<Tensor> = parts
            .iter()
            .filter(|(x, _)| x.dim(0).is_ok_and(|n| n > 0))
            .map(|(x, _)| x.clone())
            .collect();
        let x = if xs.is_empty() {
            Tensor::zeros((0, dim), DType::F32, device)?
        } else {
            Tensor::cat(&xs, 0)?
        };

        Ok(Self { x, layout, y })
    }

    /// Lift an array batch onto `device`.
    pub fn from_graph_batch(batch: &GraphBatch, device: &Device) -> Result<Self> {
        let (n, d) = batch.x.dim();
        let data: Vec<f32> = batch.x.iter().copied().collect();
        Ok(Self {
            x: Tensor::from_vec(data, (n, d), device)?,
            layout: batch.layout.clone(),
            y: batch.y.clone(),
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

    /// Node features of graph `i`.
    pub fn node_features(&self, i: usize) -> Result<Tensor> {
        let start = self.layout.ptr[i];
        let len = self.layout.ptr[i + 1] - start;
        Ok(self.x.narrow(0, start, len)?)
    }

    /// Class ids of every graph; `None` if any graph lacks a class label.
    pub fn class_labels(&self) -> Option<Vec<usize>> {
        self.y
            .iter()
            .map(|y| y.as_ref().and_then(Label::class))
            .collect()
    }
}
