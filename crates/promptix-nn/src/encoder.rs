//! Graph encoders consumed by prompted models.
//!
//! A prompted model never trains its encoder. Anything that maps a batched
//! graph to one embedding per graph can sit behind [`GraphEncoder`]; the
//! [`GcnEncoder`] here is a plain reference implementation.
//!
//! ```text
//! x (N x d), edges, batch  --GCN layers-->  h (N x hid)  --mean pool-->  (G x hid)
//! ```

use crate::batch::PromptedBatch;
use crate::init::seeded_linear;
use crate::{Error, Result};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Linear, Module};
use promptix_core::{EdgeList, RngState};

/// Frozen graph-level encoder.
pub trait GraphEncoder {
    /// Embed every graph of a batch.
    ///
    /// `batch[i]` is the graph owning node `i`; the result has one row per
    /// graph, `num_graphs` rows in total.
    fn encode(
        &self,
        x: &Tensor,
        edge_index: &EdgeList,
        batch: &[usize],
        num_graphs: usize,
    ) -> Result<Tensor>;

    fn encode_batch(&self, batch: &PromptedBatch) -> Result<Tensor> {
        self.encode(&batch.x, batch.edge_index(), batch.batch(), batch.num_graphs())
    }
}

/// `D^{-1/2} (A + I) D^{-1/2}` as a dense `(N, N)` tensor.
///
/// Edge `(src, dst)` sets `A[dst][src]`, so row `i` aggregates the sources
/// pointing at `i`.
pub fn normalized_adjacency(
    num_nodes: usize,
    edges: &EdgeList,
    device: &Device,
) -> Result<Tensor> {
    let mut adj = vec![0f32; num_nodes * num_nodes];
    for i in 0..num_nodes {
        adj[i * num_nodes + i] = 1.0;
    }
    for &(src, dst) in edges {
        if src >= num_nodes || dst >= num_nodes {
            return Err(promptix_core::Error::InvalidEdge {
                src,
                dst,
                num_nodes,
            }
            .into());
        }
        adj[dst * num_nodes + src] = 1.0;
    }

    let degree: Vec<f32> = adj
        .chunks(num_nodes.max(1))
        .take(num_nodes)
        .map(|row| row.iter().sum::<f32>().sqrt().recip())
        .collect();
    for i in 0..num_nodes {
        for j in 0..num_nodes {
            adj[i * num_nodes + j] *= degree[i] * degree[j];
        }
    }

    Ok(Tensor::from_vec(adj, (num_nodes, num_nodes), device)?)
}

/// Mean of node rows per graph, `(num_graphs, dim)`.
///
/// Graphs without nodes pool to a zero row.
pub fn global_mean_pool(x: &Tensor, batch: &[usize], num_graphs: usize) -> Result<Tensor> {
    let (n, dim) = x.dims2()?;
    if batch.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            got: batch.len(),
        });
    }
    if n == 0 {
        return Ok(Tensor::zeros((num_graphs, dim), DType::F32, x.device())?);
    }

    let mut counts = vec![0f32; num_graphs];
    for &g in batch {
        if g >= num_graphs {
            return Err(Error::DimensionMismatch {
                expected: num_graphs,
                got: g + 1,
            });
        }
        counts[g] += 1.0;
    }
    let mut pool = vec![0f32; num_graphs * n];
    for (node, &g) in batch.iter().enumerate() {
        pool[g * n + node] = 1.0 / counts[g];
    }

    let pool = Tensor::from_vec(pool, (num_graphs, n), x.device())?;
    Ok(pool.matmul(x)?)
}

/// Graph Convolutional Network layer.
///
/// Implements: H' = A_hat H W, with A_hat the normalized adjacency.
///
/// # Reference
///
/// Kipf & Welling, "Semi-Supervised Classification with Graph Convolutional
/// Networks", ICLR 2017.
#[derive(Debug, Clone)]
pub struct GCNConv {
    linear: Linear,
    vars: Vec<Var>,
}

impl GCNConv {
    /// Weights are drawn from `rng`'s vectorized stream.
    pub fn new(
        in_features: usize,
        out_features: usize,
        device: &Device,
        rng: &mut RngState,
    ) -> Result<Self> {
        let (linear, vars) = seeded_linear(in_features, out_features, device, rng.vectorized())?;
        Ok(Self { linear, vars })
    }

    /// `x`: `(N, in)`, `adj`: normalized `(N, N)` with self-loops.
    pub fn forward(&self, x: &Tensor, adj: &Tensor) -> Result<Tensor> {
        let h = self.linear.forward(x)?;
        Ok(adj.matmul(&h)?)
    }
}

/// Stacked GCN layers with leaky-ReLU in between and mean pooling on top.
///
/// Weights come from the caller's [`RngState`]; the same seed rebuilds the
/// same encoder.
#[derive(Debug, Clone)]
pub struct GcnEncoder {
    layers: Vec<GCNConv>,
    input_dim: usize,
}

impl GcnEncoder {
    /// `num_layers` convolutions: `input_dim -> hid_dim -> ... -> hid_dim`.
    pub fn new(
        input_dim: usize,
        hid_dim: usize,
        num_layers: usize,
        device: &Device,
        rng: &mut RngState,
    ) -> Result<Self> {
        if num_layers == 0 {
            return Err(Error::InvalidConfig("encoder needs at least one layer".into()));
        }
        let layers = (0..num_layers)
            .map(|i| {
                let in_dim = if i == 0 { input_dim } else { hid_dim };
                GCNConv::new(in_dim, hid_dim, device, rng)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { layers, input_dim })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Every layer's weight and bias, first layer first.
    pub fn parameters(&self) -> Vec<Var> {
        self.layers.iter().flat_map(|l| l.vars.iter().cloned()).collect()
    }
}

impl GraphEncoder for GcnEncoder {
    fn encode(
        &self,
        x: &Tensor,
        edge_index: &EdgeList,
        batch: &[usize],
        num_graphs: usize,
    ) -> Result<Tensor> {
        let (n, d) = x.dims2()?;
        if d != self.input_dim {
            return Err(Error::DimensionMismatch {
                expected: self.input_dim,
                got: d,
            });
        }

        let adj = normalized_adjacency(n, edge_index, x.device())?;
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = layer.forward(&h, &adj)?;
            if i + 1 < self.layers.len() {
                h = candle_nn::ops::leaky_relu(&h, 0.01)?;
            }
        }
        global_mean_pool(&h, batch, num_graphs)
    }
}
