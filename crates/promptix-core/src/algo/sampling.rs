//! Node-induced graph sampling for few-shot graph classification tasks.
//!
//! Turns one large node-labelled graph into many small graphs, each the
//! neighbourhood of a handful of same-label "seed" nodes. A node
//! classification problem becomes a graph classification problem that a
//! prompted graph-level encoder can consume.
//!
//! # Key Types
//!
//! - [`seed_groups`] - partition a node pool into a fixed number of seed groups
//! - [`InducedGraphSampler`] - expand, pad and trim each group into a graph
//! - [`ClassTasks`] - the four task splits generated for one class
//!
//! # Procedure (per class)
//!
//! ```text
//! pool        = nodes labelled c, randomly permuted
//! same_edges  = edges with both endpoints in pool
//! groups      = seed_groups(pool)                      (exactly 400)
//! split p     = groups[p*100 .. (p+1)*100]             (4 splits)
//!
//! for seeds in split:
//!     hop = 1; nodes = k_hop(seeds, hop)
//!     while |nodes| < smallest and hop < 5: hop += 1; nodes = k_hop(seeds, hop)
//!     if |nodes| < smallest: pad with random pool nodes not yet in nodes
//!     if |nodes| > largest:  keep seeds + random non-seed nodes
//!     emit induced_graph(nodes) with label c
//! ```

use crate::algo::subgraph::{induced_graph, NeighborIndex};
use crate::config::{PadPolicy, SamplerConfig};
use crate::dataset::LabeledGraph;
use crate::graph::{EdgeList, Graph, Label};
use crate::io::{TaskSplit, SPLITS};
use crate::rng::RngState;
use crate::{Error, Result};
use rand::prelude::*;
use tracing::{debug, info, warn};

/// Partition `nodes` into exactly `config.seed_groups` groups.
///
/// The first pass chunks the pool with size `max(min_chunk, |nodes| / seed_groups)`.
/// Small pools cannot fill the quota that way, so chunking restarts with a
/// random size from `config.resplit_chunk` per pass, re-permuting the pool
/// between passes (groups may then overlap), until the quota is reached.
/// Groups are finally shuffled and truncated to the quota.
///
/// Returns an empty list for an empty pool.
pub fn seed_groups(
    nodes: &[usize],
    config: &SamplerConfig,
    rng: &mut RngState,
) -> Vec<Vec<usize>> {
    let target = config.seed_groups;
    if nodes.is_empty() || target == 0 {
        return Vec::new();
    }

    let chunk = config.min_chunk.max(nodes.len() / target);
    let mut groups: Vec<Vec<usize>> = nodes.chunks(chunk).map(<[usize]>::to_vec).collect();

    if groups.len() < target {
        debug!(
            groups = groups.len(),
            target, "too few seed groups, starting overlapped split"
        );
        groups.clear();
        let mut pool = nodes.to_vec();
        let (lo, hi) = config.resplit_chunk;
        while groups.len() < target {
            let size = rng.general().gen_range(lo..=hi);
            groups.extend(pool.chunks(size).map(<[usize]>::to_vec));
            pool.shuffle(rng.vectorized());
        }
    }

    groups.shuffle(rng.general());
    groups.truncate(target);
    groups
}

/// Induced graphs generated for one class, one list per [`TaskSplit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTasks {
    /// Class every graph is labelled with.
    pub class: usize,
    /// Graphs indexed by `TaskSplit as usize`.
    pub splits: [Vec<Graph>; 4],
}

impl ClassTasks {
    pub fn split(&self, split: TaskSplit) -> &[Graph] {
        &self.splits[split as usize]
    }

    /// Total graphs over all splits.
    pub fn len(&self) -> usize {
        self.splits.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Samples node-induced graphs from a labelled graph.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use promptix_core::{EdgeList, LabeledGraph, RngState, SamplerConfig, TaskSplit};
/// use promptix_core::algo::sampling::InducedGraphSampler;
///
/// // ring of 40 nodes, two classes alternating in blocks of 20
/// let n = 40;
/// let edges: EdgeList = (0..n).map(|i| (i, (i + 1) % n)).collect();
/// let labels = (0..n).map(|i| i / 20).collect();
/// let graph = LabeledGraph::new(Array2::zeros((n, 4)), edges.to_undirected(), labels).unwrap();
///
/// let config = SamplerConfig { smallest_size: 3, largest_size: 6, ..Default::default() };
/// let sampler = InducedGraphSampler::new(&graph, config).unwrap();
/// let mut rng = RngState::seed_everything(42);
/// let tasks = sampler.sample_tasks(2, &mut rng).unwrap();
///
/// assert_eq!(tasks.len(), 2);
/// assert_eq!(tasks[0].split(TaskSplit::TrainSupport).len(), 100);
/// ```
pub struct InducedGraphSampler<'a> {
    graph: &'a LabeledGraph,
    config: SamplerConfig,
}

impl<'a> InducedGraphSampler<'a> {
    /// Create a sampler; the configuration is validated here.
    pub fn new(graph: &'a LabeledGraph, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample the four splits of every class in `0..num_classes`.
    pub fn sample_tasks(&self, num_classes: usize, rng: &mut RngState) -> Result<Vec<ClassTasks>> {
        (0..num_classes)
            .map(|class| self.sample_class(class, rng))
            .collect()
    }

    /// Sample the four splits of one class.
    pub fn sample_class(&self, class: usize, rng: &mut RngState) -> Result<ClassTasks> {
        let mut pool = self.graph.nodes_with_label(class);
        if pool.is_empty() {
            return Err(Error::EmptyClass(class));
        }
        // ascending copy for set difference during padding
        let sorted_pool = pool.clone();
        pool.shuffle(rng.vectorized());

        let in_class: Vec<bool> = self.graph.y.iter().map(|&c| c == class).collect();
        let same_edges = self.graph.edges_within(&in_class);
        let index = NeighborIndex::new(self.graph.num_nodes(), &same_edges);

        let groups = seed_groups(&pool, &self.config, rng);
        let per_split = self.config.groups_per_split;

        let mut splits: [Vec<Graph>; 4] = Default::default();
        for split in SPLITS {
            let p = split as usize;
            let start = (p * per_split).min(groups.len());
            let end = ((p + 1) * per_split).min(groups.len());
            splits[p] = groups[start..end]
                .iter()
                .map(|seeds| self.induce(class, seeds, &index, &same_edges, &sorted_pool, rng))
                .collect::<Result<_>>()?;
        }

        let tasks = ClassTasks { class, splits };
        info!(
            class,
            pool = sorted_pool.len(),
            same_label_edges = same_edges.len(),
            avg_degree = self.graph.average_degree(),
            graphs = tasks.len(),
            "sampled induced graphs"
        );
        Ok(tasks)
    }

    /// Final node list for one seed group: expand, pad, trim.
    ///
    /// Exposed for inspection; [`Self::sample_class`] calls it for every group.
    pub fn node_set(
        &self,
        class: usize,
        seeds: &[usize],
        index: &NeighborIndex,
        sorted_pool: &[usize],
        rng: &mut RngState,
    ) -> Result<Vec<usize>> {
        let SamplerConfig {
            smallest_size,
            largest_size,
            max_hops,
            pad_policy,
            ..
        } = self.config;

        let mut hop = 1;
        let mut nodes = index.k_hop(seeds, hop);
        while nodes.len() < smallest_size && hop < max_hops {
            hop += 1;
            nodes = index.k_hop(seeds, hop);
        }

        if nodes.len() < smallest_size {
            let need = smallest_size - nodes.len();
            // `nodes` is ascending here, straight from k_hop
            let mut candidates: Vec<usize> = sorted_pool
                .iter()
                .copied()
                .filter(|v| nodes.binary_search(v).is_err())
                .collect();
            if candidates.len() < need {
                match pad_policy {
                    PadPolicy::Error => {
                        return Err(Error::InsufficientCandidates {
                            class,
                            needed: need,
                            available: candidates.len(),
                        })
                    }
                    PadPolicy::Truncate => warn!(
                        class,
                        needed = need,
                        available = candidates.len(),
                        "same-label pool too small, emitting undersized graph"
                    ),
                }
            }
            candidates.shuffle(rng.vectorized());
            candidates.truncate(need);
            nodes.extend(candidates);
        }

        if nodes.len() > largest_size {
            let mut kept: Vec<usize> = seeds.to_vec();
            kept.sort_unstable();
            kept.dedup();
            if kept.len() > largest_size {
                warn!(
                    class,
                    seeds = kept.len(),
                    largest_size,
                    "seed group alone exceeds largest_size"
                );
            }

            let mut others: Vec<usize> = nodes
                .iter()
                .copied()
                .filter(|v| kept.binary_search(v).is_err())
                .collect();
            others.shuffle(rng.vectorized());
            others.truncate(largest_size.saturating_sub(kept.len()));

            kept.extend(others);
            kept.sort_unstable();
            kept.dedup();
            nodes = kept;
        }

        Ok(nodes)
    }

    fn induce(
        &self,
        class: usize,
        seeds: &[usize],
        index: &NeighborIndex,
        same_edges: &EdgeList,
        sorted_pool: &[usize],
        rng: &mut RngState,
    ) -> Result<Graph> {
        let nodes = self.node_set(class, seeds, index, sorted_pool, rng)?;
        Ok(induced_graph(
            &self.graph.x,
            same_edges,
            &nodes,
            Some(Label::Class(class)),
        ))
    }
}
