// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

//! Graph containers and task generation for graph prompting.
//!
//! This crate holds everything on the data side of prompting a frozen GNN:
//!
//! - [`Graph`] - node features + directed edge list + optional label
//! - [`GraphBatch`] - many graphs collated into one disjoint union
//! - [`LabeledGraph`] - a large node-labelled source graph with split masks
//! - [`algo::sampling`] - turn a node-labelled graph into per-class
//!   node-induced graph tasks
//! - [`algo::augment`] - perturbed views for contrastive pretraining
//! - [`io`] - persisted task files and few-shot batch loading
//!
//! The model side (prompt tokens, fusion, task head) lives in `promptix-nn`.
//!
//! # From Node Classification to Graph Classification
//!
//! Prompting works at graph level: a prompt graph is spliced into every input
//! graph and the frozen encoder pools the result. Node-level datasets are
//! therefore recast as graph-level ones by cutting a small neighbourhood
//! around same-label nodes:
//!
//! ```text
//! big graph, node labels        induced graphs, graph labels
//!
//!   a(0) - b(0) - c(1)     =>    {a, b}        label 0
//!    |             |             {c, d, e}     label 1
//!   e(1) ------- d(1)
//! ```
//!
//! # Index Conventions
//!
//! | Structure | Indices |
//! |-----------|---------|
//! | [`Graph`] | local, `0..num_nodes`, contiguous |
//! | [`GraphBatch`] | graph `i` owns `ptr[i]..ptr[i+1]` |
//! | induced graph | position in the selected node list |
//!
//! # Example
//!
//! ```rust
//! use ndarray::array;
//! use promptix_core::{EdgeList, Graph, GraphBatch};
//!
//! let a = Graph::new(array![[1.0], [2.0]], EdgeList::from(vec![(0, 1)]), None).unwrap();
//! let b = Graph::new(array![[3.0]], EdgeList::new(), None).unwrap();
//!
//! let batch = GraphBatch::from_graphs(&[a, b]).unwrap();
//! assert_eq!(batch.batch(), &[0, 0, 1]);
//! ```

pub mod algo;
mod batch;
mod config;
mod dataset;
mod error;
mod graph;
pub mod io;
mod rng;

pub use algo::augment::{drop_nodes, graph_views, mask_nodes, permute_edges, Augmentation};
pub use algo::sampling::{seed_groups, ClassTasks, InducedGraphSampler};
pub use batch::{BatchLayout, GraphBatch};
pub use config::{PadPolicy, SamplerConfig};
pub use dataset::LabeledGraph;
pub use error::{Error, Result};
pub use graph::{EdgeList, FeatureMatrix, Graph, Label};
pub use io::{FewShotData, TaskSplit, TaskStore, SPLITS};
pub use rng::RngState;

// Re-export ndarray so downstream crates agree on the array version
pub use ndarray;
