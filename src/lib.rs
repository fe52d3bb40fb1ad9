//! `promptix` wires the data side and the model side of graph prompting.
//!
//! Design goal: adapt a frozen, pretrained graph encoder to a downstream
//! graph classification task by learning only a small prompt graph and a
//! task head.
//!
//! - [`core`] (`promptix-core`): graphs, batches, induced-graph task
//!   generation, augmentation, task files
//! - [`nn`] (`promptix-nn`): prompt tokens, fusion, task head, encoder seam
//!
//! The most common types are re-exported at the top level.

pub use promptix_core as core;
pub use promptix_nn as nn;

pub use promptix_core::{
    EdgeList, Graph, GraphBatch, InducedGraphSampler, Label, LabeledGraph, RngState,
    SamplerConfig, TaskStore,
};
pub use promptix_nn::{
    Answering, CrossPrune, FrontAndHead, GcnEncoder, GraphEncoder, HeadConfig, HeavyPrompt,
    LightPrompt, PromptConfig, PromptTokens, PromptedBatch,
};
