//! Graph algorithms used to build prompting tasks.
//!
//! - [`subgraph`] - k-hop expansion and node-induced subgraphs
//! - [`sampling`] - per-class induced-graph task sampling
//! - [`augment`] - node drop / edge permutation / node masking views
//! - [`negative`] - negative edge sampling

pub mod augment;
pub mod negative;
pub mod sampling;
pub mod subgraph;
