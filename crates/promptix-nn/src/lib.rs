// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

//! Prompt graphs for frozen graph encoders.
//!
//! `promptix-nn` provides the learnable side of graph prompting: token
//! stores, similarity-pruned prompt graphs, fusion of a prompt into target
//! graphs, and a task head. It sits between the data layer
//! (`promptix-core`) and a pretrained encoder it never updates.
//!
//! # Modules
//!
//! - [`adjacency`]: similarity-thresholded and top-k edge construction
//! - [`token`]: groups of learnable tokens and their prompt graphs
//! - [`fusion`]: insert a prompt graph into every graph of a batch
//! - [`head`]: linear + softmax task head
//! - [`encoder`]: the encoder seam and a reference GCN
//! - [`front`]: prompt, encoder and head wired together
//! - [`regularize`]: orthogonality penalty on tokens
//!
//! # Example: Prompted Forward Pass
//!
//! ```rust
//! use candle_core::Device;
//! use promptix_core::{ndarray::array, EdgeList, Graph, GraphBatch, RngState};
//! use promptix_nn::{FrontAndHead, GcnEncoder, HeadConfig, PromptConfig};
//!
//! let device = Device::Cpu;
//! let mut rng = RngState::seed_everything(0);
//!
//! let prompt = PromptConfig { token_dim: 2, token_num: 3, ..Default::default() };
//! let head = HeadConfig { hid_dim: 4, num_classes: 2, ..Default::default() };
//! let model = FrontAndHead::new(&prompt, &head, &device, &mut rng).unwrap();
//! let encoder = GcnEncoder::new(2, 4, 2, &device, &mut rng).unwrap();
//!
//! let x = array![[1.0, 0.0], [0.0, 1.0]];
//! let g = Graph::new(x, EdgeList::from(vec![(0, 1)]), None).unwrap();
//! let batch = GraphBatch::from_graphs(&[g]).unwrap();
//! let probs = model.forward(&batch, &encoder).unwrap();
//! assert_eq!(probs.dims(), &[1, 2]);
//! ```

pub mod adjacency;
mod batch;
mod config;
pub mod encoder;
mod error;
pub mod front;
pub mod fusion;
pub mod head;
mod init;
pub mod regularize;
pub mod token;

pub use adjacency::build_adjacency;
pub use batch::PromptedBatch;
pub use config::{CrossPrune, HeadConfig, InitMethod, PromptConfig, TaskType};
pub use encoder::{GcnEncoder, GraphEncoder};
pub use error::{Error, Result};
pub use front::FrontAndHead;
pub use fusion::HeavyPrompt;
pub use head::Answering;
pub use regularize::orthogonality_penalty;
pub use token::{LightPrompt, PromptTokens};
