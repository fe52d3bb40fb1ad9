//! Prompt in front, task head behind, frozen encoder in the middle.

use crate::config::{HeadConfig, PromptConfig};
use crate::encoder::GraphEncoder;
use crate::fusion::HeavyPrompt;
use crate::head::Answering;
use crate::{Error, Result};
use candle_core::{Device, Tensor, Var};
use promptix_core::{GraphBatch, RngState};
use tracing::trace;

/// Fuse, encode, classify.
///
/// ```text
/// GraphBatch --HeavyPrompt--> PromptedBatch --encoder--> (G x hid) --Answering--> (G x C)
/// ```
///
/// Only the prompt tokens and the head carry trainable variables; the
/// encoder is borrowed per call.
#[derive(Debug)]
pub struct FrontAndHead {
    prompt: HeavyPrompt,
    answering: Answering,
}

impl FrontAndHead {
    /// Tokens first, then head weights, both drawn from `rng`.
    pub fn new(
        prompt: &PromptConfig,
        head: &HeadConfig,
        device: &Device,
        rng: &mut RngState,
    ) -> Result<Self> {
        let prompt = HeavyPrompt::from_config(prompt, device, rng)?;
        let answering = Answering::from_config(head, device, rng)?;
        Ok(Self { prompt, answering })
    }

    pub fn from_parts(prompt: HeavyPrompt, answering: Answering) -> Self {
        Self { prompt, answering }
    }

    pub fn prompt(&self) -> &HeavyPrompt {
        &self.prompt
    }

    pub fn answering(&self) -> &Answering {
        &self.answering
    }

    /// Prompt token variables.
    pub fn prompt_parameters(&self) -> Vec<Var> {
        self.prompt.tokens().parameters()
    }

    /// Every trainable variable: prompt tokens, then head weight and bias.
    pub fn parameters(&self) -> Vec<Var> {
        let mut params = self.prompt_parameters();
        params.extend(self.answering.parameters());
        params
    }

    /// Class probabilities, one row per graph of `batch`.
    pub fn forward(&self, batch: &GraphBatch, encoder: &dyn GraphEncoder) -> Result<Tensor> {
        let prompted = self.prompt.forward(batch)?;
        let embedding = encoder.encode_batch(&prompted)?;

        let rows = embedding.dim(0)?;
        if rows != batch.num_graphs() {
            return Err(Error::DimensionMismatch {
                expected: batch.num_graphs(),
                got: rows,
            });
        }

        trace!(
            graphs = batch.num_graphs(),
            nodes = prompted.num_nodes(),
            "front-and-head forward"
        );
        self.answering.forward(&embedding)
    }
}
