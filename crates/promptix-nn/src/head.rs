//! Task head mapping pooled graph embeddings to class probabilities.

use crate::config::{HeadConfig, TaskType};
use crate::init::seeded_linear;
use crate::Result;
use candle_core::{Device, Tensor, Var, D};
use candle_nn::{Linear, Module};
use promptix_core::RngState;

/// Linear layer followed by a softmax over classes.
#[derive(Debug, Clone)]
pub struct Answering {
    linear: Linear,
    vars: Vec<Var>,
    task: TaskType,
    num_classes: usize,
}

impl Answering {
    /// Weights are drawn from `rng`'s vectorized stream.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnsupportedTask`] for any task other than
    /// `multi_label_classification`.
    pub fn new(
        hid_dim: usize,
        num_classes: usize,
        task_type: &str,
        device: &Device,
        rng: &mut RngState,
    ) -> Result<Self> {
        let task = task_type.parse()?;
        let (linear, vars) = seeded_linear(hid_dim, num_classes, device, rng.vectorized())?;
        Ok(Self {
            linear,
            vars,
            task,
            num_classes,
        })
    }

    pub fn from_config(config: &HeadConfig, device: &Device, rng: &mut RngState) -> Result<Self> {
        Self::new(config.hid_dim, config.num_classes, &config.task_type, device, rng)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Weight and bias variables.
    pub fn parameters(&self) -> Vec<Var> {
        self.vars.clone()
    }

    /// `(num_graphs, hid_dim)` embeddings to `(num_graphs, num_classes)` probabilities.
    pub fn classify(&self, pooled: &Tensor) -> Result<Tensor> {
        let logits = self.linear.forward(pooled)?;
        match self.task {
            TaskType::MultiLabelClassification => {
                Ok(candle_nn::ops::softmax(&logits, D::Minus1)?)
            }
        }
    }

    pub fn forward(&self, embedding: &Tensor) -> Result<Tensor> {
        self.classify(embedding)
    }
}
