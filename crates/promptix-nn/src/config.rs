//! Prompt and task-head configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Token initialisation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMethod {
    /// Kaiming-uniform, fan-in mode, leaky-ReLU gain (slope 0.01).
    KaimingUniform,
}

impl FromStr for InitMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kaiming_uniform" => Ok(Self::KaimingUniform),
            other => Err(Error::InvalidConfig(format!(
                "init method {other:?} unsupported, only kaiming_uniform is available"
            ))),
        }
    }
}

/// Downstream task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    /// Softmax over classes.
    MultiLabelClassification,
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "multi_label_classification" => Ok(Self::MultiLabelClassification),
            other => Err(Error::UnsupportedTask(other.to_string())),
        }
    }
}

/// How prompt-to-target edges are pruned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossPrune {
    /// Keep pairs with similarity at or above the threshold.
    Threshold(f32),
    /// Keep the `k` most similar target nodes per prompt token.
    TopK(usize),
}

impl Default for CrossPrune {
    fn default() -> Self {
        CrossPrune::Threshold(0.1)
    }
}

/// Prompt graph configuration.
///
/// ```rust
/// use promptix_nn::{CrossPrune, PromptConfig};
///
/// let config = PromptConfig::from_json_str(
///     r#"{"token_dim": 8, "token_num": 4, "cross_prune": {"top_k": 2}}"#,
/// ).unwrap();
/// assert_eq!(config.cross_prune, CrossPrune::TopK(2));
/// assert_eq!(config.inner_prune, 0.3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Width of every token (must equal the input feature width).
    pub token_dim: usize,
    /// Tokens per group.
    pub token_num: usize,
    /// Number of token groups (multi-group prompts only).
    pub group_num: usize,
    /// Similarity threshold among tokens.
    pub inner_prune: f32,
    /// Pruning of prompt-to-target edges.
    pub cross_prune: CrossPrune,
    /// Token initialisation scheme name.
    pub init_method: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            token_dim: 100,
            token_num: 10,
            group_num: 1,
            inner_prune: 0.3,
            cross_prune: CrossPrune::default(),
            init_method: "kaiming_uniform".to_string(),
        }
    }
}

impl PromptConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn init(&self) -> Result<InitMethod> {
        self.init_method.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_dim == 0 || self.token_num == 0 || self.group_num == 0 {
            return Err(Error::InvalidConfig(
                "token_dim, token_num and group_num must be positive".into(),
            ));
        }
        self.init()?;
        Ok(())
    }
}

/// Task head configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadConfig {
    /// Width of the pooled graph embedding.
    pub hid_dim: usize,
    pub num_classes: usize,
    /// Task type name.
    pub task_type: String,
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            hid_dim: 16,
            num_classes: 2,
            task_type: "multi_label_classification".to_string(),
        }
    }
}

impl HeadConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn task(&self) -> Result<TaskType> {
        self.task_type.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_init_rejected() {
        assert!(matches!(
            "xavier_normal".parse::<InitMethod>(),
            Err(Error::InvalidConfig(_))
        ));
        let config = PromptConfig {
            init_method: "orthogonal".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_task_rejected() {
        let head = HeadConfig {
            task_type: "regression".into(),
            ..Default::default()
        };
        assert!(matches!(head.task(), Err(Error::UnsupportedTask(t)) if t == "regression"));
        assert_eq!(
            HeadConfig::default().task().unwrap(),
            TaskType::MultiLabelClassification
        );
    }

    #[test]
    fn test_threshold_json() {
        let config = PromptConfig::from_json_str(r#"{"cross_prune": {"threshold": 0.5}}"#).unwrap();
        assert_eq!(config.cross_prune, CrossPrune::Threshold(0.5));
        assert_eq!(config.token_num, 10);
    }
}
