//! Sampler configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when the same-label pool is too small to pad a subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadPolicy {
    /// Pad with every remaining candidate and emit the undersized graph.
    #[default]
    Truncate,
    /// Fail with [`Error::InsufficientCandidates`].
    Error,
}

/// Induced-subgraph sampling configuration.
///
/// ```rust
/// use promptix_core::SamplerConfig;
///
/// let config = SamplerConfig {
///     smallest_size: 10,
///     largest_size: 30,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Lower bound on nodes per induced graph.
    pub smallest_size: usize,
    /// Upper bound on nodes per induced graph.
    pub largest_size: usize,
    /// Seed groups drawn per class.
    pub seed_groups: usize,
    /// Seed groups consumed by each of the four splits.
    pub groups_per_split: usize,
    /// Minimum chunk size of the first partition pass.
    pub min_chunk: usize,
    /// Inclusive chunk size range of the re-split passes.
    pub resplit_chunk: (usize, usize),
    /// Last hop count tried before padding.
    pub max_hops: usize,
    /// Behaviour when padding runs out of candidates.
    pub pad_policy: PadPolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            smallest_size: 10,
            largest_size: 30,
            seed_groups: 400,
            groups_per_split: 100,
            min_chunk: 5,
            resplit_chunk: (3, 5),
            max_hops: 5,
            pad_policy: PadPolicy::Truncate,
        }
    }
}

impl SamplerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.smallest_size > self.largest_size {
            return Err(Error::InvalidConfig(format!(
                "smallest_size {} exceeds largest_size {}",
                self.smallest_size, self.largest_size
            )));
        }
        if self.largest_size == 0 {
            return Err(Error::InvalidConfig("largest_size must be positive".into()));
        }
        let (lo, hi) = self.resplit_chunk;
        if lo == 0 || lo > hi {
            return Err(Error::InvalidConfig(format!(
                "resplit_chunk ({lo}, {hi}) must be a non-empty positive range"
            )));
        }
        if self.min_chunk == 0 || self.max_hops == 0 {
            return Err(Error::InvalidConfig(
                "min_chunk and max_hops must be positive".into(),
            ));
        }
        if self.groups_per_split * crate::io::SPLITS.len() > self.seed_groups {
            return Err(Error::InvalidConfig(format!(
                "{} splits of {} groups need more than {} seed groups",
                crate::io::SPLITS.len(),
                self.groups_per_split,
                self.seed_groups
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SamplerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_json_partial_override() {
        let config =
            SamplerConfig::from_json_str(r#"{"smallest_size": 5, "pad_policy": "error"}"#).unwrap();
        assert_eq!(config.smallest_size, 5);
        assert_eq!(config.largest_size, 30);
        assert_eq!(config.pad_policy, PadPolicy::Error);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = SamplerConfig {
            smallest_size: 40,
            largest_size: 30,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
