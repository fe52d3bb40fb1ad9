//! Learnable prompt tokens.
//!
//! A prompt is one or more groups of `token_num` vectors of width
//! `token_dim`. Each group becomes a small prompt graph whose edges come
//! from pairwise token similarity:
//!
//! ```text
//! group 0: [t0 t1 t2]  --sim >= inner_prune-->  prompt graph 0, label 0
//! group 1: [t0 t1 t2]  --sim >= inner_prune-->  prompt graph 1, label 1
//! ```
//!
//! Tokens are [`Var`]s so an optimizer can update them while the graph
//! encoder stays frozen.

use crate::adjacency::inner_edges;
use crate::batch::PromptedBatch;
use crate::config::{InitMethod, PromptConfig};
use crate::{Error, Result};
use candle_core::{DType, Device, Tensor, Var};
use promptix_core::{Label, RngState};
use crate::init::{kaiming_uniform, LEAKY_SLOPE};
use tracing::debug;

/// Groups of learnable prompt tokens.
pub struct PromptTokens {
    groups: Vec<Var>,
    token_dim: usize,
    token_num: usize,
    inner_prune: f32,
}

/// Multi-group prompt, each group viewed as its own prompt graph.
pub type LightPrompt = PromptTokens;

impl std::fmt::Debug for PromptTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTokens")
            .field("groups", &self.groups.len())
            .field("token_dim", &self.token_dim)
            .field("token_num", &self.token_num)
            .field("inner_prune", &self.inner_prune)
            .finish()
    }
}

impl PromptTokens {
    /// Allocate `group_num` groups and initialise them with `init_method`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a zero size or an unknown init method.
    pub fn new(
        token_dim: usize,
        token_num: usize,
        group_num: usize,
        inner_prune: f32,
        init_method: &str,
        device: &Device,
        rng: &mut RngState,
    ) -> Result<Self> {
        if token_dim == 0 || token_num == 0 || group_num == 0 {
            return Err(Error::InvalidConfig(format!(
                "prompt needs positive sizes, got token_dim={token_dim} \
                 token_num={token_num} group_num={group_num}"
            )));
        }

        let groups = (0..group_num)
            .map(|_| Var::zeros((token_num, token_dim), DType::F32, device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let mut tokens = Self {
            groups,
            token_dim,
            token_num,
            inner_prune,
        };
        tokens.token_init(init_method, rng)?;
        Ok(tokens)
    }

    pub fn from_config(config: &PromptConfig, device: &Device, rng: &mut RngState) -> Result<Self> {
        Self::new(
            config.token_dim,
            config.token_num,
            config.group_num,
            config.inner_prune,
            &config.init_method,
            device,
            rng,
        )
    }

    /// Re-initialise every group in place.
    pub fn token_init(&mut self, init_method: &str, rng: &mut RngState) -> Result<()> {
        match init_method.parse::<InitMethod>()? {
            InitMethod::KaimingUniform => {
                for group in &self.groups {
                    let shape = (self.token_num, self.token_dim);
                    let data = kaiming_uniform(
                        self.token_num,
                        self.token_dim,
                        LEAKY_SLOPE,
                        rng.vectorized(),
                    );
                    let init = Tensor::from_vec(data, shape, group.device())?;
                    group.set(&init)?;
                }
            }
        }
        debug!(
            groups = self.groups.len(),
            token_num = self.token_num,
            token_dim = self.token_dim,
            init_method,
            "initialised prompt tokens"
        );
        Ok(())
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn token_dim(&self) -> usize {
        self.token_dim
    }

    /// Tokens per group.
    pub fn token_num(&self) -> usize {
        self.token_num
    }

    pub fn inner_prune(&self) -> f32 {
        self.inner_prune
    }

    /// Token matrix of group `i`, `(token_num, token_dim)`.
    pub fn group(&self, i: usize) -> Option<&Tensor> {
        self.groups.get(i).map(Var::as_tensor)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Tensor> {
        self.groups.iter().map(Var::as_tensor)
    }

    /// Trainable variables, one per group.
    pub fn parameters(&self) -> Vec<Var> {
        self.groups.clone()
    }

    /// `prompt.token.{i}` names alongside each variable.
    pub fn named_parameters(&self) -> Vec<(String, Var)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("prompt.token.{i}"), v.clone()))
            .collect()
    }

    /// One prompt graph per group, labelled with its group index.
    pub fn token_view(&self) -> Result<PromptedBatch> {
        let mut parts = Vec::with_capacity(self.groups.len());
        let mut labels = Vec::with_capacity(self.groups.len());
        for (i, tokens) in self.groups().enumerate() {
            parts.push((tokens.clone(), inner_edges(tokens, self.inner_prune)?));
            labels.push(Some(Label::Class(i)));
        }

        let device = self.groups[0].device().clone();
        PromptedBatch::from_parts(parts, labels, self.token_dim, &device)
    }

    /// Rebuild the prompt graphs from the current token values.
    pub fn inner_structure_update(&self) -> Result<PromptedBatch> {
        self.token_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(groups: usize, inner_prune: f32) -> PromptTokens {
        let mut rng = RngState::seed_everything(7);
        PromptTokens::new(8, 3, groups, inner_prune, "kaiming_uniform", &Device::Cpu, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_kaiming_bound() {
        let t = tokens(2, 0.5);
        let bound = ((2.0f64 / 1.0001).sqrt() * (3.0f64 / 8.0).sqrt()) as f32;
        for g in t.groups() {
            assert_eq!(g.dims(), &[3, 8]);
            let values = g.flatten_all().unwrap().to_vec1::<f32>().unwrap();
            assert!(values.iter().all(|v| v.abs() <= bound));
            assert!(values.iter().any(|&v| v != 0.0));
        }
    }

    #[test]
    fn test_same_seed_same_tokens() {
        let a = tokens(1, 0.5);
        let b = tokens(1, 0.5);
        assert_eq!(
            a.group(0).unwrap().to_vec2::<f32>().unwrap(),
            b.group(0).unwrap().to_vec2::<f32>().unwrap()
        );
    }

    #[test]
    fn test_unknown_init_method() {
        let mut rng = RngState::default();
        let err = PromptTokens::new(4, 2, 1, 0.5, "normal", &Device::Cpu, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let mut t = tokens(1, 0.5);
        assert!(t.token_init("zeros", &mut rng).is_err());
    }

    #[test]
    fn test_token_view() {
        let t = tokens(3, 0.5);
        let view = t.token_view().unwrap();

        assert_eq!(view.num_graphs(), 3);
        assert_eq!(view.num_nodes(), 9);
        assert_eq!(view.class_labels(), Some(vec![0, 1, 2]));
        for (g, &(s, d)) in view.edge_index().iter().map(|e| (view.batch()[e.0], e)) {
            assert_eq!(view.batch()[d], g);
            assert!(s < 9 && d < 9);
        }
    }

    #[test]
    fn test_prune_above_one_has_no_edges() {
        let t = tokens(2, 1.1);
        assert!(t.inner_structure_update().unwrap().edge_index().is_empty());
    }

    #[test]
    fn test_named_parameters() {
        let t = tokens(2, 0.5);
        let names: Vec<String> = t.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["prompt.token.0", "prompt.token.1"]);
        assert_eq!(t.parameters().len(), 2);
    }
}
