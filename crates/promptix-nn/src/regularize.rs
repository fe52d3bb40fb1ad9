//! Regularizers on prompt tokens.

use crate::token::PromptTokens;
use crate::{Error, Result};
use candle_core::{DType, Tensor};

/// `||P P^T - I||_F` for one token matrix `P`.
pub fn orthogonality(tokens: &Tensor) -> Result<Tensor> {
    let n = tokens.dim(0)?;
    let gram = tokens.matmul(&tokens.t()?)?;
    let eye = Tensor::eye(n, DType::F32, tokens.device())?;
    Ok((gram - eye)?.sqr()?.sum_all()?.sqrt()?)
}

/// Mean orthogonality penalty over every token group.
///
/// Pushes tokens of a group apart so the prompt graph does not collapse to
/// a single direction.
pub fn orthogonality_penalty(tokens: &PromptTokens) -> Result<Tensor> {
    let mut total: Option<Tensor> = None;
    for group in tokens.groups() {
        let term = orthogonality(group)?;
        total = Some(match total {
            Some(acc) => (acc + term)?,
            None => term,
        });
    }
    let total = total.ok_or_else(|| Error::InvalidConfig("no token groups".into()))?;
    Ok((total / tokens.num_groups() as f64)?)
}
