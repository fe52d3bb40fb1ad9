//! Parameter initialisation drawn from an [`RngState`] stream.
//!
//! Every learnable tensor in this crate (prompt tokens, head weights,
//! reference encoder weights) is sampled here, so one
//! `RngState::seed_everything` call fixes a whole model.

use crate::{Error, Result};
use candle_core::{Device, Tensor, Var};
use candle_nn::Linear;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Negative slope the token Kaiming gain is computed for.
pub(crate) const LEAKY_SLOPE: f64 = 0.01;

/// Slope giving the default linear-layer bound `1 / sqrt(fan_in)`.
const LINEAR_SLOPE: f64 = 2.236_067_977_499_79;

/// Kaiming-uniform samples for a `(rows, fan_in)` matrix.
///
/// `bound = gain * sqrt(3 / fan_in)` with `gain = sqrt(2 / (1 + slope^2))`.
pub(crate) fn kaiming_uniform<R: Rng + ?Sized>(
    rows: usize,
    fan_in: usize,
    negative_slope: f64,
    rng: &mut R,
) -> Vec<f32> {
    let gain = (2.0 / (1.0 + negative_slope * negative_slope)).sqrt();
    let bound = (gain * (3.0 / fan_in as f64).sqrt()) as f32;
    uniform(rows * fan_in, bound, rng)
}

fn uniform<R: Rng + ?Sized>(len: usize, bound: f32, rng: &mut R) -> Vec<f32> {
    let dist = Uniform::new_inclusive(-bound, bound);
    (0..len).map(|_| dist.sample(rng)).collect()
}

/// Linear layer `in_dim -> out_dim` with seeded weight and bias.
///
/// Weight and bias follow the usual linear-layer scheme, both uniform in
/// `[-1/sqrt(in_dim), 1/sqrt(in_dim)]`. Returns the layer and its variables
/// (`[weight, bias]`); updating the variables updates the layer.
pub(crate) fn seeded_linear<R: Rng + ?Sized>(
    in_dim: usize,
    out_dim: usize,
    device: &Device,
    rng: &mut R,
) -> Result<(Linear, Vec<Var>)> {
    if in_dim == 0 || out_dim == 0 {
        return Err(Error::InvalidConfig(format!(
            "linear layer needs positive sizes, got {in_dim} -> {out_dim}"
        )));
    }

    let w = kaiming_uniform(out_dim, in_dim, LINEAR_SLOPE, rng);
    let weight = Var::from_tensor(&Tensor::from_vec(w, (out_dim, in_dim), device)?)?;
    let b = uniform(out_dim, (1.0 / (in_dim as f64).sqrt()) as f32, rng);
    let bias = Var::from_tensor(&Tensor::from_vec(b, out_dim, device)?)?;

    let linear = Linear::new(weight.as_tensor().clone(), Some(bias.as_tensor().clone()));
    Ok((linear, vec![weight, bias]))
}
