//! Multilayer perceptron built from stacked dense layers.
//!
//! Each layer `i` is a dense projection registered under `mlp_layer_{i}` of the
//! supplied builder, followed by the shared activation and dropout gated by the
//! training flag. The output width equals the last entry of
//! [`MultilayerConfig::layer_sizes`].

use std::{fmt, sync::Arc};

use candle_core::{Error, Result, Tensor};
use candle_nn::VarBuilder;

use crate::{
    activations::{builtin, Activation, ActivationKind},
    dropout::{dropout, validate_keep_prob},
    linear::dense,
};

/// Configuration of a multilayer projection.
#[derive(Clone)]
pub struct MultilayerConfig {
    /// Widths of the hidden layers, in order.
    pub layer_sizes: Vec<usize>,
    /// Activation applied after every layer.
    pub activation: Arc<dyn Activation>,
    /// Keep probability of the dropout applied after every layer.
    pub dropout_keep_prob: f32,
}

impl fmt::Debug for MultilayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultilayerConfig")
            .field("layer_sizes", &self.layer_sizes)
            .field("activation", &self.activation.kind())
            .field("dropout_keep_prob", &self.dropout_keep_prob)
            .finish()
    }
}

impl MultilayerConfig {
    /// Creates a configuration with a ReLU activation and no dropout.
    pub fn new(layer_sizes: Vec<usize>) -> Self {
        Self {
            layer_sizes,
            activation: builtin(ActivationKind::Relu),
            dropout_keep_prob: 1.0,
        }
    }

    /// Validates layer sizes and the dropout keep probability.
    pub fn validate(&self) -> Result<()> {
        if let Some(problem) = layer_sizes_problem(&self.layer_sizes) {
            return Err(Error::Msg(problem));
        }
        validate_keep_prob(self.dropout_keep_prob)
    }

    /// Width of the final layer.
    pub fn output_size(&self) -> Option<usize> {
        self.layer_sizes.last().copied()
    }
}

/// Describes what is wrong with a layer size list, `None` when it is usable.
pub fn layer_sizes_problem(layer_sizes: &[usize]) -> Option<String> {
    if layer_sizes.is_empty() {
        return Some("multilayer projection needs at least one layer".into());
    }
    layer_sizes
        .iter()
        .position(|size| *size == 0)
        .map(|idx| format!("mlp layer {idx} has zero width"))
}

/// Runs `input` through the configured layer stack.
pub fn multilayer_projection(
    input: &Tensor,
    config: &MultilayerConfig,
    train: bool,
    vb: VarBuilder,
) -> Result<Tensor> {
    config.validate()?;
    let mut hidden = input.clone();
    for (idx, size) in config.layer_sizes.iter().enumerate() {
        hidden = dense(
            &hidden,
            *size,
            Some(Arc::clone(&config.activation)),
            vb.pp(format!("mlp_layer_{idx}")),
        )?;
        hidden = dropout(&hidden, config.dropout_keep_prob, train)?;
    }
    Ok(hidden)
}
