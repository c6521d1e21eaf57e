//! Output projections of a recurrent decoder.
//!
//! An output projection computes the decoder output at one time step from the
//! previous recurrent state, the previous output and the attention context
//! vectors. Projections are rebuilt at every step; parameters live under a
//! fixed prefix of the builder so each step shares the same weights.
//!
//! | variant | input | layer | prefix |
//! |---------|-------|-------|--------|
//! | [`legacy_linear`] | state + ctx | affine | `attn_output_projection` |
//! | [`legacy_relu`] | state + ctx | affine + relu | `attn_output_projection` |
//! | [`nonlinear_output`] | state + output + ctx | dense + activation | `nonlinear_output` |
//! | [`maxout_output`] | state + output + ctx | maxout | `maxout_projection` |
//! | [`mlp_output`] | state + output + ctx | dense stack | `deep_output_mlp` |

use std::{fmt, sync::Arc};

use candle_core::Tensor;
use candle_nn::VarBuilder;
use layers::{
    builtin, checks, dense, maxout, multilayer_projection, Activation, ActivationKind,
    MultilayerConfig, DEFAULT_POOL_SIZE,
};

use crate::errors::{require_positive, ProjectionError, Result};

pub const ATTN_OUTPUT_PROJECTION_SCOPE: &str = "attn_output_projection";
pub const NONLINEAR_OUTPUT_SCOPE: &str = "nonlinear_output";
pub const MAXOUT_PROJECTION_SCOPE: &str = "maxout_projection";
pub const DEEP_OUTPUT_MLP_SCOPE: &str = "deep_output_mlp";

/// Tensors available to an output projection at one decoding step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    /// Recurrent state from the previous step, `(batch, rnn_size)`.
    pub prev_state: &'a Tensor,
    /// Embedded output from the previous step, `(batch, embedding_size)`.
    pub prev_output: &'a Tensor,
    /// One `(batch, ctx_size)` tensor per attention mechanism.
    pub ctx_tensors: &'a [Tensor],
    /// Whether dropout is active.
    pub train_mode: bool,
}

impl<'a> StepInput<'a> {
    pub fn new(prev_state: &'a Tensor, prev_output: &'a Tensor, ctx_tensors: &'a [Tensor]) -> Self {
        Self {
            prev_state,
            prev_output,
            ctx_tensors,
            train_mode: false,
        }
    }

    pub fn train(mut self, train_mode: bool) -> Self {
        self.train_mode = train_mode;
        self
    }

    /// `[prev_state] + ctx_tensors` along the feature axis.
    pub fn state_with_ctx(&self) -> Result<Tensor> {
        let mut parts = vec![self.prev_state];
        parts.extend(self.ctx_tensors.iter());
        concat_features(&parts)
    }

    /// `[prev_state, prev_output] + ctx_tensors` along the feature axis.
    pub fn state_output_ctx(&self) -> Result<Tensor> {
        let mut parts = vec![self.prev_state, self.prev_output];
        parts.extend(self.ctx_tensors.iter());
        concat_features(&parts)
    }
}

fn concat_features(parts: &[&Tensor]) -> Result<Tensor> {
    checks::expect_same_rows("output_projection.input", parts)?;
    Ok(Tensor::cat(parts, 1)?)
}

/// User supplied projection function.
pub type ProjectionFn = dyn Fn(&StepInput<'_>, &VarBuilder) -> Result<Tensor> + Send + Sync;

/// Strategy computing the decoder output at each step.
#[derive(Clone)]
pub enum OutputProjection {
    /// Affine map of the state and contexts. Kept for configurations trained
    /// before the ReLU projection became the default.
    LegacyLinear { output_size: usize },
    /// Affine map of the state and contexts followed by ReLU.
    LegacyRelu { output_size: usize },
    /// Single dense layer over state, previous output and contexts.
    Nonlinear {
        output_size: usize,
        activation: Arc<dyn Activation>,
    },
    /// Maxout deep-output layer.
    Maxout { maxout_size: usize, pool_size: usize },
    /// Multilayer perceptron deep output.
    Mlp(MultilayerConfig),
    /// Arbitrary function with an optionally declared output width.
    Custom {
        func: Arc<ProjectionFn>,
        output_size: Option<usize>,
    },
}

impl fmt::Debug for OutputProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputProjection::LegacyLinear { output_size } => f
                .debug_struct("LegacyLinear")
                .field("output_size", output_size)
                .finish(),
            OutputProjection::LegacyRelu { output_size } => f
                .debug_struct("LegacyRelu")
                .field("output_size", output_size)
                .finish(),
            OutputProjection::Nonlinear {
                output_size,
                activation,
            } => f
                .debug_struct("Nonlinear")
                .field("output_size", output_size)
                .field("activation", &activation.kind())
                .finish(),
            OutputProjection::Maxout {
                maxout_size,
                pool_size,
            } => f
                .debug_struct("Maxout")
                .field("maxout_size", maxout_size)
                .field("pool_size", pool_size)
                .finish(),
            OutputProjection::Mlp(config) => f.debug_tuple("Mlp").field(config).finish(),
            OutputProjection::Custom { output_size, .. } => f
                .debug_struct("Custom")
                .field("output_size", output_size)
                .finish_non_exhaustive(),
        }
    }
}

/// Affine projection of the state and contexts.
///
/// For checkpoints of older models set `output_size` to the decoder's
/// `rnn_size`.
pub fn legacy_linear(output_size: usize) -> Result<OutputProjection> {
    require_positive("output_size", output_size)?;
    Ok(OutputProjection::LegacyLinear { output_size })
}

/// Affine projection of the state and contexts followed by ReLU.
///
/// For checkpoints of older models set `output_size` to the decoder's
/// `rnn_size`.
pub fn legacy_relu(output_size: usize) -> Result<OutputProjection> {
    require_positive("output_size", output_size)?;
    Ok(OutputProjection::LegacyRelu { output_size })
}

/// Dense layer over the state, previous output and contexts.
///
/// `activation` defaults to [`ActivationKind::Tanh`] when `None`.
pub fn nonlinear_output(
    output_size: usize,
    activation: Option<Arc<dyn Activation>>,
) -> Result<OutputProjection> {
    require_positive("output_size", output_size)?;
    Ok(OutputProjection::Nonlinear {
        output_size,
        activation: activation.unwrap_or_else(|| builtin(ActivationKind::Tanh)),
    })
}

/// Maxout deep output (Bahdanau et al., 2015, the `t_tilde` computation),
/// before the final linear projection to the vocabulary.
pub fn maxout_output(maxout_size: usize) -> Result<OutputProjection> {
    maxout_output_with_pool(maxout_size, DEFAULT_POOL_SIZE)
}

/// Maxout deep output taking the maximum over `pool_size` pieces.
pub fn maxout_output_with_pool(maxout_size: usize, pool_size: usize) -> Result<OutputProjection> {
    require_positive("maxout_size", maxout_size)?;
    require_positive("pool_size", pool_size)?;
    Ok(OutputProjection::Maxout {
        maxout_size,
        pool_size,
    })
}

/// Multilayer perceptron deep output (Pascanu et al., 2013).
///
/// `activation` defaults to tanh and `dropout_keep_prob` to `1.0`.
pub fn mlp_output(
    layer_sizes: Vec<usize>,
    activation: Option<Arc<dyn Activation>>,
    dropout_keep_prob: Option<f32>,
) -> Result<OutputProjection> {
    let config = MultilayerConfig {
        layer_sizes,
        activation: activation.unwrap_or_else(|| builtin(ActivationKind::Tanh)),
        dropout_keep_prob: dropout_keep_prob.unwrap_or(1.0),
    };
    config
        .validate()
        .map_err(|err| ProjectionError::invalid_config(err.to_string()))?;
    Ok(OutputProjection::Mlp(config))
}

impl OutputProjection {
    /// Wraps a custom projection function.
    pub fn custom<F>(func: F, output_size: Option<usize>) -> Self
    where
        F: Fn(&StepInput<'_>, &VarBuilder) -> Result<Tensor> + Send + Sync + 'static,
    {
        Self::Custom {
            func: Arc::new(func),
            output_size,
        }
    }

    /// Width of the produced output when the projection declares one.
    pub fn output_size(&self) -> Option<usize> {
        match self {
            OutputProjection::LegacyLinear { output_size }
            | OutputProjection::LegacyRelu { output_size }
            | OutputProjection::Nonlinear { output_size, .. } => Some(*output_size),
            OutputProjection::Maxout { maxout_size, .. } => Some(*maxout_size),
            OutputProjection::Mlp(config) => config.output_size(),
            OutputProjection::Custom { output_size, .. } => *output_size,
        }
    }

    /// Declared output width, or `fallback` (typically the decoder's `rnn_size`).
    pub fn resolve_output_size(&self, fallback: usize) -> usize {
        self.output_size().unwrap_or(fallback)
    }

    /// Computes the output for one decoding step.
    pub fn project(&self, input: &StepInput<'_>, vb: &VarBuilder) -> Result<Tensor> {
        let output = match self {
            OutputProjection::LegacyLinear { output_size } => dense(
                &input.state_with_ctx()?,
                *output_size,
                None,
                vb.pp(ATTN_OUTPUT_PROJECTION_SCOPE),
            )?,
            OutputProjection::LegacyRelu { output_size } => dense(
                &input.state_with_ctx()?,
                *output_size,
                Some(builtin(ActivationKind::Relu)),
                vb.pp(ATTN_OUTPUT_PROJECTION_SCOPE),
            )?,
            OutputProjection::Nonlinear {
                output_size,
                activation,
            } => dense(
                &input.state_output_ctx()?,
                *output_size,
                Some(Arc::clone(activation)),
                vb.pp(NONLINEAR_OUTPUT_SCOPE),
            )?,
            OutputProjection::Maxout {
                maxout_size,
                pool_size,
            } => maxout(
                &input.state_output_ctx()?,
                *maxout_size,
                *pool_size,
                vb.pp(MAXOUT_PROJECTION_SCOPE),
            )?,
            OutputProjection::Mlp(config) => multilayer_projection(
                &input.state_output_ctx()?,
                config,
                input.train_mode,
                vb.pp(DEEP_OUTPUT_MLP_SCOPE),
            )?,
            OutputProjection::Custom { func, .. } => func.as_ref()(input, vb)?,
        };
        Ok(output)
    }
}
