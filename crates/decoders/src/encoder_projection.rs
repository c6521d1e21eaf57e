//! Encoder projections.
//!
//! An encoder projection turns the final states of one or more encoders into
//! the initial state of a decoder. Three variants are available:
//!
//! * [`empty_initial_state`] ignores the encoders and returns zeros,
//! * [`linear_encoder_projection`] concatenates the encoder states, applies
//!   dropout and projects them to the decoder's `rnn_size`,
//! * [`concat_encoder_projection`] returns the plain concatenation.
//!
//! Trainable parameters of the linear variant are registered under
//! `encoders_projection` of the builder handed to [`EncoderProjection::project`].

use candle_core::Tensor;
use candle_nn::VarBuilder;
use layers::{checks, dense, dropout, dropout::validate_keep_prob};

use crate::{
    errors::{require_positive, ProjectionError, Result},
    stateful::Stateful,
};

/// Parameter prefix of the linear encoder projection.
pub const ENCODERS_PROJECTION_SCOPE: &str = "encoders_projection";

/// Arguments of a single encoder projection call.
///
/// Defaults: evaluation mode, no declared `rnn_size`, no encoders.
#[derive(Clone, Copy)]
pub struct EncoderProjectionInput<'a> {
    /// Whether dropout is active.
    pub train_mode: bool,
    /// Size of the decoder state the projection should produce.
    pub rnn_size: Option<usize>,
    /// Encoders in the order their states are concatenated.
    pub encoders: &'a [&'a dyn Stateful],
}

impl Default for EncoderProjectionInput<'_> {
    fn default() -> Self {
        Self {
            train_mode: false,
            rnn_size: None,
            encoders: &[],
        }
    }
}

impl<'a> EncoderProjectionInput<'a> {
    pub fn new(train_mode: bool) -> Self {
        Self {
            train_mode,
            ..Self::default()
        }
    }

    pub fn with_rnn_size(mut self, rnn_size: usize) -> Self {
        self.rnn_size = Some(rnn_size);
        self
    }

    pub fn with_encoders(mut self, encoders: &'a [&'a dyn Stateful]) -> Self {
        self.encoders = encoders;
        self
    }
}

/// Strategy used to build the decoder's initial state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncoderProjection {
    /// Zero vector of size `rnn_size`.
    Empty,
    /// Dropout followed by an affine projection of the concatenated encoders.
    Linear { dropout_keep_prob: f32 },
    /// Concatenated encoder states.
    Concat,
}

/// Returns a projection producing a zero initial state.
pub fn empty_initial_state() -> EncoderProjection {
    EncoderProjection::Empty
}

/// Returns a linear projection with the given dropout keep probability.
pub fn linear_encoder_projection(dropout_keep_prob: f32) -> Result<EncoderProjection> {
    validate_keep_prob(dropout_keep_prob)
        .map_err(|err| ProjectionError::invalid_config(err.to_string()))?;
    Ok(EncoderProjection::Linear { dropout_keep_prob })
}

/// Returns a projection concatenating the encoder states.
pub fn concat_encoder_projection() -> EncoderProjection {
    EncoderProjection::Concat
}

impl EncoderProjection {
    /// Computes the decoder's initial state.
    ///
    /// The empty projection returns a `(rnn_size,)` vector; the other
    /// variants return `(batch, width)` tensors.
    pub fn project(&self, input: &EncoderProjectionInput<'_>, vb: &VarBuilder) -> Result<Tensor> {
        match self {
            EncoderProjection::Empty => {
                let rnn_size = input.rnn_size.ok_or(ProjectionError::MissingSize)?;
                Ok(Tensor::zeros(rnn_size, vb.dtype(), vb.device())?)
            }
            EncoderProjection::Linear { dropout_keep_prob } => {
                let rnn_size = input.rnn_size.ok_or(ProjectionError::MissingSize)?;
                require_positive("rnn_size", rnn_size)?;
                let encoded = concat_encoders(input.encoders)?;
                let encoded = dropout(&encoded, *dropout_keep_prob, input.train_mode)?;
                Ok(dense(
                    &encoded,
                    rnn_size,
                    None,
                    vb.pp(ENCODERS_PROJECTION_SCOPE),
                )?)
            }
            EncoderProjection::Concat => {
                let computed = encoders_width(input.encoders)?;
                if let Some(declared) = input.rnn_size {
                    if declared != computed {
                        return Err(ProjectionError::SizeMismatch { declared, computed });
                    }
                }
                let encoded = concat_encoders(input.encoders)?;
                log::info!(
                    "The inferred rnn_size of this encoder projection will be {}",
                    encoded.dims()[1]
                );
                Ok(encoded)
            }
        }
    }
}

fn encoders_width(encoders: &[&dyn Stateful]) -> Result<usize> {
    if encoders.is_empty() {
        return Err(ProjectionError::NoEncoders);
    }
    let mut total = 0;
    for encoder in encoders {
        total += checks::feature_width("encoder.output", encoder.output())?;
    }
    Ok(total)
}

fn concat_encoders(encoders: &[&dyn Stateful]) -> Result<Tensor> {
    if encoders.is_empty() {
        return Err(ProjectionError::NoEncoders);
    }
    let outputs: Vec<&Tensor> = encoders.iter().map(|encoder| encoder.output()).collect();
    checks::expect_same_rows("encoder.output", &outputs)?;
    Ok(Tensor::cat(&outputs, 1)?)
}
