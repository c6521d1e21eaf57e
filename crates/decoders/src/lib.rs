//! Encoder and output projections for recurrent sequence-to-sequence decoders.
//!
//! * [`encoder_projection`] builds the decoder's initial state from encoder
//!   final states.
//! * [`output_projection`] computes the per-step decoder output from the
//!   previous state, the previous output and attention contexts.
//! * [`config`] selects either family from TOML/JSON.
//!
//! Projections allocate their parameters in the [`candle_nn::VarMap`] behind
//! the supplied [`candle_nn::VarBuilder`] on first use and re-use them on every
//! later call, so a decoder may rebuild them at each time step.

pub mod config;
pub mod encoder_projection;
pub mod errors;
pub mod output_projection;
pub mod stateful;

pub use config::{EncoderProjectionConfig, OutputProjectionConfig, ProjectionConfig};
pub use encoder_projection::{
    concat_encoder_projection, empty_initial_state, linear_encoder_projection, EncoderProjection,
    EncoderProjectionInput,
};
pub use errors::{ProjectionError, Result};
pub use output_projection::{
    legacy_linear, legacy_relu, maxout_output, maxout_output_with_pool, mlp_output,
    nonlinear_output, OutputProjection, StepInput,
};
pub use stateful::Stateful;
