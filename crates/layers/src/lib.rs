//! Building blocks for sequence-to-sequence projection layers.
//!
//! This crate hosts the dense, maxout and multilayer primitives that decoder
//! projections are assembled from. Every primitive takes a
//! [`candle_nn::VarBuilder`] so that trainable parameters are registered under
//! a caller-controlled prefix and shared across repeated invocations.

pub mod activations;
pub mod checks;
pub mod dropout;
pub mod linear;
pub mod maxout;
pub mod mlp;

pub use activations::{builtin, Activation, ActivationKind};
pub use dropout::dropout;
pub use linear::{dense, glorot_uniform, Dense};
pub use maxout::{maxout, DEFAULT_POOL_SIZE};
pub use mlp::{layer_sizes_problem, multilayer_projection, MultilayerConfig};
