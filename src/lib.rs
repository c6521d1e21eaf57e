//! Configurable encoder and output projections for sequence-to-sequence decoders.
//!
//! The workspace is split the same way the projections are layered:
//! [`layers`] holds the dense, maxout and multilayer primitives and
//! [`decoders`] composes them into encoder and output projections selected by
//! configuration.

pub use decoders;
pub use layers;

pub use decoders::{
    EncoderProjection, EncoderProjectionInput, OutputProjection, ProjectionConfig,
    ProjectionError, Stateful, StepInput,
};
