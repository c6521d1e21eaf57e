//! Read-only view of an encoder's final representation.

use candle_core::Tensor;

/// Anything that exposes a `(batch, feature)` output tensor to a decoder.
pub trait Stateful {
    /// The encoder's final state, shaped `(batch, feature)`.
    fn output(&self) -> &Tensor;
}

impl Stateful for Tensor {
    fn output(&self) -> &Tensor {
        self
    }
}
