//! Dropout gated by the decoder's training flag.
//!
//! Probabilities are expressed as *keep* probabilities in `(0, 1]`. A keep
//! probability of `1.0` or an evaluation-mode call returns the input
//! unchanged; otherwise inverted dropout scales the kept activations by
//! `1 / keep_prob` so expectations match evaluation mode.

use candle_core::{Error, Result, Tensor};

/// Rejects keep probabilities outside `(0, 1]`.
pub fn validate_keep_prob(keep_prob: f32) -> Result<()> {
    if keep_prob > 0.0 && keep_prob <= 1.0 {
        Ok(())
    } else {
        Err(Error::Msg(format!(
            "dropout keep probability must be in (0, 1], got {keep_prob}"
        )))
    }
}

/// Applies dropout to `tensor` when `train` is set.
pub fn dropout(tensor: &Tensor, keep_prob: f32, train: bool) -> Result<Tensor> {
    validate_keep_prob(keep_prob)?;
    if !train || keep_prob >= 1.0 {
        return Ok(tensor.clone());
    }
    candle_nn::ops::dropout(tensor, 1.0 - keep_prob)
}
