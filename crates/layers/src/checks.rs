//! Lightweight validation helpers shared across layer components.
//!
//! These routines provide concise shape assertions that can be wired into
//! constructors or forward paths. They return `candle_core::Result` so call
//! sites can propagate errors without panicking.

use candle_core::{Error, Result, Tensor};

/// Ensures a tensor has exactly `rank` dimensions.
pub fn expect_rank(name: &str, tensor: &Tensor, rank: usize) -> Result<()> {
    let dims = tensor.dims();
    if dims.len() == rank {
        Ok(())
    } else {
        Err(Error::Msg(format!(
            "{name}: expected rank {rank}, got shape {dims:?}"
        )))
    }
}

/// Returns the feature width of a `(batch, feature)` tensor.
pub fn feature_width(name: &str, tensor: &Tensor) -> Result<usize> {
    expect_rank(name, tensor, 2)?;
    Ok(tensor.dims()[1])
}

/// Checks that every tensor is `(batch, feature)` with the same batch size.
pub fn expect_same_rows(name: &str, tensors: &[&Tensor]) -> Result<()> {
    let mut rows = None;
    for (idx, tensor) in tensors.iter().enumerate() {
        expect_rank(name, tensor, 2)?;
        let current = tensor.dims()[0];
        match rows {
            None => rows = Some(current),
            Some(expected) if expected != current => {
                return Err(Error::Msg(format!(
                    "{name}: tensor {idx} has batch size {current}, expected {expected}"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
