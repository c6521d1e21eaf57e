//! Maxout projection.
//!
//! The input `(batch, in_dim)` is projected to `size * pool_size` features,
//! viewed as `(batch, pool_size, size)` and reduced with an element-wise max
//! over the pool axis, so feature `j` of the result is the maximum of
//! projected features `j, size + j, 2 * size + j, ...`. With the default pool
//! size of 2 this is the deep-output layer of Bahdanau et al. (2015).

use candle_core::{Error, Result, Tensor};
use candle_nn::VarBuilder;

use crate::linear::dense;

/// Number of affine pieces each maxout unit takes the maximum over.
pub const DEFAULT_POOL_SIZE: usize = 2;

/// Applies a maxout layer of width `size`, registering parameters under `vb`.
pub fn maxout(input: &Tensor, size: usize, pool_size: usize, vb: VarBuilder) -> Result<Tensor> {
    if size == 0 || pool_size == 0 {
        return Err(Error::Msg(format!(
            "maxout requires non-zero size and pool size, got size={size} pool_size={pool_size}"
        )));
    }
    let (batch, _) = input.dims2()?;
    let projected = dense(input, size * pool_size, None, vb)?;
    projected.reshape((batch, pool_size, size))?.max(1)
}
