//! Dense (affine) projection helpers.
//!
//! Dense layers expect inputs shaped `(batch, in_dim)` and return tensors with
//! `(batch, out_dim)`. Parameters are fetched from a [`VarBuilder`]: the first
//! call under a prefix allocates `weight` `(out_dim, in_dim)` and `bias`
//! `(out_dim,)`, every later call under the same prefix returns the stored
//! variables, so the layer can be rebuilt at each decoding step without
//! duplicating weights. Weights start Glorot uniform, biases at zero.

use std::{fmt, sync::Arc};

use candle_core::{Result, Tensor};
use candle_nn::{Init, Linear, Module, VarBuilder};

use crate::{activations::Activation, checks};

/// Xavier/Glorot uniform initialiser for a `(out_dim, in_dim)` weight.
pub fn glorot_uniform(in_dim: usize, out_dim: usize) -> Init {
    let bound = (6.0f64 / (in_dim + out_dim) as f64).sqrt();
    Init::Uniform {
        lo: -bound,
        up: bound,
    }
}

/// Affine projection with an optional activation, backed by builder-owned parameters.
#[derive(Clone)]
pub struct Dense {
    input_dim: usize,
    output_dim: usize,
    linear: Linear,
    activation: Option<Arc<dyn Activation>>,
}

impl fmt::Debug for Dense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dense")
            .field("input_dim", &self.input_dim)
            .field("output_dim", &self.output_dim)
            .field("activation", &self.activation.as_ref().map(|a| a.kind()))
            .finish()
    }
}

impl Dense {
    /// Fetches (or allocates) the layer parameters under the builder prefix.
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        activation: Option<Arc<dyn Activation>>,
        vb: VarBuilder,
    ) -> Result<Self> {
        if input_dim == 0 || output_dim == 0 {
            return Err(candle_core::Error::Msg(format!(
                "dense layer dimensions must be non-zero, got {input_dim} -> {output_dim}"
            )));
        }
        if vb.contains_tensor("weight") {
            log::debug!("dense {}: reusing parameters", vb.prefix());
        } else {
            log::debug!(
                "dense {}: allocating {}x{} weight",
                vb.prefix(),
                output_dim,
                input_dim
            );
        }

        let weight = vb.get_with_hints(
            (output_dim, input_dim),
            "weight",
            glorot_uniform(input_dim, output_dim),
        )?;
        let bias = vb.get_with_hints(output_dim, "bias", Init::Const(0.0))?;

        Ok(Self {
            input_dim,
            output_dim,
            linear: Linear::new(weight, Some(bias)),
            activation,
        })
    }

    /// Returns the weight tensor shared with the builder.
    pub fn weight(&self) -> &Tensor {
        self.linear.weight()
    }

    /// Applies the affine map followed by the optional activation.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let width = checks::feature_width("dense.input", input)?;
        if width != self.input_dim {
            return Err(candle_core::Error::Msg(format!(
                "dense.input: expected last dim {} but received {}",
                self.input_dim, width
            )));
        }
        let projected = self.linear.forward(input)?;
        match &self.activation {
            Some(activation) => activation.forward(&projected),
            None => Ok(projected),
        }
    }
}

/// Projects a `(batch, in_dim)` tensor to `units` features, inferring `in_dim`.
pub fn dense(
    input: &Tensor,
    units: usize,
    activation: Option<Arc<dyn Activation>>,
    vb: VarBuilder,
) -> Result<Tensor> {
    let input_dim = checks::feature_width("dense.input", input)?;
    Dense::new(input_dim, units, activation, vb)?.forward(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::{builtin, ActivationKind};
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn forward_matches_reference() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let layer = Dense::new(6, 4, None, vb.pp("proj"))?;

        let input = Tensor::randn(0f32, 1.0, (3, 6), &device)?;
        let output = layer.forward(&input)?;
        assert_eq!(output.dims(), &[3, 4]);

        let reference = input.matmul(&layer.weight().t()?)?;
        let diff = output.sub(&reference)?.abs()?.max_all()?.to_vec0::<f32>()?;
        // bias starts at zero
        assert!(diff <= 1e-5);
        Ok(())
    }

    #[test]
    fn rebuilding_under_same_prefix_reuses_parameters() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let first = Dense::new(8, 5, None, vb.pp("shared"))?;
        let second = Dense::new(8, 5, None, vb.pp("shared"))?;
        assert_eq!(varmap.all_vars().len(), 2);

        let diff = first
            .weight()
            .sub(second.weight())?
            .abs()?
            .max_all()?
            .to_vec0::<f32>()?;
        assert_eq!(diff, 0.0);
        Ok(())
    }

    #[test]
    fn conflicting_shape_under_same_prefix_fails() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        Dense::new(8, 5, None, vb.pp("shared"))?;
        assert!(Dense::new(9, 5, None, vb.pp("shared")).is_err());
        Ok(())
    }

    #[test]
    fn dense_applies_activation_and_checks_width() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let input = Tensor::randn(0f32, 3.0, (4, 10), &device)?;
        let output = dense(&input, 7, Some(builtin(ActivationKind::Relu)), vb.pp("relu"))?;
        assert_eq!(output.dims(), &[4, 7]);
        let min = output.min_all()?.to_vec0::<f32>()?;
        assert!(min >= 0.0);

        let layer = Dense::new(10, 7, None, vb.pp("relu"))?;
        let narrow = Tensor::zeros((4, 3), DType::F32, &device)?;
        assert!(layer.forward(&narrow).is_err());
        Ok(())
    }

    #[test]
    fn weights_start_within_glorot_bound() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let layer = Dense::new(128, 64, None, vb)?;

        let bound = (6.0f64 / (128.0 + 64.0)).sqrt() as f32;
        let max = layer.weight().abs()?.max_all()?.to_vec0::<f32>()?;
        assert!(max <= bound);
        // a uniform draw of 8192 values spreads close to the bound
        assert!(max > bound * 0.9);

        let bias = varmap.data().lock().unwrap()["bias"].as_tensor().clone();
        assert_eq!(bias.abs()?.max_all()?.to_vec0::<f32>()?, 0.0);
        Ok(())
    }
}
