//! Activation catalogue for decoder projection layers.
//!
//! Activations consume tensors of any layout and return tensors with an
//! identical shape and dtype. Projection layers hold them behind
//! `Arc<dyn Activation>` so a single activation can be shared between every
//! layer of a stack and every decoding step.
//!
//! # Built-in formulas
//!
//! * **Tanh** is the default non-linearity of deep-output projections.
//! * **GELU** uses the erf-based formulation
//!   `0.5 * x * (1 + erf(x / sqrt(2)))`.
//! * **SiLU / Swish** computes `x * sigmoid(x)` via the fused kernel exposed by
//!   Candle.
//! * **Sigmoid** uses `candle_nn::ops::sigmoid`.

use std::sync::Arc;

use candle_core::{Result, Tensor};
use serde::Deserialize;

/// Identifies which non-linearity is implemented by an [`Activation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    /// Identity function, turns a dense layer into a plain affine map.
    Identity,
    /// Hyperbolic tangent.
    #[default]
    Tanh,
    /// ReLU, zeroes out negative values.
    Relu,
    /// Logistic sigmoid.
    Sigmoid,
    /// GeLU with the erf formulation.
    Gelu,
    /// Standard SiLU (a.k.a. swish) activation.
    Silu,
}

/// Common interface shared by projection activation functions.
pub trait Activation: Send + Sync {
    /// Returns the [`ActivationKind`] for introspection and logging.
    fn kind(&self) -> ActivationKind;

    /// Applies the activation to `input`.
    fn forward(&self, input: &Tensor) -> Result<Tensor>;
}

/// Built-in activation backed by Candle kernels.
struct BuiltinActivation {
    kind: ActivationKind,
}

impl Activation for BuiltinActivation {
    fn kind(&self) -> ActivationKind {
        self.kind
    }

    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        match self.kind {
            ActivationKind::Identity => Ok(input.clone()),
            ActivationKind::Tanh => input.tanh(),
            ActivationKind::Relu => input.relu(),
            ActivationKind::Sigmoid => candle_nn::ops::sigmoid(input),
            ActivationKind::Gelu => input.gelu_erf(),
            ActivationKind::Silu => input.silu(),
        }
    }
}

/// Returns a shared built-in activation implementation.
pub fn builtin(kind: ActivationKind) -> Arc<dyn Activation> {
    Arc::new(BuiltinActivation { kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use std::f64::consts::SQRT_2;

    fn max_abs_diff(a: &Tensor, b: &Tensor) -> Result<f32> {
        a.sub(b)?.abs()?.max_all()?.to_vec0::<f32>()
    }

    #[test]
    fn default_kind_is_tanh() {
        assert_eq!(ActivationKind::default(), ActivationKind::Tanh);
        assert_eq!(builtin(ActivationKind::default()).kind(), ActivationKind::Tanh);
    }

    #[test]
    fn tanh_is_bounded_and_odd() -> Result<()> {
        let device = Device::Cpu;
        let activation = builtin(ActivationKind::Tanh);
        let input = Tensor::from_slice(&[-20.0f32, -1.0, 0.0, 1.0, 20.0], (5,), &device)?;
        let output = activation.forward(&input)?.to_vec1::<f32>()?;

        assert!(output.iter().all(|v| v.abs() <= 1.0));
        assert_eq!(output[2], 0.0);
        assert!((output[1] + output[3]).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn relu_zeroes_negatives() -> Result<()> {
        let device = Device::Cpu;
        let activation = builtin(ActivationKind::Relu);
        let input = Tensor::from_slice(&[-2.0f32, -0.5, 0.0, 0.5, 2.0], (5,), &device)?;
        let output = activation.forward(&input)?.to_vec1::<f32>()?;
        assert_eq!(output, vec![0.0, 0.0, 0.0, 0.5, 2.0]);
        Ok(())
    }

    #[test]
    fn gelu_matches_reference_formula() -> Result<()> {
        let device = Device::Cpu;
        let activation = builtin(ActivationKind::Gelu);
        let input = Tensor::from_slice(&[-2.5f32, -0.5, 0.0, 1.0, 3.0], (5,), &device)?;
        let output = activation.forward(&input)?.to_dtype(DType::F32)?;

        let reference = {
            let scaled = input.affine(1.0 / SQRT_2, 0.0)?;
            let term = scaled.erf()?;
            let one = Tensor::ones_like(&term)?;
            let inner = (one + term)?;
            input.affine(0.5, 0.0)?.broadcast_mul(&inner)?
        };

        assert!(max_abs_diff(&output, &reference)? < 5e-6);
        Ok(())
    }

    #[test]
    fn silu_matches_swish_reference() -> Result<()> {
        let device = Device::Cpu;
        let activation = builtin(ActivationKind::Silu);
        let input = Tensor::from_slice(&[-3.0f32, -1.0, 0.0, 0.5, 2.0], (5,), &device)?;
        let output = activation.forward(&input)?;

        let sigmoid = builtin(ActivationKind::Sigmoid).forward(&input)?;
        let reference = input.mul(&sigmoid)?;
        assert!(max_abs_diff(&output, &reference)? < 5e-6);
        Ok(())
    }

    #[test]
    fn kinds_deserialize_from_snake_case() {
        #[derive(Deserialize)]
        struct Holder {
            activation: ActivationKind,
        }
        let holder: Holder = serde_json::from_str(r#"{"activation":"relu"}"#).unwrap();
        assert_eq!(holder.activation, ActivationKind::Relu);
    }
}
