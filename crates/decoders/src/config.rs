//! Declarative selection of encoder and output projections.
//!
//! Both families are internally tagged by `type`:
//!
//! ```toml
//! [encoder_projection]
//! type = "linear"
//! dropout_keep_prob = 0.8
//!
//! [output_projection]
//! type = "mlp"
//! layer_sizes = [500, 500]
//! activation = "relu"
//! ```

use std::{fs, path::Path};

use layers::{builtin, layer_sizes_problem, ActivationKind, DEFAULT_POOL_SIZE};
use serde::Deserialize;

use crate::{
    encoder_projection::{
        concat_encoder_projection, empty_initial_state, linear_encoder_projection,
        EncoderProjection,
    },
    errors::{keep_prob_problem, zero_size_problem, ProjectionError, Result},
    output_projection::{
        legacy_linear, legacy_relu, maxout_output_with_pool, mlp_output, nonlinear_output,
        OutputProjection,
    },
};

fn default_keep_prob() -> f32 {
    1.0
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncoderProjectionConfig {
    Empty,
    Linear {
        #[serde(default = "default_keep_prob")]
        dropout_keep_prob: f32,
    },
    Concat,
}

impl EncoderProjectionConfig {
    pub fn problems(&self) -> Vec<String> {
        match self {
            EncoderProjectionConfig::Linear { dropout_keep_prob } => {
                keep_prob_problem("encoder_projection.dropout_keep_prob", *dropout_keep_prob)
                    .into_iter()
                    .collect()
            }
            EncoderProjectionConfig::Empty | EncoderProjectionConfig::Concat => Vec::new(),
        }
    }

    pub fn build(&self) -> Result<EncoderProjection> {
        match self {
            EncoderProjectionConfig::Empty => Ok(empty_initial_state()),
            EncoderProjectionConfig::Linear { dropout_keep_prob } => {
                linear_encoder_projection(*dropout_keep_prob)
            }
            EncoderProjectionConfig::Concat => Ok(concat_encoder_projection()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputProjectionConfig {
    LegacyLinear {
        output_size: usize,
    },
    LegacyRelu {
        output_size: usize,
    },
    Nonlinear {
        output_size: usize,
        #[serde(default)]
        activation: ActivationKind,
    },
    Maxout {
        maxout_size: usize,
        #[serde(default = "default_pool_size")]
        pool_size: usize,
    },
    Mlp {
        layer_sizes: Vec<usize>,
        #[serde(default)]
        activation: ActivationKind,
        #[serde(default = "default_keep_prob")]
        dropout_keep_prob: f32,
    },
}

impl OutputProjectionConfig {
    pub fn problems(&self) -> Vec<String> {
        let mut problems: Vec<String> = Vec::new();
        match self {
            OutputProjectionConfig::LegacyLinear { output_size }
            | OutputProjectionConfig::LegacyRelu { output_size }
            | OutputProjectionConfig::Nonlinear { output_size, .. } => {
                problems.extend(zero_size_problem(
                    "output_projection.output_size",
                    *output_size,
                ));
            }
            OutputProjectionConfig::Maxout {
                maxout_size,
                pool_size,
            } => {
                problems.extend(zero_size_problem(
                    "output_projection.maxout_size",
                    *maxout_size,
                ));
                problems.extend(zero_size_problem("output_projection.pool_size", *pool_size));
            }
            OutputProjectionConfig::Mlp {
                layer_sizes,
                dropout_keep_prob,
                ..
            } => {
                problems.extend(
                    layer_sizes_problem(layer_sizes)
                        .map(|problem| format!("output_projection.layer_sizes: {problem}")),
                );
                problems.extend(keep_prob_problem(
                    "output_projection.dropout_keep_prob",
                    *dropout_keep_prob,
                ));
            }
        }
        problems
    }

    pub fn build(&self) -> Result<OutputProjection> {
        match self {
            OutputProjectionConfig::LegacyLinear { output_size } => legacy_linear(*output_size),
            OutputProjectionConfig::LegacyRelu { output_size } => legacy_relu(*output_size),
            OutputProjectionConfig::Nonlinear {
                output_size,
                activation,
            } => nonlinear_output(*output_size, Some(builtin(*activation))),
            OutputProjectionConfig::Maxout {
                maxout_size,
                pool_size,
            } => maxout_output_with_pool(*maxout_size, *pool_size),
            OutputProjectionConfig::Mlp {
                layer_sizes,
                activation,
                dropout_keep_prob,
            } => mlp_output(
                layer_sizes.clone(),
                Some(builtin(*activation)),
                Some(*dropout_keep_prob),
            ),
        }
    }
}

/// Projection selection for one decoder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectionConfig {
    pub encoder_projection: EncoderProjectionConfig,
    pub output_projection: OutputProjectionConfig,
}

impl ProjectionConfig {
    /// Loads a configuration from a `.toml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: ProjectionConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            Some("toml") | None => toml::from_str(&contents)?,
            Some(other) => {
                return Err(ProjectionError::ConfigFormat(format!(
                    "unsupported configuration extension '{}'",
                    other
                )));
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ProjectionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = self.encoder_projection.problems();
        errors.extend(self.output_projection.problems());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProjectionError::Validation(errors))
        }
    }

    pub fn build(&self) -> Result<(EncoderProjection, OutputProjection)> {
        Ok((
            self.encoder_projection.build()?,
            self.output_projection.build()?,
        ))
    }
}
