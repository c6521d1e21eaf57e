use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("you must supply rnn_size for this type of encoder projection")]
    MissingSize,

    #[error("there must be at least one encoder for this type of encoder projection")]
    NoEncoders,

    #[error("declared rnn_size {declared} does not match the concatenated encoder width {computed}")]
    SizeMismatch { declared: usize, computed: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigFormat(String),

    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
}

impl ProjectionError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl From<toml::de::Error> for ProjectionError {
    fn from(value: toml::de::Error) -> Self {
        ProjectionError::ConfigFormat(value.to_string())
    }
}

impl From<serde_json::Error> for ProjectionError {
    fn from(value: serde_json::Error) -> Self {
        ProjectionError::ConfigFormat(value.to_string())
    }
}

/// Message for a size that must be non-zero, `None` when it is.
pub(crate) fn zero_size_problem(name: &str, value: usize) -> Option<String> {
    (value == 0).then(|| format!("{name} must be greater than zero"))
}

pub(crate) fn require_positive(name: &str, value: usize) -> Result<()> {
    match zero_size_problem(name, value) {
        Some(problem) => Err(ProjectionError::InvalidConfig(problem)),
        None => Ok(()),
    }
}

/// Message for a dropout keep probability outside `(0, 1]`, prefixed by `name`.
pub(crate) fn keep_prob_problem(name: &str, keep_prob: f32) -> Option<String> {
    layers::dropout::validate_keep_prob(keep_prob)
        .err()
        .map(|err| format!("{name}: {err}"))
}
