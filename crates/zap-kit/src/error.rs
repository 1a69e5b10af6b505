use thiserror::Error;

/// Errors raised while loading or building component configuration.
///
/// Runtime paths never fail: out-of-range values are clamped when applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("curve key {index} has a non-finite time or value")]
    NonFiniteKey { index: usize },
}
