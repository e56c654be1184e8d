//! Settings error type.

use bridge_core::BridgeError;
use thiserror::Error;

/// Failure while loading or validating configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Config file exists but could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON or violates the schema.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but fails a semantic constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

impl From<SettingsError> for BridgeError {
    fn from(err: SettingsError) -> Self {
        BridgeError::config(err.to_string())
    }
}
