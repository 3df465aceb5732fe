//! Errors raised while loading or validating tuner settings.
//!
//! The signal pipeline itself is total and never fails; only configuration
//! and session setup can be rejected.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TunerError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("tuning `{0}` has no targets")]
    EmptyTargetSet(String),
}

impl TunerError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TunerError>;
