//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or validating taskd settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid JSON for [`crate::TaskdSettings`].
    #[error("settings file {} is not valid: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A setting or `TASKD_*` variable holds an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Settings key (`database.pool_size`) or variable name (`TASKD_PORT`).
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl SettingsError {
    /// Key that held the bad value, for [`SettingsError::InvalidValue`].
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidValue { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
