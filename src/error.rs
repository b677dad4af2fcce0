//! Error types for settings loading and resolution

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the settings layer.
///
/// Problems inside user settings are not errors: they are reported as
/// [`Diagnostic`](crate::settings::Diagnostic)s and repaired in place.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "settings are not initialized; load the settings store before translating keys or resolving sites"
    )]
    Uninitialized,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("stored settings must be a mapping at the top level")]
    NotAMapping,

    #[error("settings do not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
