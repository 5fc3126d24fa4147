//! Error types for dtn-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or interpreting preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Underlying I/O failure, with the path that was being accessed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse preferences at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The preference store did not exist at the expected path.
    #[error("preferences not found at {path}")]
    NotFound { path: PathBuf },

    /// A known key holds a value of the wrong kind.
    #[error("preference '{key}' must be a {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A numeric preference stored as text could not be parsed.
    #[error("preference '{key}' must be an integer, found '{value}'")]
    InvalidInteger { key: String, value: String },

    /// `dirs::data_dir()` returned `None`.
    #[error("cannot determine data directory; pass an explicit path")]
    DataDirNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PreferenceError {
    PreferenceError::Io {
        path: path.into(),
        source,
    }
}
