use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the configuring step and the daemon process boundary.
///
/// None of these escape [`crate::Supervisor::run`]; they are logged there.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] dtn_config::ConfigError),

    #[error("daemon process error: {0}")]
    Process(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SupervisorError {
    SupervisorError::Io {
        path: path.into(),
        source,
    }
}
