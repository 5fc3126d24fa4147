//! BAB shared-secret file.

use std::path::Path;

use crate::error::ConfigError;
use crate::writer::{remove_stale, write_private};

/// (Over)write the BAB key file with `secret`, verbatim and without a
/// trailing newline. An empty secret still produces an (empty) file.
pub fn write_bab_key(path: &Path, secret: &str) -> Result<(), ConfigError> {
    remove_stale(path)?;
    write_private(path, secret)?;
    tracing::debug!(path = %path.display(), empty = secret.is_empty(), "wrote BAB key file");
    Ok(())
}
