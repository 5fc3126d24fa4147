//! Dry-run unified diff support for `dtnctl diff`.

use std::io::ErrorKind;
use std::path::Path;

use similar::TextDiff;

use crate::document::ConfigDocument;
use crate::error::{io_err, ConfigError};

/// Key whose value changes on every synthesis; excluded from diffs.
const VOLATILE_KEY: &str = "logfile";

/// Compare the config on disk at `path` with `document`.
///
/// Returns `None` when they match, otherwise a unified diff. A missing file
/// diffs as empty. No files are written.
pub fn diff_config(path: &Path, document: &ConfigDocument) -> Result<Option<String>, ConfigError> {
    let existing = stable_lines(&read_existing_or_empty(path)?);
    let rendered = stable_lines(&document.render());
    if existing == rendered {
        return Ok(None);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let unified = TextDiff::from_lines(&existing, &rendered)
        .unified_diff()
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .context_radius(3)
        .to_string();
    Ok(Some(unified))
}

fn read_existing_or_empty(path: &Path) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.replace("\r\n", "\n")),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn stable_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| {
            line.split_once('=')
                .map(|(key, _)| key.trim() != VOLATILE_KEY)
                .unwrap_or(true)
        })
        .map(|line| format!("{line}\n"))
        .collect()
}
