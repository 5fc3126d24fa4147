pub mod diff;
pub mod endpoint;
pub mod init;
pub mod prefs;
pub mod render;
pub mod start;

use anyhow::{Context, Result};

use dtn_core::{preferences, PreferenceError, PreferenceSet, Preferences};

use crate::HostArgs;

/// Load the typed preferences named by `host`.
///
/// A missing store falls back to the defaults `dtnctl init` would write.
pub(crate) fn load_preferences(host: &HostArgs) -> Result<Preferences> {
    let path = host.prefs_path()?;
    let set = match preferences::load_at(&path) {
        Ok(set) => set,
        Err(PreferenceError::NotFound { .. }) => {
            eprintln!(
                "note: no preference store at '{}', using defaults",
                path.display()
            );
            PreferenceSet::with_defaults()
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to load preferences from '{}'", path.display()))
        }
    };
    Preferences::try_from(&set)
        .with_context(|| format!("invalid preferences in '{}'", path.display()))
}
