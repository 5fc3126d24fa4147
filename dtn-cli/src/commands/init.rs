//! `dtnctl init [--force]`

use anyhow::{bail, Context, Result};
use clap::Args;

use dtn_core::{preferences, PreferenceSet};

use crate::HostArgs;

/// Write a preference store holding every default value.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing preference store.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, host: &HostArgs) -> Result<()> {
        let path = host.prefs_path()?;
        if path.exists() && !self.force {
            bail!(
                "preference store '{}' already exists (use --force to overwrite)",
                path.display()
            );
        }

        let set = PreferenceSet::with_defaults();
        preferences::save_at(&path, &set)
            .with_context(|| format!("failed to write preferences to '{}'", path.display()))?;

        println!("✓ Wrote {} default preferences", set.len());
        println!("  Saved to: {}", path.display());
        Ok(())
    }
}
