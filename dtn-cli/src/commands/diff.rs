//! `dtnctl diff`: show what the next start would change in the config file.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use dtn_config::{diff_config, Synthesizer};

use super::load_preferences;
use crate::HostArgs;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Exit with status 1 when the config would change.
    #[arg(long)]
    pub exit_code: bool,
}

impl DiffArgs {
    pub fn run(self, host: &HostArgs) -> Result<()> {
        let prefs = load_preferences(host)?;
        let layout = host.planned_layout()?;
        let config_path = layout.config_path();
        let synthesis = Synthesizer::new(layout, host.device_id()?)
            .dry_run(true)
            .synthesize(&prefs, Local::now().naive_local())
            .context("config synthesis failed")?;

        let diff = diff_config(&config_path, &synthesis.document)
            .with_context(|| format!("diff failed for '{}'", config_path.display()))?;

        match diff {
            None => println!("No differences for '{}'.", config_path.display()),
            Some(diff) => {
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
                if self.exit_code {
                    std::process::exit(1);
                }
            }
        }
        Ok(())
    }
}
