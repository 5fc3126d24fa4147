//! `dtnctl render`: print the config document without touching any file.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use dtn_config::Synthesizer;

use super::load_preferences;
use crate::HostArgs;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Print the document as a JSON array of `{key, value}` entries.
    #[arg(long)]
    pub json: bool,
}

impl RenderArgs {
    pub fn run(self, host: &HostArgs) -> Result<()> {
        let prefs = load_preferences(host)?;
        let synthesis = Synthesizer::new(host.planned_layout()?, host.device_id()?)
            .dry_run(true)
            .synthesize(&prefs, Local::now().naive_local())
            .context("config synthesis failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(synthesis.document.entries())
                    .context("failed to serialize config document")?
            );
        } else {
            print!("{}", synthesis.document);
        }
        Ok(())
    }
}
