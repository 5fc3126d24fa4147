//! `dtnctl start`: write the config and run the daemon under supervision.
//!
//! Lifecycle events are printed to stdout as JSON lines; logs go to stderr.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use dtn_config::Synthesizer;
use dtn_supervisor::{JsonLinesObserver, ProcessDaemon, Supervisor};

use super::load_preferences;
use crate::HostArgs;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Daemon executable.
    #[arg(long, default_value = "dtnd", value_name = "PATH")]
    pub daemon_bin: PathBuf,

    /// Keep the supervisor thread at normal priority.
    #[arg(long)]
    pub foreground_priority: bool,

    /// Extra arguments passed through to the daemon.
    #[arg(last = true)]
    pub daemon_args: Vec<String>,
}

impl StartArgs {
    pub fn run(self, host: &HostArgs) -> Result<()> {
        let prefs = load_preferences(host)?;
        let synthesizer = Synthesizer::new(host.layout()?, host.device_id()?);
        let daemon = ProcessDaemon::new(&self.daemon_bin).with_args(self.daemon_args);

        let report = Supervisor::new(
            synthesizer,
            prefs,
            daemon,
            JsonLinesObserver::new(std::io::stdout()),
        )
        .background_priority(!self.foreground_priority)
        .spawn()
        .context("failed to start supervisor thread")?
        .join()
        .map_err(|_| anyhow!("supervisor thread panicked"))?;

        if !report.config_written {
            eprintln!(
                "warning: daemon ran without a fresh config at '{}'",
                report.config_path.display()
            );
        }
        Ok(())
    }
}
