//! dtnctl: DTN daemon configuration and supervision CLI.
//!
//! # Usage
//!
//! ```text
//! dtnctl init [--force]
//! dtnctl prefs
//! dtnctl endpoint
//! dtnctl render
//! dtnctl diff
//! dtnctl start [--daemon-bin <path>] [-- <daemon args>...]
//! ```
//!
//! Every subcommand accepts `--prefs`, `--files-dir`, `--storage-dir` and
//! `--device-id` to override the host defaults.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, render::RenderArgs, start::StartArgs};
use dtn_core::{preferences, DeviceId, HostLayout, StoragePaths};

const MACHINE_ID_PATH: &str = "/etc/machine-id";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dtnctl",
    version,
    about = "Generate DTN daemon configuration and supervise the daemon",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    host: HostArgs,

    /// Emit log events as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a preference store holding every default value.
    Init(InitArgs),

    /// Show every preference with its effective value and source.
    Prefs,

    /// Print the endpoint identifier the daemon will use.
    Endpoint,

    /// Print the config document the next start would write.
    Render(RenderArgs),

    /// Show a unified diff between the config on disk and the next one.
    Diff(DiffArgs),

    /// Write the config and run the daemon under supervision.
    Start(StartArgs),
}

// ---------------------------------------------------------------------------
// Host locations shared by every subcommand
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Preference store file. Defaults to <data dir>/dtn/preferences.yaml.
    #[arg(long, global = true, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Private files directory holding `config` and key material.
    #[arg(long, global = true, value_name = "DIR")]
    pub files_dir: Option<PathBuf>,

    /// Storage root for `blob/`, `bundles/` and `logs/`.
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Platform device identifier. Defaults to the contents of /etc/machine-id.
    #[arg(long, global = true)]
    pub device_id: Option<String>,
}

impl HostArgs {
    pub fn prefs_path(&self) -> Result<PathBuf> {
        match &self.prefs {
            Some(path) => Ok(path.clone()),
            None => preferences::default_store_path()
                .context("could not determine preference store location"),
        }
    }

    fn data_root() -> Result<PathBuf> {
        let data = dirs::data_dir().context("could not determine data directory")?;
        Ok(data.join("dtn"))
    }

    pub fn files_dir(&self) -> Result<PathBuf> {
        match &self.files_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_root()?.join("files")),
        }
    }

    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_root()?.join("storage")),
        }
    }

    /// Layout with storage directories created on demand.
    pub fn layout(&self) -> Result<HostLayout> {
        let files = self.files_dir()?;
        let storage = StoragePaths::resolve_under(&self.storage_dir()?);
        Ok(HostLayout::new(files, storage))
    }

    /// Layout with storage paths computed but not created.
    pub fn planned_layout(&self) -> Result<HostLayout> {
        let files = self.files_dir()?;
        let storage = StoragePaths::under(&self.storage_dir()?);
        Ok(HostLayout::new(files, storage))
    }

    pub fn device_id(&self) -> Result<DeviceId> {
        if let Some(id) = &self.device_id {
            return Ok(DeviceId::from(id.as_str()));
        }
        let raw = std::fs::read_to_string(MACHINE_ID_PATH).with_context(|| {
            format!("no --device-id given and {MACHINE_ID_PATH} is unreadable")
        })?;
        Ok(DeviceId::from(raw.trim()))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    dtn_supervisor::init_tracing(cli.log_json);
    match cli.command {
        Commands::Init(args) => args.run(&cli.host),
        Commands::Prefs => commands::prefs::run(&cli.host),
        Commands::Endpoint => commands::endpoint::run(&cli.host),
        Commands::Render(args) => args.run(&cli.host),
        Commands::Diff(args) => args.run(&cli.host),
        Commands::Start(args) => args.run(&cli.host),
    }
}
