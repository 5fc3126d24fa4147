//! The daemon boundary: initialize, then block until the daemon exits.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{io_err, SupervisorError};

/// The opaque DTN daemon as seen by the supervisor.
///
/// Neither call reports failure; implementations log their own errors.
pub trait DaemonBoundary: Send {
    /// Load `config` and prepare the daemon. Must not block on the main loop.
    fn initialize(&mut self, config: &Path, log_level: i32, debug_verbosity: i32);

    /// Run the daemon's main loop, returning only once it has shut down.
    fn run_blocking(&mut self);
}

/// Runs an external `dtnd`-style executable as the daemon.
///
/// `initialize` assembles the command line
/// (`-c <config>`, `-v` per log level, `-d <debug>` when debugging);
/// `run_blocking` spawns the process and waits for it.
#[derive(Debug, Clone)]
pub struct ProcessDaemon {
    program: PathBuf,
    extra_args: Vec<OsString>,
    args: Option<Vec<OsString>>,
}

impl ProcessDaemon {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            args: None,
        }
    }

    /// Arguments appended after the generated ones.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line prepared by `initialize`, if it has run.
    pub fn command_line(&self) -> Option<&[OsString]> {
        self.args.as_deref()
    }

    fn wait(&self, args: &[OsString]) -> Result<(), SupervisorError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .spawn()
            .map_err(|e| io_err(&self.program, e))?;
        tracing::info!(pid = child.id(), program = %self.program.display(), "daemon process started");
        let status = child.wait().map_err(|e| io_err(&self.program, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(SupervisorError::Process(format!(
                "{} exited with {status}",
                self.program.display()
            )))
        }
    }
}

impl DaemonBoundary for ProcessDaemon {
    fn initialize(&mut self, config: &Path, log_level: i32, debug_verbosity: i32) {
        let mut args: Vec<OsString> = vec!["-c".into(), config.as_os_str().to_owned()];
        for _ in 0..log_level.max(0) {
            args.push("-v".into());
        }
        if debug_verbosity > 0 {
            args.push("-d".into());
            args.push(debug_verbosity.to_string().into());
        }
        args.extend(self.extra_args.iter().cloned());
        tracing::debug!(program = %self.program.display(), ?args, "daemon initialized");
        self.args = Some(args);
    }

    fn run_blocking(&mut self) {
        let Some(args) = self.args.clone() else {
            tracing::error!("daemon run requested before initialize");
            return;
        };
        match self.wait(&args) {
            Ok(()) => tracing::info!("daemon exited cleanly"),
            Err(err) => tracing::error!(error = %err, "daemon process failed"),
        }
    }
}
