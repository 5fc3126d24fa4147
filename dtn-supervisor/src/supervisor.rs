//! Daemon supervisor: configure → initialize → run → notify.
//!
//! ```text
//! IDLE → CONFIGURING → INITIALIZING → RUNNING → STOPPED
//! ```
//!
//! A supervisor drives exactly one daemon run; [`Supervisor::run`] consumes
//! it. Failures while configuring are logged and the daemon is initialized
//! anyway with whatever config exists on disk.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::thread::JoinHandle;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use dtn_config::{writer::remove_stale, write_document, Synthesis, Synthesizer};
use dtn_core::{DaemonState, Preferences};

use crate::boundary::DaemonBoundary;
use crate::error::SupervisorError;
use crate::lifecycle::{LifecycleEvent, LifecycleObserver};
use crate::priority::lower_thread_priority;

pub const SUPERVISOR_THREAD_NAME: &str = "dtn-supervisor";

/// Supervisor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupervisorState {
    Idle,
    Configuring,
    Initializing,
    Running,
    Stopped,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupervisorState::Idle => "IDLE",
            SupervisorState::Configuring => "CONFIGURING",
            SupervisorState::Initializing => "INITIALIZING",
            SupervisorState::Running => "RUNNING",
            SupervisorState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// What happened during one supervised run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub config_path: PathBuf,
    /// `false` when configuring failed and the daemon started degraded.
    pub config_written: bool,
    /// Every state entered, starting with `Idle`.
    pub transitions: Vec<SupervisorState>,
}

impl RunReport {
    pub fn final_state(&self) -> SupervisorState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(SupervisorState::Idle)
    }
}

/// Delete the old config, synthesize a new one and write it.
///
/// This is the CONFIGURING step on its own, without any daemon involvement.
pub fn configure(
    synthesizer: &Synthesizer,
    prefs: &Preferences,
    now: NaiveDateTime,
) -> Result<Synthesis, SupervisorError> {
    let path = synthesizer.layout().config_path();
    remove_stale(&path)?;
    let synthesis = synthesizer.synthesize(prefs, now)?;
    write_document(&path, &synthesis.document)?;
    Ok(synthesis)
}

/// Owns one daemon run from config generation to the OFFLINE notification.
pub struct Supervisor<D, O> {
    synthesizer: Synthesizer,
    prefs: Preferences,
    daemon: D,
    observer: O,
    background: bool,
    transitions: Vec<SupervisorState>,
}

impl<D, O> Supervisor<D, O>
where
    D: DaemonBoundary,
    O: LifecycleObserver,
{
    pub fn new(synthesizer: Synthesizer, prefs: Preferences, daemon: D, observer: O) -> Self {
        Self {
            synthesizer,
            prefs,
            daemon,
            observer,
            background: true,
            transitions: vec![SupervisorState::Idle],
        }
    }

    /// Whether to drop the worker to background priority (default `true`).
    pub fn background_priority(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(SupervisorState::Idle)
    }

    /// Drive the full lifecycle on the calling thread.
    ///
    /// Blocks inside the daemon's run call; returns once OFFLINE has been
    /// announced.
    pub fn run(mut self) -> RunReport {
        self.enter(SupervisorState::Configuring);
        if self.background {
            lower_thread_priority();
        }
        let config_path = self.synthesizer.layout().config_path();
        let config_written = match configure(&self.synthesizer, &self.prefs, Local::now().naive_local()) {
            Ok(synthesis) => {
                if synthesis.purged_blobs > 0 {
                    tracing::info!(purged = synthesis.purged_blobs, "purged blob storage");
                }
                true
            }
            Err(err) => {
                tracing::error!(
                    path = %config_path.display(),
                    error = %err,
                    "problem writing config, starting daemon without it"
                );
                false
            }
        };

        self.enter(SupervisorState::Initializing);
        self.daemon.initialize(
            &config_path,
            self.prefs.log_level,
            self.prefs.debug_verbosity,
        );

        // No readiness signal exists; the daemon counts as online once
        // initialize has returned.
        self.enter(SupervisorState::Running);
        self.announce(DaemonState::Online);
        self.daemon.run_blocking();

        self.enter(SupervisorState::Stopped);
        self.announce(DaemonState::Offline);

        RunReport {
            config_path,
            config_written,
            transitions: self.transitions,
        }
    }

    fn enter(&mut self, next: SupervisorState) {
        tracing::info!(from = %self.state(), to = %next, "supervisor transition");
        self.transitions.push(next);
    }

    fn announce(&self, state: DaemonState) {
        tracing::info!(%state, "daemon state");
        self.observer.notify(&LifecycleEvent::now(state));
    }
}

impl<D, O> Supervisor<D, O>
where
    D: DaemonBoundary + 'static,
    O: LifecycleObserver + 'static,
{
    /// Run the supervisor on its own dedicated thread.
    pub fn spawn(self) -> io::Result<JoinHandle<RunReport>> {
        std::thread::Builder::new()
            .name(SUPERVISOR_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use dtn_core::{DeviceId, HostLayout, StoragePaths};
    use tempfile::TempDir;

    type Log = Arc<Mutex<Vec<String>>>;

    struct RecordingDaemon {
        log: Log,
    }

    impl DaemonBoundary for RecordingDaemon {
        fn initialize(&mut self, config: &Path, log_level: i32, debug_verbosity: i32) {
            let exists = config.exists();
            self.log.lock().unwrap().push(format!(
                "initialize exists={exists} level={log_level} debug={debug_verbosity}"
            ));
        }

        fn run_blocking(&mut self) {
            self.log.lock().unwrap().push("run:start".into());
            self.log.lock().unwrap().push("run:end".into());
        }
    }

    fn recorder(log: &Log) -> impl LifecycleObserver {
        let log = log.clone();
        move |e: &LifecycleEvent| log.lock().unwrap().push(format!("notify {}", e.state))
    }

    fn synthesizer(files: &Path) -> Synthesizer {
        Synthesizer::new(
            HostLayout::new(files, StoragePaths::default()),
            DeviceId::from("device"),
        )
    }

    #[test]
    fn state_display_is_uppercase() {
        assert_eq!(SupervisorState::Initializing.to_string(), "INITIALIZING");
    }

    #[test]
    fn new_supervisor_is_idle() {
        let tmp = TempDir::new().unwrap();
        let log = Log::default();
        let supervisor = Supervisor::new(
            synthesizer(tmp.path()),
            Preferences::default(),
            RecordingDaemon { log: log.clone() },
            recorder(&log),
        );
        assert_eq!(supervisor.state(), SupervisorState::Idle);
    }

    #[test]
    fn run_sequences_config_init_online_run_offline() {
        let tmp = TempDir::new().unwrap();
        let log = Log::default();
        let prefs = Preferences {
            log_level: 2,
            debug_verbosity: 7,
            ..Preferences::default()
        };

        let report = Supervisor::new(
            synthesizer(tmp.path()),
            prefs,
            RecordingDaemon { log: log.clone() },
            recorder(&log),
        )
        .background_priority(false)
        .run();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "initialize exists=true level=2 debug=7",
                "notify ONLINE",
                "run:start",
                "run:end",
                "notify OFFLINE",
            ]
        );
        assert!(report.config_written);
        assert_eq!(report.config_path, tmp.path().join("config"));
        assert_eq!(
            report.transitions,
            vec![
                SupervisorState::Idle,
                SupervisorState::Configuring,
                SupervisorState::Initializing,
                SupervisorState::Running,
                SupervisorState::Stopped,
            ]
        );
        assert_eq!(report.final_state(), SupervisorState::Stopped);
    }

    #[test]
    fn configure_failure_still_initializes_daemon() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the files directory should be.
        let files = tmp.path().join("files");
        std::fs::write(&files, "not a directory").unwrap();
        let log = Log::default();

        let report = Supervisor::new(
            synthesizer(&files),
            Preferences::default(),
            RecordingDaemon { log: log.clone() },
            recorder(&log),
        )
        .background_priority(false)
        .run();

        assert!(!report.config_written);
        assert_eq!(report.final_state(), SupervisorState::Stopped);
        let log = log.lock().unwrap();
        assert_eq!(log[0], "initialize exists=false level=0 debug=0");
        assert_eq!(log.last().map(String::as_str), Some("notify OFFLINE"));
    }

    #[test]
    fn configure_replaces_stale_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config");
        std::fs::write(&path, "stale_key = stale\n").unwrap();

        let synthesis = configure(
            &synthesizer(tmp.path()),
            &Preferences::default(),
            Local::now().naive_local(),
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale_key"));
        assert_eq!(written, synthesis.document.render());
    }
}
