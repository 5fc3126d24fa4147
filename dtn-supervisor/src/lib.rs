//! DTN daemon supervisor: config synthesis, daemon run, lifecycle events.

pub mod boundary;
mod error;
pub mod lifecycle;
pub mod priority;
mod supervisor;

pub use boundary::{DaemonBoundary, ProcessDaemon};
pub use error::SupervisorError;
pub use lifecycle::{
    BroadcastObserver, JsonLinesObserver, LifecycleEvent, LifecycleObserver, ObserverSet,
};
pub use supervisor::{configure, RunReport, Supervisor, SupervisorState, SUPERVISOR_THREAD_NAME};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. With `json` set, events
/// are emitted as JSON lines. A subscriber installed earlier is left alone.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
