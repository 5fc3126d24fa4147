//! Lifecycle notifications published by the supervisor.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use dtn_core::DaemonState;

/// A daemon state change, stamped with the moment it was announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub state: DaemonState,
    pub at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn now(state: DaemonState) -> Self {
        Self {
            state,
            at: Utc::now(),
        }
    }
}

/// Receives lifecycle events. Delivery is fire-and-forget.
pub trait LifecycleObserver: Send {
    fn notify(&self, event: &LifecycleEvent);
}

impl<F> LifecycleObserver for F
where
    F: Fn(&LifecycleEvent) + Send,
{
    fn notify(&self, event: &LifecycleEvent) {
        self(event)
    }
}

/// Publishes events on a broadcast channel for any number of subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl BroadcastObserver {
    /// Create an observer and a first subscriber.
    pub fn channel(capacity: usize) -> (Self, broadcast::Receiver<LifecycleEvent>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

impl LifecycleObserver for BroadcastObserver {
    fn notify(&self, event: &LifecycleEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(state = %event.state, "no lifecycle subscribers");
        }
    }
}

/// Writes each event as one JSON line, e.g. to stdout.
pub struct JsonLinesObserver<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> LifecycleObserver for JsonLinesObserver<W> {
    fn notify(&self, event: &LifecycleEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode lifecycle event");
                return;
            }
        };
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            tracing::warn!(error = %err, "failed to write lifecycle event");
        }
    }
}

/// Fan-out to every registered observer, in registration order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn LifecycleObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: impl LifecycleObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn with(mut self, observer: impl LifecycleObserver + 'static) -> Self {
        self.register(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl LifecycleObserver for ObserverSet {
    fn notify(&self, event: &LifecycleEvent) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }
}
