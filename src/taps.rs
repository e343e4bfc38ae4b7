//! Signal taps: downstream observers of the dispatch pipeline.
//!
//! Every signal a store forwards passes each registered tap, in
//! registration order, together with the state visible at that point of the
//! cycle. Taps observe; they never redirect the pipeline, and a failing tap
//! is logged and skipped rather than aborting dispatch.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::{Signal, SignalKind};
use crate::telemetry::{PlainFormatter, TelemetryFormatter};

/// Abstraction over an observer of forwarded signals.
///
/// `observe` runs inside the synchronous span of a dispatch cycle while the
/// store's state lock is held, so implementations must be quick and manage
/// any mutability internally. For an event signal the state reference
/// already reflects that event's own update; for a carrier it shows the
/// state the carrier is about to replace.
pub trait Tap<S, E>: Send + Sync {
    fn observe(&self, signal: &Signal<S, E>, state: &S) -> Result<(), TapError>;
}

/// Metadata snapshot of one forwarded signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub kind: SignalKind,
    pub label: Option<String>,
    pub at: DateTime<Utc>,
}

impl SignalRecord {
    /// Capture kind and label of a signal, stamped with the current time.
    pub fn capture<S, E>(signal: &Signal<S, E>) -> Self {
        Self {
            kind: signal.kind(),
            label: signal.label().map(str::to_owned),
            at: Utc::now(),
        }
    }
}

/// Tap that logs each forwarded signal through `tracing` at DEBUG.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTap;

impl TracingTap {
    pub fn new() -> Self {
        Self
    }
}

impl<S, E> Tap<S, E> for TracingTap {
    fn observe(&self, signal: &Signal<S, E>, _state: &S) -> Result<(), TapError> {
        tracing::debug!(
            kind = %signal.kind(),
            label = signal.label().unwrap_or("-"),
            "signal forwarded"
        );
        Ok(())
    }
}

/// In-memory tap for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemoryTap {
    records: Arc<Mutex<Vec<SignalRecord>>>,
}

impl MemoryTap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured records.
    pub fn snapshot(&self) -> Vec<SignalRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Clear all captured records.
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }

    /// Count captured records per signal kind.
    pub fn counts(&self) -> FxHashMap<SignalKind, usize> {
        let mut counts = FxHashMap::default();
        for record in self.records.lock().unwrap().iter() {
            *counts.entry(record.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl<S, E> Tap<S, E> for MemoryTap {
    fn observe(&self, signal: &Signal<S, E>, _state: &S) -> Result<(), TapError> {
        self.records.lock().unwrap().push(SignalRecord::capture(signal));
        Ok(())
    }
}

/// Channel-based tap streaming records to an external consumer.
///
/// Records are forwarded over a flume channel without blocking.
///
/// # Example
/// ```
/// use statecraft::store::Store;
/// use statecraft::taps::ChannelTap;
/// use serde_json::json;
///
/// let (tx, rx) = flume::unbounded();
/// let store: Store<i64, ()> = Store::builder().with_tap(ChannelTap::new(tx)).build(0, ());
///
/// store.notice("boot", json!({"ok": true})).unwrap();
/// let record = rx.try_recv().expect("record was forwarded");
/// assert_eq!(record.label.as_deref(), Some("boot"));
/// ```
pub struct ChannelTap {
    tx: flume::Sender<SignalRecord>,
}

impl ChannelTap {
    pub fn new(tx: flume::Sender<SignalRecord>) -> Self {
        Self { tx }
    }
}

impl<S, E> Tap<S, E> for ChannelTap {
    fn observe(&self, signal: &Signal<S, E>, _state: &S) -> Result<(), TapError> {
        self.tx
            .send(SignalRecord::capture(signal))
            .map_err(|_| TapError::Disconnected)
    }
}

/// Stdout tap with pluggable formatting.
pub struct StdoutTap<F: TelemetryFormatter = PlainFormatter> {
    handle: Stdout,
    formatter: F,
}

impl Default for StdoutTap {
    fn default() -> Self {
        Self {
            handle: io::stdout(),
            formatter: PlainFormatter::new(),
        }
    }
}

impl StdoutTap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: TelemetryFormatter> StdoutTap<F> {
    pub fn with_formatter(formatter: F) -> Self {
        Self {
            handle: io::stdout(),
            formatter,
        }
    }
}

impl<S, E, F: TelemetryFormatter> Tap<S, E> for StdoutTap<F> {
    fn observe(&self, signal: &Signal<S, E>, _state: &S) -> Result<(), TapError> {
        let line = self.formatter.render(&SignalRecord::capture(signal));
        let mut out = self.handle.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

/// Errors surfaced by tap observation.
///
/// The dispatch engine logs these at WARN and continues the cycle.
#[derive(Debug, Error)]
pub enum TapError {
    #[error("tap channel disconnected")]
    Disconnected,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
