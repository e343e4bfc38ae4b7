//! Published values and the internal state-update carrier.
//!
//! Everything that enters [`crate::store::Store::publish`] is a [`Signal`]:
//! an event to resolve, a state-update carrier produced by the engine
//! itself, or an application notice that flows through the pipeline
//! untouched. The enum is closed so the carrier variant cannot be forged:
//! [`StateUpdate`] has no public constructor, and the only way state
//! reaches the reconciler is through a resolved event.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{DynEvent, Event};

/// A value traveling through the dispatch pipeline.
pub enum Signal<S, E> {
    /// An event awaiting resolution by the dispatch engine.
    Event(DynEvent<S, E>),
    /// Internal carrier moving a resolved next state to the reconciler.
    Update(StateUpdate<S>),
    /// Application payload forwarded unchanged past engine and reconciler.
    Notice(Notice),
}

impl<S, E> Signal<S, E> {
    /// Wrap an event for publication.
    pub fn event(event: impl Event<S, E> + 'static) -> Self {
        Signal::Event(Box::new(event))
    }

    /// Build a notice signal from a scope and JSON payload.
    ///
    /// ```
    /// use statecraft::signal::{Signal, SignalKind};
    /// use serde_json::json;
    ///
    /// let signal: Signal<i64, ()> = Signal::notice("metrics", json!({"lag_ms": 7}));
    /// assert_eq!(signal.kind(), SignalKind::Notice);
    /// assert_eq!(signal.label(), Some("metrics"));
    /// ```
    pub fn notice(scope: impl Into<String>, payload: Value) -> Self {
        Signal::Notice(Notice {
            scope: scope.into(),
            payload,
        })
    }

    /// Which pipeline arm this signal takes.
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Event(_) => SignalKind::Event,
            Signal::Update(_) => SignalKind::Update,
            Signal::Notice(_) => SignalKind::Notice,
        }
    }

    /// Human-readable label: the event's label or the notice scope.
    /// Carriers have none.
    pub fn label(&self) -> Option<&str> {
        match self {
            Signal::Event(event) => Some(event.label()),
            Signal::Update(_) => None,
            Signal::Notice(notice) => Some(notice.scope()),
        }
    }

    /// True for the event arm.
    pub fn is_event(&self) -> bool {
        matches!(self, Signal::Event(_))
    }
}

impl<S: fmt::Debug, E> fmt::Debug for Signal<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Event(event) => f.debug_tuple("Event").field(&event.label()).finish(),
            Signal::Update(update) => f.debug_tuple("Update").field(update).finish(),
            Signal::Notice(notice) => f.debug_tuple("Notice").field(notice).finish(),
        }
    }
}

// ============================================================================
// Carrier & Notice
// ============================================================================

/// Carrier wrapping exactly one resolved next-state value.
///
/// Constructed only by the dispatch engine, dispatched and consumed within
/// one reconciliation step. Observers may read the wrapped state; nothing
/// outside this crate can build one.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate<S> {
    next: S,
}

impl<S> StateUpdate<S> {
    pub(crate) fn new(next: S) -> Self {
        Self { next }
    }

    /// The state value this carrier transports.
    pub fn state(&self) -> &S {
        &self.next
    }

    pub(crate) fn into_state(self) -> S {
        self.next
    }
}

/// Application payload that is neither an event nor a carrier.
///
/// Notices pass through the pipeline unchanged: the engine skips them, taps
/// observe them, the reconciler leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    scope: String,
    payload: Value,
}

impl Notice {
    pub fn new(scope: impl Into<String>, payload: Value) -> Self {
        Self {
            scope: scope.into(),
            payload,
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// Discriminant of a [`Signal`], used in tap records and tracing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Event,
    Update,
    Notice,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Event => "event",
            SignalKind::Update => "update",
            SignalKind::Notice => "notice",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
