//! The contract every dispatchable event implements.
//!
//! An event is an application-defined, immutable unit of intent. Resolving
//! it is a pure, synchronous computation from `(state snapshot, effects
//! context)` to a [`Response`]; all state change and all async work are
//! expressed through that response, never performed inline.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::response::Response;

// ============================================================================
// Core Trait
// ============================================================================

/// A dispatchable unit of intent over state `S` and effects-context `E`.
///
/// # Contract
///
/// `handle` must be pure with respect to state: it receives an owned
/// snapshot, must not mutate shared state, and describes any transition by
/// returning a [`Response`]. The effects-context may be read to
/// parameterize the deferred computation placed in the response, but no
/// async work runs during resolution itself.
///
/// Events are constructed by application code or by a resolving effect,
/// consumed exactly once by the dispatch engine, and not retained.
///
/// # Examples
///
/// ```
/// use statecraft::event::{Event, EventError};
/// use statecraft::response::Response;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Profile {
///     name: String,
/// }
///
/// struct Services;
///
/// struct Rename(String);
///
/// impl Event<Profile, Services> for Rename {
///     fn handle(
///         &self,
///         _state: Profile,
///         _effects: &Services,
///     ) -> Result<Response<Profile, Services>, EventError> {
///         if self.0.is_empty() {
///             return Err(EventError::Rejected("name must not be empty".into()));
///         }
///         Ok(Response::state_update(Profile {
///             name: self.0.clone(),
///         }))
///     }
/// }
///
/// let response = Rename("ada".into()).handle(Profile { name: "old".into() }, &Services);
/// assert!(response.is_ok());
/// ```
pub trait Event<S, E>: Send + Sync {
    /// Resolve this event against a state snapshot.
    fn handle(&self, state: S, effects: &E) -> Result<Response<S, E>, EventError>;

    /// Short label for tracing and tap records. Defaults to the type name.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Boxed event, as carried by [`crate::signal::Signal`] and produced by
/// resolving effects.
pub type DynEvent<S, E> = Box<dyn Event<S, E>>;

/// Formats as the event's label, matching the convention used by
/// [`crate::signal::Signal`]'s debug output.
impl<S, E> fmt::Debug for dyn Event<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Event").field(&self.label()).finish()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised synchronously while resolving an event.
///
/// A resolution error propagates to the caller of
/// [`crate::store::Store::publish`] and aborts that dispatch cycle: no
/// state update is published and no effect is invoked.
#[derive(Debug, Error, Diagnostic)]
pub enum EventError {
    /// The handler refused the event.
    #[error("event rejected: {0}")]
    #[diagnostic(
        code(statecraft::event::rejected),
        help("Check the event payload against the handler's requirements.")
    )]
    Rejected(String),

    /// Expected input data is missing from the state snapshot.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(statecraft::event::missing_input),
        help("Check that an earlier event produced the required data.")
    )]
    MissingInput { what: &'static str },

    /// External provider or service error.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(statecraft::event::provider))]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(statecraft::event::serde_json))]
    Serde(#[from] serde_json::Error),
}
