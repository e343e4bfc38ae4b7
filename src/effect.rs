//! Deferred side-effect computations.
//!
//! An [`Effect`] is the asynchronous half of a [`crate::response::Response`]:
//! a zero-argument computation that resolves, at some later time, to an
//! ordered sequence of follow-up events. The dispatch engine invokes it
//! after the synchronous part of a cycle completes and feeds every produced
//! event back through [`crate::store::Store::publish`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::event::DynEvent;

// ============================================================================
// Deferred contract
// ============================================================================

/// A deferred computation resolving to an ordered batch of follow-up events.
///
/// Implementations are invoked without arguments; anything the computation
/// needs is captured at construction time, typically from the
/// effects-context inside an event handler. The result is all-or-nothing:
/// either the full sequence or an [`EffectError`], never a partial batch.
#[async_trait]
pub trait Deferred<S, E>: Send + Sync {
    /// Resolve the computation, yielding follow-up events in dispatch order.
    async fn run(&self) -> Result<Vec<DynEvent<S, E>>, EffectError>;
}

/// Adapter turning an async closure into a [`Deferred`] implementation.
struct FnDeferred<F> {
    f: F,
}

#[async_trait]
impl<S, E, F, Fut> Deferred<S, E> for FnDeferred<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<DynEvent<S, E>>, EffectError>> + Send,
{
    async fn run(&self) -> Result<Vec<DynEvent<S, E>>, EffectError> {
        (self.f)().await
    }
}

// ============================================================================
// Effect handle
// ============================================================================

/// Handle to a deferred side-effect, or the no-op.
///
/// Every [`crate::response::Response`] carries exactly one `Effect`. The
/// default is the no-op, which resolves immediately to an empty event
/// sequence, so an effect is always callable. Cloning is cheap and
/// preserves identity: a clone compares equal to its original, while two
/// independently built effects are unequal even when behaviorally
/// identical.
///
/// # Examples
///
/// ```
/// use statecraft::effect::Effect;
///
/// let quiet: Effect<i64, ()> = Effect::none();
/// assert!(quiet.is_noop());
///
/// let ping: Effect<i64, ()> = Effect::deferred(|| async { Ok(Vec::new()) });
/// assert!(!ping.is_noop());
/// assert_eq!(ping, ping.clone());
/// assert_ne!(ping, Effect::deferred(|| async { Ok(Vec::new()) }));
/// ```
pub struct Effect<S, E> {
    kind: EffectKind<S, E>,
}

enum EffectKind<S, E> {
    Noop,
    Deferred(Arc<dyn Deferred<S, E>>),
}

impl<S, E> Effect<S, E> {
    /// The no-op effect: resolves to an empty event sequence.
    pub fn none() -> Self {
        Self {
            kind: EffectKind::Noop,
        }
    }

    /// Wrap a [`Deferred`] implementation.
    pub fn new(deferred: impl Deferred<S, E> + 'static) -> Self {
        Self {
            kind: EffectKind::Deferred(Arc::new(deferred)),
        }
    }

    /// Build an effect from an async closure.
    ///
    /// The closure runs when the dispatch engine resolves the effect.
    /// Captures must be cloned into the returned future rather than
    /// borrowed, since resolution happens after the originating handler
    /// has returned:
    ///
    /// ```
    /// use statecraft::effect::Effect;
    ///
    /// let greeting = "hello".to_string();
    /// let effect: Effect<i64, ()> = Effect::deferred(move || {
    ///     let greeting = greeting.clone();
    ///     async move {
    ///         tracing::debug!(%greeting, "resolving");
    ///         Ok(Vec::new())
    ///     }
    /// });
    /// assert!(!effect.is_noop());
    /// ```
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<DynEvent<S, E>>, EffectError>> + Send,
    {
        Self::new(FnDeferred { f })
    }

    /// True for the no-op effect.
    pub fn is_noop(&self) -> bool {
        matches!(self.kind, EffectKind::Noop)
    }

    /// Invoke the computation and await its event sequence.
    ///
    /// The no-op resolves immediately to an empty batch.
    pub async fn call(&self) -> Result<Vec<DynEvent<S, E>>, EffectError> {
        match &self.kind {
            EffectKind::Noop => Ok(Vec::new()),
            EffectKind::Deferred(deferred) => deferred.run().await,
        }
    }
}

impl<S, E> Default for Effect<S, E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<S, E> Clone for Effect<S, E> {
    fn clone(&self) -> Self {
        Self {
            kind: match &self.kind {
                EffectKind::Noop => EffectKind::Noop,
                EffectKind::Deferred(deferred) => EffectKind::Deferred(Arc::clone(deferred)),
            },
        }
    }
}

/// Effects compare by identity: no-ops are all equal, deferred effects are
/// equal only when they share one allocation.
impl<S, E> PartialEq for Effect<S, E> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (EffectKind::Noop, EffectKind::Noop) => true,
            (EffectKind::Deferred(a), EffectKind::Deferred(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<S, E> fmt::Debug for Effect<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EffectKind::Noop => f.write_str("Effect::none"),
            EffectKind::Deferred(deferred) => {
                write!(f, "Effect::deferred({:p})", Arc::as_ptr(deferred))
            }
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while resolving a deferred computation.
///
/// These surface through the async result of the dispatch cycle's effect
/// task; the engine neither retries nor suppresses them.
#[derive(Debug, Error, Diagnostic)]
pub enum EffectError {
    /// The computation failed outright.
    #[error("effect failed: {0}")]
    #[diagnostic(code(statecraft::effect::failed))]
    Failed(String),

    /// External provider or service error.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(statecraft::effect::provider))]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// I/O error while producing the event sequence.
    #[error(transparent)]
    #[diagnostic(code(statecraft::effect::io))]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(statecraft::effect::serde_json))]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventError};
    use crate::response::Response;

    struct Nudge;

    impl Event<i64, ()> for Nudge {
        fn handle(&self, state: i64, _effects: &()) -> Result<Response<i64, ()>, EventError> {
            Ok(Response::state_update(state + 1))
        }
    }

    #[tokio::test]
    async fn noop_resolves_to_empty_sequence() {
        let effect: Effect<i64, ()> = Effect::none();
        let events = effect.call().await.expect("noop cannot fail");
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn deferred_resolves_closure_output() {
        let effect: Effect<i64, ()> =
            Effect::deferred(|| async { Ok(vec![Box::new(Nudge) as DynEvent<i64, ()>]) });
        let events = effect.call().await.expect("closure succeeds");
        assert_eq!(events.len(), 1);
        assert!(events[0].label().contains("Nudge"));
    }

    #[tokio::test]
    async fn deferred_failure_propagates() {
        let effect: Effect<i64, ()> =
            Effect::deferred(|| async { Err(EffectError::Failed("boom".into())) });
        let err = effect.call().await.expect_err("closure fails");
        assert!(matches!(err, EffectError::Failed(msg) if msg == "boom"));
    }

    #[test]
    fn equality_is_identity() {
        let none_a: Effect<i64, ()> = Effect::none();
        let none_b: Effect<i64, ()> = Effect::none();
        assert_eq!(none_a, none_b);

        let deferred: Effect<i64, ()> = Effect::deferred(|| async { Ok(Vec::new()) });
        assert_eq!(deferred, deferred.clone());

        let other: Effect<i64, ()> = Effect::deferred(|| async { Ok(Vec::new()) });
        assert_ne!(deferred, other);
        assert_ne!(deferred, none_a);
    }
}
