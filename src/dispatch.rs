//! The dispatch engine: publish interception, resolution, and effect
//! scheduling.
//!
//! Publishing is synchronous. One call to [`Store::publish`] runs a full
//! dispatch cycle: resolve the signal if it is an event, land any resulting
//! state update, schedule any resulting effect, then forward the original
//! signal past the taps into the reconciler. Effects resolve later on the
//! tokio runtime; every event they produce re-enters `publish` and gets a
//! fresh cycle of its own.

use futures_util::future::join_all;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, instrument, warn};

use crate::effect::{Effect, EffectError};
use crate::event::{Event, EventError};
use crate::reconcile::reconcile;
use crate::signal::{Signal, StateUpdate};
use crate::store::Store;

impl<S, E> Store<S, E>
where
    S: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    /// Run one dispatch cycle for `signal`.
    ///
    /// For an event signal the cycle is:
    ///
    /// 1. Snapshot the current state and resolve the event against it,
    ///    synchronously. A resolution error aborts here: nothing is
    ///    applied, no effect is invoked, and the error is returned to the
    ///    caller.
    /// 2. If the response carries a next state, publish a state-update
    ///    carrier re-entrantly. The carrier takes the non-event path below,
    ///    so the replace lands before the original event moves on, and
    ///    every later observer of this cycle already sees the new state.
    /// 3. If the response carries a deferred effect, hand it to the tokio
    ///    runtime. Its follow-up events re-enter `publish` in sequence
    ///    order whenever it resolves; the returned
    ///    [`DispatchOutcome::effect`] handle tracks that whole cascade.
    /// 4. Forward the original signal: taps observe it, then the
    ///    reconciler consumes it.
    ///
    /// Carriers and notices skip steps 1-3 and are forwarded directly.
    ///
    /// The cycle is atomic with respect to other publishers; re-entrant
    /// publishes from the same call stack are expected. Each cycle reads
    /// its own fresh snapshot, so interleaving with pending effects is
    /// safe.
    ///
    /// # Examples
    ///
    /// Pure state transitions need no async runtime and are visible as
    /// soon as `publish` returns:
    ///
    /// ```
    /// use statecraft::event::{Event, EventError};
    /// use statecraft::response::Response;
    /// use statecraft::signal::Signal;
    /// use statecraft::store::Store;
    ///
    /// struct Add(i64);
    ///
    /// impl Event<i64, ()> for Add {
    ///     fn handle(&self, state: i64, _effects: &()) -> Result<Response<i64, ()>, EventError> {
    ///         Ok(Response::state_update(state + self.0))
    ///     }
    /// }
    ///
    /// # fn main() -> Result<(), statecraft::dispatch::DispatchError> {
    /// let store = Store::new(0_i64, ());
    /// let outcome = store.publish(Signal::event(Add(5)))?;
    /// assert!(outcome.state_updated);
    /// assert_eq!(store.read(), 5);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(store = %self.inner.id, kind = %signal.kind()))]
    pub fn publish(&self, signal: Signal<S, E>) -> Result<DispatchOutcome, DispatchError> {
        let _guard = self.inner.cell.lock();

        let (signal, state_updated, effect) = match signal {
            Signal::Event(event) => {
                let (state_updated, effect) = self.resolve(event.as_ref())?;
                (Signal::Event(event), state_updated, effect)
            }
            other => {
                let state_updated = matches!(other, Signal::Update(_));
                (other, state_updated, None)
            }
        };

        self.forward(signal);

        Ok(DispatchOutcome {
            state_updated,
            effect,
        })
    }

    /// Publish a single event. Sugar for `publish(Signal::event(event))`.
    pub fn dispatch(
        &self,
        event: impl Event<S, E> + 'static,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.publish(Signal::event(event))
    }

    /// Publish a notice. Sugar for `publish(Signal::notice(scope, payload))`.
    pub fn notice(
        &self,
        scope: impl Into<String>,
        payload: Value,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.publish(Signal::notice(scope, payload))
    }

    /// Steps 1-3 of an event cycle: resolve, land the update, schedule the
    /// effect.
    fn resolve(
        &self,
        event: &dyn Event<S, E>,
    ) -> Result<(bool, Option<EffectHandle>), DispatchError> {
        let snapshot = self.snapshot_state();
        let response = event.handle(snapshot, self.effects())?;
        let (next_state, effect) = response.into_parts();

        // Probe for a runtime before anything lands, so an effectful
        // response either applies whole or not at all.
        let runtime = if effect.is_noop() {
            None
        } else {
            Some(Handle::try_current().map_err(|_| DispatchError::NoRuntime)?)
        };

        let state_updated = next_state.is_some();
        if let Some(next) = next_state {
            self.publish(Signal::Update(StateUpdate::new(next)))?;
        }

        let effect = runtime.map(|runtime| self.spawn_effect(&runtime, effect, event.label()));
        Ok((state_updated, effect))
    }

    /// Forward a signal past the taps into the reconciler.
    fn forward(&self, signal: Signal<S, E>) {
        if !self.inner.taps.is_empty() {
            let state = self.snapshot_state();
            for tap in &self.inner.taps {
                if let Err(error) = tap.observe(&signal, &state) {
                    warn!(%error, kind = %signal.kind(), "tap observation failed");
                }
            }
        }

        let guard = self.inner.cell.lock();
        let mut state = guard.borrow_mut();
        reconcile(&mut *state, signal);
    }

    /// Step 3's task body: await the effect, publish its events in order,
    /// then settle every nested cascade. First error wins.
    fn spawn_effect(
        &self,
        runtime: &Handle,
        effect: Effect<S, E>,
        source: &'static str,
    ) -> EffectHandle {
        let store = self.clone();
        let join_handle: JoinHandle<Result<(), DispatchError>> = runtime.spawn(async move {
            let events = effect.call().await?;
            debug!(count = events.len(), source, "effect resolved");

            let mut cascades = Vec::new();
            for event in events {
                let outcome = store.publish(Signal::Event(event))?;
                if let Some(handle) = outcome.effect {
                    cascades.push(handle);
                }
            }

            for settled in join_all(cascades.into_iter().map(EffectHandle::join)).await {
                settled?;
            }
            Ok(())
        });
        EffectHandle { join_handle }
    }
}

// ============================================================================
// Outcome & handle
// ============================================================================

/// What one `publish` call did synchronously, plus the pending effect.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// True when this cycle replaced the state before returning.
    pub state_updated: bool,
    /// Handle to the scheduled effect cascade, when the response had one.
    pub effect: Option<EffectHandle>,
}

impl DispatchOutcome {
    /// True when the cycle neither changed state nor scheduled an effect.
    pub fn is_noop(&self) -> bool {
        !self.state_updated && self.effect.is_none()
    }

    /// Await the full effect cascade of this cycle, if any.
    pub async fn settle(self) -> Result<(), DispatchError> {
        match self.effect {
            Some(handle) => handle.join().await,
            None => Ok(()),
        }
    }
}

/// Handle to one scheduled effect and everything it goes on to dispatch.
///
/// There is deliberately no way to cancel: once an effect is invoked, its
/// resolution cannot be withdrawn.
#[derive(Debug)]
pub struct EffectHandle {
    join_handle: JoinHandle<Result<(), DispatchError>>,
}

impl EffectHandle {
    /// True once the cascade has fully resolved, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    /// Await the cascade. Surfaces effect rejections and any resolution
    /// error raised by an effect-produced event.
    pub async fn join(self) -> Result<(), DispatchError> {
        match self.join_handle.await {
            Ok(result) => result,
            Err(join_error) => Err(DispatchError::Join(join_error)),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfacing from a dispatch cycle.
///
/// Synchronous resolution errors return from `publish` itself; the rest
/// surface through [`EffectHandle::join`] / [`DispatchOutcome::settle`].
#[derive(Debug, Error, Diagnostic)]
pub enum DispatchError {
    /// An event's `handle` returned an error; the cycle was aborted with
    /// nothing applied.
    #[error("event resolution failed: {0}")]
    #[diagnostic(code(statecraft::dispatch::resolution))]
    Resolution(#[from] EventError),

    /// A deferred computation failed to resolve its event sequence.
    #[error("effect resolution failed: {0}")]
    #[diagnostic(code(statecraft::dispatch::effect))]
    Effect(#[from] EffectError),

    /// An effectful response was published outside a tokio runtime.
    #[error("deferred effects need a tokio runtime")]
    #[diagnostic(
        code(statecraft::dispatch::no_runtime),
        help("Publish from within a tokio runtime, or return a pure response.")
    )]
    NoRuntime,

    /// The effect task panicked or was torn down with the runtime.
    #[error("effect task did not complete")]
    #[diagnostic(code(statecraft::dispatch::join))]
    Join(#[from] JoinError),
}
