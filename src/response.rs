//! Resolution results produced by event handlers.
//!
//! A [`Response`] is the immutable outcome of resolving one event: an
//! optional next-state value plus a deferred side-effect. Handlers build
//! one with the constructors here; the dispatch engine owns it for the
//! duration of a single cycle and then discards it.

use std::fmt;

use crate::effect::Effect;

/// The result of resolving one event against a state snapshot.
///
/// A `Response` pairs an optional replacement state with a deferred
/// side-effect. Both halves default to "nothing": an absent state and the
/// no-op effect. A default `Response` is a complete no-op and dispatching
/// it changes nothing.
///
/// `S` is the application state type, `E` the effects-context type shared
/// with [`crate::event::Event::handle`].
///
/// # Examples
///
/// ```
/// use statecraft::response::Response;
///
/// // Pure state transition
/// let r: Response<i64, ()> = Response::state_update(5);
/// assert_eq!(r.next_state(), Some(&5));
/// assert!(r.effect().is_noop());
///
/// // Complete no-op
/// let quiet: Response<i64, ()> = Response::none();
/// assert!(quiet.is_noop());
/// ```
///
/// A state change and a side-effect can be combined:
///
/// ```
/// use statecraft::effect::Effect;
/// use statecraft::response::Response;
///
/// let effect = Effect::deferred(|| async { Ok(Vec::new()) });
/// let r: Response<i64, ()> = Response::state_update(1).with_effect(effect);
/// assert_eq!(r.next_state(), Some(&1));
/// assert!(!r.effect().is_noop());
/// ```
pub struct Response<S, E> {
    next_state: Option<S>,
    effect: Effect<S, E>,
}

impl<S, E> Response<S, E> {
    /// A response that changes nothing: absent state, no-op effect.
    pub fn none() -> Self {
        Self {
            next_state: None,
            effect: Effect::none(),
        }
    }

    /// A pure state transition carrying `state` and the no-op effect.
    pub fn state_update(state: S) -> Self {
        Self {
            next_state: Some(state),
            effect: Effect::none(),
        }
    }

    /// A pure side-effect: state untouched, `effect` scheduled.
    pub fn side_effect(effect: Effect<S, E>) -> Self {
        Self {
            next_state: None,
            effect,
        }
    }

    /// General constructor setting both halves independently.
    pub fn new(next_state: Option<S>, effect: Effect<S, E>) -> Self {
        Self { next_state, effect }
    }

    /// Replace this response's effect, keeping the state half.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect<S, E>) -> Self {
        self.effect = effect;
        self
    }

    /// The next-state value, if this response carries one.
    pub fn next_state(&self) -> Option<&S> {
        self.next_state.as_ref()
    }

    /// The deferred side-effect. Always callable; defaults to the no-op.
    pub fn effect(&self) -> &Effect<S, E> {
        &self.effect
    }

    /// True when dispatching this response would change nothing.
    pub fn is_noop(&self) -> bool {
        self.next_state.is_none() && self.effect.is_noop()
    }

    /// Transform the next-state value in place, preserving the effect.
    ///
    /// The mapping applies only when a next state is present; an absent
    /// state stays absent. The effect half is carried over untouched, so
    /// identity comparisons against the original effect still hold. Used
    /// when folding a sub-state handler's response into a parent response.
    ///
    /// ```
    /// use statecraft::response::Response;
    ///
    /// let r: Response<i64, ()> = Response::state_update(2);
    /// assert_eq!(r.map(|n| n * 10).next_state(), Some(&20));
    ///
    /// let quiet: Response<i64, ()> = Response::none();
    /// assert_eq!(quiet.map(|n| n * 10).next_state(), None);
    /// ```
    #[must_use]
    pub fn map(self, f: impl FnOnce(S) -> S) -> Self {
        Self {
            next_state: self.next_state.map(f),
            effect: self.effect,
        }
    }

    /// Split into `(next_state, effect)` for one dispatch cycle.
    pub(crate) fn into_parts(self) -> (Option<S>, Effect<S, E>) {
        (self.next_state, self.effect)
    }
}

impl<S, E> Default for Response<S, E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<S: Clone, E> Clone for Response<S, E> {
    fn clone(&self) -> Self {
        Self {
            next_state: self.next_state.clone(),
            effect: self.effect.clone(),
        }
    }
}

/// Responses compare by state equality and effect identity: two deferred
/// effects are equal only when they are the same value, never by behavior.
impl<S: PartialEq, E> PartialEq for Response<S, E> {
    fn eq(&self, other: &Self) -> bool {
        self.next_state == other.next_state && self.effect == other.effect
    }
}

impl<S: fmt::Debug, E> fmt::Debug for Response<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("next_state", &self.next_state)
            .field("effect", &self.effect)
            .finish()
    }
}
