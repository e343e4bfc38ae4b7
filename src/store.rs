//! The shared state container dispatch cycles run against.
//!
//! A [`Store`] owns one state value, the application's effects-context, and
//! the registered signal taps. Handles are cheap to clone and share the
//! same container, which is how effect tasks publish follow-up events back
//! into the pipeline they came from.
//!
//! State mutation has exactly one path: the reconciler consuming a
//! state-update carrier at the end of a dispatch cycle. There is no public
//! `replace`; handler code describes transitions through responses instead
//! of writing state.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use uuid::Uuid;

use crate::taps::Tap;

/// Shared handle to a state container.
///
/// The state cell sits behind a reentrant lock: a whole dispatch cycle is
/// atomic with respect to cycles on other threads, while the engine's own
/// synchronous carrier publish may re-enter on the same call stack. The
/// lock is never held across an `await`.
///
/// # Examples
///
/// ```
/// use statecraft::store::Store;
///
/// let store = Store::new(0_i64, ());
/// assert_eq!(store.read(), 0);
///
/// // Clones observe the same container.
/// let handle = store.clone();
/// assert_eq!(handle.read(), 0);
/// ```
pub struct Store<S, E> {
    pub(crate) inner: Arc<StoreInner<S, E>>,
}

pub(crate) struct StoreInner<S, E> {
    pub(crate) id: String,
    pub(crate) cell: ReentrantMutex<RefCell<S>>,
    pub(crate) effects: E,
    pub(crate) taps: Vec<Box<dyn Tap<S, E>>>,
}

impl<S, E> Store<S, E> {
    /// Container with no taps. Use [`Store::builder`] to register some.
    pub fn new(initial: S, effects: E) -> Self {
        Self::builder().build(initial, effects)
    }

    /// Builder for a container with taps.
    pub fn builder() -> StoreBuilder<S, E> {
        StoreBuilder::new()
    }

    /// The effects-context handed to every event resolution.
    pub fn effects(&self) -> &E {
        &self.inner.effects
    }

    /// Short instance id, as it appears in tracing fields.
    pub fn id(&self) -> &str {
        &self.inner.id
    }
}

impl<S: Clone, E> Store<S, E> {
    /// Synchronous snapshot of the current state.
    pub fn read(&self) -> S {
        self.snapshot_state()
    }

    pub(crate) fn snapshot_state(&self) -> S {
        let guard = self.inner.cell.lock();
        let state = guard.borrow().clone();
        state
    }
}

impl<S, E> Clone for Store<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, E> fmt::Debug for Store<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("taps", &self.inner.taps.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder wiring taps before the container exists.
///
/// ```
/// use statecraft::store::Store;
/// use statecraft::taps::MemoryTap;
///
/// let tap = MemoryTap::new();
/// let store = Store::builder()
///     .with_tap(tap.clone())
///     .build(0_i64, ());
/// assert_eq!(store.read(), 0);
/// assert!(tap.snapshot().is_empty());
/// ```
pub struct StoreBuilder<S, E> {
    taps: Vec<Box<dyn Tap<S, E>>>,
}

impl<S, E> StoreBuilder<S, E> {
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Register a tap. Taps observe in registration order.
    #[must_use]
    pub fn with_tap(mut self, tap: impl Tap<S, E> + 'static) -> Self {
        self.taps.push(Box::new(tap));
        self
    }

    /// Finish the container with its initial state and effects-context.
    pub fn build(self, initial: S, effects: E) -> Store<S, E> {
        Store {
            inner: Arc::new(StoreInner {
                id: short_id(),
                cell: ReentrantMutex::new(RefCell::new(initial)),
                effects,
                taps: self.taps,
            }),
        }
    }
}

impl<S, E> Default for StoreBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn short_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("store-{}", &uuid[..8])
}
