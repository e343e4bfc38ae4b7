//! The state reconciler consulted at the end of every dispatch cycle.

use crate::signal::Signal;

/// Apply a forwarded signal to the state cell.
///
/// A state-update carrier replaces the state with its wrapped value; every
/// other signal leaves state untouched. Total, infallible, O(1).
pub fn reconcile<S, E>(state: &mut S, signal: Signal<S, E>) {
    if let Signal::Update(update) = signal {
        *state = update.into_state();
    }
}
