#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use statecraft::signal::{Signal, SignalKind};
use statecraft::store::Store;
use statecraft::taps::{Tap, TapError};

/// Counter state shared by the integration tests: a running value plus an
/// append-only log used to assert dispatch ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counter {
    pub value: i64,
    pub log: Vec<String>,
}

impl Counter {
    pub fn at(value: i64) -> Self {
        Self {
            value,
            log: Vec::new(),
        }
    }
}

/// Effects-context for the test events.
#[derive(Debug, Clone)]
pub struct Services {
    pub step: i64,
    pub delay: Duration,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            step: 1,
            delay: Duration::from_millis(10),
        }
    }
}

pub type CounterStore = Store<Counter, Services>;

pub fn counter_store() -> CounterStore {
    Store::new(Counter::default(), Services::default())
}

pub fn counter_store_with(services: Services) -> CounterStore {
    Store::new(Counter::default(), services)
}

pub fn probed_store() -> (CounterStore, StateProbe) {
    let probe = StateProbe::new();
    let store = Store::builder()
        .with_tap(probe.clone())
        .build(Counter::default(), Services::default());
    (store, probe)
}

/// Tap recording the `(kind, counter value)` visible at each observation.
#[derive(Clone, Default)]
pub struct StateProbe {
    seen: Arc<Mutex<Vec<(SignalKind, i64)>>>,
}

impl StateProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<(SignalKind, i64)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Tap<Counter, Services> for StateProbe {
    fn observe(&self, signal: &Signal<Counter, Services>, state: &Counter) -> Result<(), TapError> {
        self.seen.lock().unwrap().push((signal.kind(), state.value));
        Ok(())
    }
}

/// Tap that always fails. Dispatch logs the failure and carries on.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrokenTap;

impl<S, E> Tap<S, E> for BrokenTap {
    fn observe(&self, _signal: &Signal<S, E>, _state: &S) -> Result<(), TapError> {
        Err(TapError::Disconnected)
    }
}
