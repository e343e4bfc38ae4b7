//! Counter demo: pure events, deferred effects, and settling.
//!
//! Dispatches a mix of synchronous and effectful events against one store,
//! showing when each update becomes visible and how a rejected event leaves
//! everything untouched.
//!
//! Run with: `cargo run --example counter`

use std::time::Duration;

use miette::Result;
use statecraft::effect::Effect;
use statecraft::event::{DynEvent, Event, EventError};
use statecraft::response::Response;
use statecraft::store::Store;
use statecraft::telemetry::TelemetryConfig;
use tracing::info;

#[derive(Clone, Debug, Default, PartialEq)]
struct Counter {
    value: i64,
}

#[derive(Debug, Clone)]
struct Services {
    fetch_delay: Duration,
}

struct Increment;

impl Event<Counter, Services> for Increment {
    fn handle(
        &self,
        state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Ok(Response::state_update(Counter {
            value: state.value + 1,
        }))
    }

    fn label(&self) -> &'static str {
        "increment"
    }
}

struct Add(i64);

impl Event<Counter, Services> for Add {
    fn handle(
        &self,
        state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Ok(Response::state_update(Counter {
            value: state.value + self.0,
        }))
    }

    fn label(&self) -> &'static str {
        "add"
    }
}

/// Simulates fetching an amount from somewhere slow, then applies it.
struct AsyncIncrement {
    amount: i64,
}

impl Event<Counter, Services> for AsyncIncrement {
    fn handle(
        &self,
        _state: Counter,
        effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        let amount = self.amount;
        let delay = effects.fetch_delay;
        Ok(Response::side_effect(Effect::deferred(move || async move {
            tokio::time::sleep(delay).await;
            Ok(vec![Box::new(Add(amount)) as DynEvent<Counter, Services>])
        })))
    }

    fn label(&self) -> &'static str {
        "async_increment"
    }
}

struct Withdraw {
    amount: i64,
}

impl Event<Counter, Services> for Withdraw {
    fn handle(
        &self,
        state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        if self.amount > state.value {
            return Err(EventError::Rejected(format!(
                "cannot withdraw {} from {}",
                self.amount, state.value
            )));
        }
        Ok(Response::state_update(Counter {
            value: state.value - self.amount,
        }))
    }

    fn label(&self) -> &'static str {
        "withdraw"
    }
}

async fn run() -> Result<()> {
    info!("building a counter store");
    let store = Store::new(
        Counter::default(),
        Services {
            fetch_delay: Duration::from_millis(250),
        },
    );

    info!("dispatching two pure increments");
    store.dispatch(Increment)?;
    store.dispatch(Increment)?;
    info!(value = store.read().value, "state after pure dispatch");

    info!("dispatching a deferred increment");
    let outcome = store.dispatch(AsyncIncrement { amount: 40 })?;
    info!(
        value = store.read().value,
        "state before the effect resolves"
    );

    outcome.settle().await?;
    info!(value = store.read().value, "state after settling");

    if let Err(error) = store.dispatch(Withdraw { amount: 100 }) {
        info!(%error, "withdraw refused");
    }
    info!(
        value = store.read().value,
        "state after the refused withdraw"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_panic_hook();
    TelemetryConfig::from_env().install()?;
    run().await
}
