//! Signal taps demo: observing the dispatch pipeline.
//!
//! Registers four taps on one store and shows what each sees: a tracing
//! tap, an in-memory tap with per-kind counts, a flume channel drained by a
//! separate task, and a formatted stdout tap.
//!
//! Run with: `cargo run --example signal_taps`

use std::time::Duration;

use miette::{IntoDiagnostic, Result};
use serde_json::json;
use statecraft::effect::Effect;
use statecraft::event::{DynEvent, Event, EventError};
use statecraft::response::Response;
use statecraft::store::Store;
use statecraft::taps::{ChannelTap, MemoryTap, StdoutTap, TracingTap};
use statecraft::telemetry::TelemetryConfig;
use tracing::info;

#[derive(Clone, Debug, Default)]
struct Tally {
    score: i64,
}

struct Score(i64);

impl Event<Tally, ()> for Score {
    fn handle(&self, state: Tally, _effects: &()) -> Result<Response<Tally, ()>, EventError> {
        Ok(Response::state_update(Tally {
            score: state.score + self.0,
        }))
    }

    fn label(&self) -> &'static str {
        "score"
    }
}

/// Awards extra points a little later.
struct Bonus;

impl Event<Tally, ()> for Bonus {
    fn handle(&self, _state: Tally, _effects: &()) -> Result<Response<Tally, ()>, EventError> {
        Ok(Response::side_effect(Effect::deferred(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(vec![Box::new(Score(10)) as DynEvent<Tally, ()>])
        })))
    }

    fn label(&self) -> &'static str {
        "bonus"
    }
}

async fn run() -> Result<()> {
    let memory = MemoryTap::new();
    let (tx, rx) = flume::unbounded();

    let store = Store::builder()
        .with_tap(TracingTap::new())
        .with_tap(memory.clone())
        .with_tap(ChannelTap::new(tx))
        .with_tap(StdoutTap::new())
        .build(Tally::default(), ());

    let drain = tokio::spawn(async move {
        let mut seen = 0_usize;
        while let Ok(record) = rx.recv_async().await {
            seen += 1;
            info!(
                kind = %record.kind,
                label = record.label.as_deref().unwrap_or("-"),
                "channel tap received"
            );
        }
        seen
    });

    info!("dispatching scores and a round notice");
    store.dispatch(Score(3))?;
    store.dispatch(Score(4))?;
    store.notice("round", json!({"n": 1}))?;
    info!(score = store.read().score, "tally so far");

    info!("dispatching a deferred bonus");
    store.dispatch(Bonus)?.settle().await?;
    info!(score = store.read().score, "tally after the bonus settled");

    let counts = memory.counts();
    info!(?counts, "memory tap counts");

    // Dropping the store closes the channel tap's sender.
    drop(store);
    let seen = drain.await.into_diagnostic()?;
    info!(seen, "channel tap drained");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_panic_hook();
    TelemetryConfig::from_env().install()?;
    run().await
}
