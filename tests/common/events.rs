#![allow(dead_code)]

use std::time::Duration;

use statecraft::effect::{Effect, EffectError};
use statecraft::event::{DynEvent, Event, EventError};
use statecraft::response::Response;
use tokio::time::sleep;

use super::fixtures::{Counter, Services};

/// Adds the context's `step` to the counter.
#[derive(Debug, Clone, Copy)]
pub struct Increment;

impl Event<Counter, Services> for Increment {
    fn handle(
        &self,
        state: Counter,
        effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Ok(Response::state_update(Counter {
            value: state.value + effects.step,
            ..state
        }))
    }

    fn label(&self) -> &'static str {
        "increment"
    }
}

/// Adds a fixed amount, ignoring the context.
#[derive(Debug, Clone, Copy)]
pub struct Add(pub i64);

impl Event<Counter, Services> for Add {
    fn handle(
        &self,
        state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Ok(Response::state_update(Counter {
            value: state.value + self.0,
            ..state
        }))
    }

    fn label(&self) -> &'static str {
        "add"
    }
}

/// Appends a marker to the log, leaving the value alone.
#[derive(Debug, Clone, Copy)]
pub struct Record(pub &'static str);

impl Event<Counter, Services> for Record {
    fn handle(
        &self,
        state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        let mut next = state;
        next.log.push(self.0.to_string());
        Ok(Response::state_update(next))
    }

    fn label(&self) -> &'static str {
        "record"
    }
}

/// Resolves to a no-op response; dispatching it changes nothing.
#[derive(Debug, Clone, Copy)]
pub struct Quiet;

impl Event<Counter, Services> for Quiet {
    fn handle(
        &self,
        _state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Ok(Response::none())
    }

    fn label(&self) -> &'static str {
        "quiet"
    }
}

/// No immediate state change; the effect waits, then dispatches
/// `Add(amount)`.
#[derive(Debug, Clone, Copy)]
pub struct AsyncIncrement {
    pub amount: i64,
    pub delay: Duration,
}

impl Event<Counter, Services> for AsyncIncrement {
    fn handle(
        &self,
        _state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        let amount = self.amount;
        let delay = self.delay;
        Ok(Response::side_effect(Effect::deferred(move || async move {
            sleep(delay).await;
            Ok(vec![Box::new(Add(amount)) as DynEvent<Counter, Services>])
        })))
    }

    fn label(&self) -> &'static str {
        "async_increment"
    }
}

/// Effect resolves to one `Record` per mark, dispatched in slice order.
#[derive(Debug, Clone, Copy)]
pub struct FanOut {
    pub marks: &'static [&'static str],
}

impl Event<Counter, Services> for FanOut {
    fn handle(
        &self,
        _state: Counter,
        effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        let marks = self.marks;
        let delay = effects.delay;
        Ok(Response::side_effect(Effect::deferred(move || async move {
            sleep(delay).await;
            Ok(marks
                .iter()
                .copied()
                .map(|mark| Box::new(Record(mark)) as DynEvent<Counter, Services>)
                .collect())
        })))
    }

    fn label(&self) -> &'static str {
        "fan_out"
    }
}

/// Records its depth, then defers the next level down while depth > 0.
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    pub depth: u32,
}

impl Event<Counter, Services> for Cascade {
    fn handle(
        &self,
        state: Counter,
        effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        let mut next = state;
        next.log.push(format!("cascade:{}", self.depth));
        if self.depth == 0 {
            return Ok(Response::state_update(next));
        }

        let below = Cascade {
            depth: self.depth - 1,
        };
        let delay = effects.delay;
        Ok(Response::state_update(next).with_effect(Effect::deferred(
            move || async move {
                sleep(delay).await;
                Ok(vec![Box::new(below) as DynEvent<Counter, Services>])
            },
        )))
    }

    fn label(&self) -> &'static str {
        "cascade"
    }
}

/// Handler refuses outright; nothing is applied.
#[derive(Debug, Clone, Copy)]
pub struct Reject {
    pub reason: &'static str,
}

impl Event<Counter, Services> for Reject {
    fn handle(
        &self,
        _state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Err(EventError::Rejected(self.reason.to_string()))
    }

    fn label(&self) -> &'static str {
        "reject"
    }
}

/// The deferred computation itself fails to resolve.
#[derive(Debug, Clone, Copy)]
pub struct BrokenEffect {
    pub message: &'static str,
}

impl Event<Counter, Services> for BrokenEffect {
    fn handle(
        &self,
        _state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        let message = self.message;
        Ok(Response::side_effect(Effect::deferred(move || async move {
            Err(EffectError::Failed(message.to_string()))
        })))
    }

    fn label(&self) -> &'static str {
        "broken_effect"
    }
}

/// Effect resolves fine, but the event it produces refuses resolution.
#[derive(Debug, Clone, Copy)]
pub struct DeferReject;

impl Event<Counter, Services> for DeferReject {
    fn handle(
        &self,
        _state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        Ok(Response::side_effect(Effect::deferred(|| async {
            Ok(vec![
                Box::new(Reject {
                    reason: "deferred rejection",
                }) as DynEvent<Counter, Services>,
            ])
        })))
    }

    fn label(&self) -> &'static str {
        "defer_reject"
    }
}

/// Cascades `depth` levels of effects, then fails at the bottom.
#[derive(Debug, Clone, Copy)]
pub struct FailDeep {
    pub depth: u32,
}

impl Event<Counter, Services> for FailDeep {
    fn handle(
        &self,
        _state: Counter,
        _effects: &Services,
    ) -> Result<Response<Counter, Services>, EventError> {
        if self.depth == 0 {
            return Ok(Response::side_effect(Effect::deferred(|| async {
                Err(EffectError::Failed("bottom of the cascade".into()))
            })));
        }

        let below = FailDeep {
            depth: self.depth - 1,
        };
        Ok(Response::side_effect(Effect::deferred(move || async move {
            Ok(vec![Box::new(below) as DynEvent<Counter, Services>])
        })))
    }

    fn label(&self) -> &'static str {
        "fail_deep"
    }
}
