//! # Statecraft: Event/Effect Dispatch over Shared State
//!
//! Statecraft couples an application event to both its state transition and
//! its asynchronous side-effects in a single handler, then sequences their
//! application against one shared state container with well-defined
//! re-entrancy semantics.
//!
//! ## Core Concepts
//!
//! - **Events**: Immutable units of intent resolved by a pure handler
//! - **Responses**: What a resolution produced, an optional next state
//!   plus a deferred effect
//! - **Effects**: Async computations that resolve to follow-up events
//! - **Signals**: Everything a store publishes, whether an event, an
//!   internal state-update carrier, or a pass-through notice
//! - **Store**: The shared container running dispatch cycles, observed by
//!   pluggable taps
//!
//! ## Quick Start
//!
//! ### Pure state transitions
//!
//! A pure event updates state synchronously; the new value is visible as
//! soon as `dispatch` returns, with no async runtime involved:
//!
//! ```
//! use statecraft::event::{Event, EventError};
//! use statecraft::response::Response;
//! use statecraft::store::Store;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! struct Services;
//!
//! struct Increment;
//!
//! impl Event<Counter, Services> for Increment {
//!     fn handle(
//!         &self,
//!         state: Counter,
//!         _effects: &Services,
//!     ) -> Result<Response<Counter, Services>, EventError> {
//!         Ok(Response::state_update(Counter {
//!             value: state.value + 1,
//!         }))
//!     }
//! }
//!
//! # fn main() -> Result<(), statecraft::dispatch::DispatchError> {
//! let store = Store::new(Counter { value: 0 }, Services);
//! store.dispatch(Increment)?;
//! assert_eq!(store.read(), Counter { value: 1 });
//! # Ok(())
//! # }
//! ```
//!
//! ### Deferred side-effects
//!
//! An effectful event leaves state untouched until its effect resolves;
//! the produced events then re-enter the same dispatch pipeline:
//!
//! ```
//! use statecraft::effect::Effect;
//! use statecraft::event::{Event, EventError};
//! use statecraft::response::Response;
//! use statecraft::store::Store;
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! struct Services {
//!     refresh_delay: Duration,
//! }
//!
//! struct Increment;
//!
//! impl Event<Counter, Services> for Increment {
//!     fn handle(
//!         &self,
//!         state: Counter,
//!         _effects: &Services,
//!     ) -> Result<Response<Counter, Services>, EventError> {
//!         Ok(Response::state_update(Counter {
//!             value: state.value + 1,
//!         }))
//!     }
//! }
//!
//! struct RefreshLater;
//!
//! impl Event<Counter, Services> for RefreshLater {
//!     fn handle(
//!         &self,
//!         _state: Counter,
//!         effects: &Services,
//!     ) -> Result<Response<Counter, Services>, EventError> {
//!         let delay = effects.refresh_delay;
//!         Ok(Response::side_effect(Effect::deferred(move || async move {
//!             tokio::time::sleep(delay).await;
//!             Ok(vec![Box::new(Increment) as _])
//!         })))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), statecraft::dispatch::DispatchError> {
//! let store = Store::new(
//!     Counter { value: 0 },
//!     Services {
//!         refresh_delay: Duration::from_millis(10),
//!     },
//! );
//!
//! let outcome = store.dispatch(RefreshLater)?;
//! assert_eq!(store.read().value, 0); // unchanged until the effect resolves
//!
//! outcome.settle().await?;
//! assert_eq!(store.read().value, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Best Practices
//!
//! ### Describe transitions, don't perform them
//!
//! Handlers never write state; they return a [`response::Response`] and the
//! engine lands it through the reconciler. Anything async belongs inside
//! the returned effect, never in the handler body:
//!
//! ```
//! use statecraft::effect::Effect;
//! use statecraft::response::Response;
//!
//! // ✅ GOOD: a pure description of what should happen
//! let r: Response<i64, ()> = Response::state_update(1)
//!     .with_effect(Effect::deferred(|| async { Ok(Vec::new()) }));
//! assert!(!r.is_noop());
//!
//! // ✅ GOOD: "nothing to do" is an explicit, comparable value
//! assert_eq!(Response::<i64, ()>::none(), Response::default());
//!
//! // ❌ AVOID: Blocking or awaiting inside a handler body
//! // std::thread::sleep(delay); // belongs in the deferred effect instead
//! ```
//!
//! ### Capture dependencies from the effects-context
//!
//! The store holds one opaque effects-context and lends it to every
//! resolution. Handlers copy what their effect needs out of it rather than
//! reaching for globals, which keeps resolution pure and testable.
//!
//! ## Module Guide
//!
//! - [`event`] - The resolution contract events implement
//! - [`response`] - Resolution results: next state plus deferred effect
//! - [`effect`] - Deferred computations and their errors
//! - [`signal`] - Published values and the internal update carrier
//! - [`store`] - The shared state container and its builder
//! - [`dispatch`] - The publish cycle, outcomes, handles, and errors
//! - [`reconcile`] - The terminal replace/pass-through step
//! - [`taps`] - Pipeline observers: tracing, memory, channel, stdout
//! - [`telemetry`] - Record formatting and subscriber setup

pub mod dispatch;
pub mod effect;
pub mod event;
pub mod reconcile;
pub mod response;
pub mod signal;
pub mod store;
pub mod taps;
pub mod telemetry;
