//! Events: data model, hierarchical bus and anti-storm guard.
//!
//! ## Contents
//! - [`Event`], [`EventKind`] payload contract and supervisor lifecycle vocabulary
//! - [`EventBus`] per-node pub/sub with bubbling and broadcast
//! - `limiter` per-child bubble-rate counters (crate-internal)
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` (lifecycle events), user code via `EventBus::emit`.
//! - **Consumers**: listeners registered with `on` / `on_namespaced`, and the
//!   async [`SubscriberSet`](crate::SubscriberSet) attached through a wildcard listener.

mod bus;
mod event;
mod limiter;

pub use bus::{EventBus, Handler, ListenerId, WILDCARD};
pub use event::{BUBBLED_KEY, Event, EventKind, SOURCE_KEY, VALUE_KEY};
