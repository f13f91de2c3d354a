//! # agentvisor
//!
//! **Agentvisor** is a fault-tolerant supervision runtime for long-lived async
//! workers (agents), paired with a hierarchical event bus.
//!
//! A [`Supervisor`] keeps a declared, ordered set of children alive: it starts
//! them through async factories, detects failures (explicit crash reports and
//! heartbeat liveness checks), restarts them according to a
//! [`RestartStrategy`] within a bounded [`RestartIntensity`], and when the
//! budget is exhausted escalates to its parent supervisor or, at the root,
//! runs a degraded fallback. Every lifecycle transition is published on an
//! [`EventBus`], whose nodes form a tree with namespaced bubbling,
//! provenance tagging, broadcast and anti-storm rate limiting.
//!
//! ## Architecture
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │  ChildSpec   │   │  ChildSpec   │   │  ChildSpec   │
//!   │ id, policy,  │   │ id, policy,  │   │ id, policy,  │
//!   │ factory, hb  │   │ factory, hb  │   │ factory, hb  │
//!   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!          ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Supervisor                                                  │
//! │  - ChildTable  (status, worker, restart window, heartbeat)  │
//! │  - strategy: one-for-one │ one-for-all │ rest-for-one       │
//! │  - intensity: max_restarts within window_ms (per child)     │
//! │  - parent: Weak<dyn Supervisable> (escalation)              │
//! └──────┬────────────────────────────────────────┬─────────────┘
//!        │ heartbeat timers                       │ lifecycle events
//!        ▼                                        ▼
//!   Worker::health_check()                ┌──────────────┐
//!   (timeout ─► crash path)               │   EventBus   │── bubble ─► parent bus
//!                                         └──────┬───────┘   (_source, _bubbled)
//!                                                ▼
//!                                   listeners (sync) / SubscriberSet (async)
//! ```
//!
//! ### Escalation
//! ```text
//! root ──────────────── handle_child_crash("team", Escalated{..}) ◄──┐
//!  └─ team (Supervisor, parent = root)                               │
//!      └─ agent ── crash ×(max_restarts+1) within window ────────────┘
//!
//! at the root (no parent): intensity-exceeded ─► child stopped ─► degraded fallback
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                               |
//! |-----------------|----------------------------------------------------------|--------------------------------------------------|
//! | **Supervision** | Start, restart, escalate and shut down children          | [`Supervisor`], [`SupervisorBuilder`], [`Supervisable`] |
//! | **Workers**     | Supervised units, factories, fallbacks, child specs      | [`Worker`], [`Factory`], [`ChildSpec`]           |
//! | **Policies**    | Restart policy, strategy and intensity budget            | [`RestartPolicy`], [`RestartStrategy`], [`RestartIntensity`] |
//! | **Events**      | Hierarchical pub/sub with bubbling and broadcast         | [`EventBus`], [`Event`], [`EventKind`]           |
//! | **Subscribers** | Async, queue-backed event consumers                      | [`Subscribe`], [`SubscriberSet`], [`LogWriter`]  |
//! | **Errors**      | Typed errors for bus, workers and supervisors            | [`BusError`], [`WorkerError`], [`SupervisorError`] |
//! | **Config**      | Serde-loadable construction-time settings                | [`SupervisorConfig`], [`BusConfig`]              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use agentvisor::{
//!     ChildSpec, EventKind, RestartPolicy, Supervisable, Supervisor, SupervisorConfig,
//!     Worker, WorkerError, WorkerRef,
//! };
//!
//! struct Agent;
//! impl Worker for Agent {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder("root", SupervisorConfig::default())
//!         .with_child(ChildSpec::new("agent", RestartPolicy::Permanent, || async {
//!             Ok::<WorkerRef, WorkerError>(Arc::new(Agent))
//!         }))
//!         .build();
//!
//!     sup.bus().on(EventKind::ChildRestarted.as_str(), |ev| {
//!         println!("restarted: {:?}", ev.field_str("child"));
//!     })?;
//!
//!     sup.start().await?;
//!     sup.handle_child_crash("agent", WorkerError::crashed("lost connection")).await;
//!     sup.shutdown().await;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use config::{BusConfig, SupervisorConfig};
pub use core::{
    ChildInfo, ChildStatus, Supervisable, Supervisor, SupervisorBuilder, wait_for_shutdown_signal,
};
pub use error::{BusError, SupervisorError, WorkerError};
pub use events::{BUBBLED_KEY, Event, EventBus, EventKind, Handler, ListenerId, SOURCE_KEY, VALUE_KEY, WILDCARD};
pub use policies::{RestartIntensity, RestartPolicy, RestartStrategy, RestartWindow};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use workers::{
    BoxFactoryFuture, BoxFallbackFuture, ChildSpec, DEFAULT_HEARTBEAT_TIMEOUT, DegradedFallback,
    Factory, Heartbeat, Worker, WorkerRef,
};
