//! # Worker abstractions and child specifications.
//!
//! This module provides the worker-related types:
//! - [`Worker`] - trait for supervised units (optional liveness check)
//! - [`WorkerRef`] - shared handle (`Arc<dyn Worker>`)
//! - [`Factory`] / [`DegradedFallback`] - async constructors and fallbacks
//! - [`ChildSpec`] - specification bundling factory, restart policy and heartbeat

mod factory;
mod spec;
mod worker;

pub use factory::{BoxFactoryFuture, BoxFallbackFuture, DegradedFallback, Factory};
pub use spec::{ChildSpec, DEFAULT_HEARTBEAT_TIMEOUT, Heartbeat};
pub use worker::{Worker, WorkerRef};
