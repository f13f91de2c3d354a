//! # Worker factories and degraded fallbacks.
//!
//! A [`Factory`] produces a fresh [`WorkerRef`] per (re)start; a
//! [`DegradedFallback`] is the best-effort action a root supervisor runs once a
//! child exhausted its restart budget.
//!
//! Both are implemented for plain closures returning futures, so most callers
//! never name these traits:
//! ```rust
//! use std::sync::Arc;
//! use agentvisor::{Factory, Worker, WorkerError, WorkerRef};
//!
//! struct Idle;
//! impl Worker for Idle {}
//!
//! let factory = || async { Ok::<WorkerRef, WorkerError>(Arc::new(Idle)) };
//! let _boxed: Arc<dyn Factory> = Arc::new(factory);
//! ```
//!
//! ## Rules
//! - Every call creates a **new** future; there is no shared state between
//!   restarts unless the closure captures an `Arc<...>` explicitly.
//! - A factory call is never cancelled once started.

use std::future::Future;

use futures::future::BoxFuture;

use crate::error::WorkerError;
use crate::workers::worker::WorkerRef;

/// Boxed future returned by [`Factory::create`].
pub type BoxFactoryFuture = BoxFuture<'static, Result<WorkerRef, WorkerError>>;

/// Boxed future returned by [`DegradedFallback::run`].
pub type BoxFallbackFuture = BoxFuture<'static, Result<(), WorkerError>>;

/// Zero-argument async constructor of workers.
pub trait Factory: Send + Sync + 'static {
    /// Builds a new worker instance.
    fn create(&self) -> BoxFactoryFuture;
}

impl<F, Fut> Factory for F
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<WorkerRef, WorkerError>> + Send + 'static,
{
    fn create(&self) -> BoxFactoryFuture {
        Box::pin((self)())
    }
}

/// Best-effort recovery run when a root supervisor gives up on a child.
pub trait DegradedFallback: Send + Sync + 'static {
    /// Runs the fallback. Errors are logged and swallowed by the supervisor.
    fn run(&self) -> BoxFallbackFuture;
}

impl<F, Fut> DegradedFallback for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn run(&self) -> BoxFallbackFuture {
        Box::pin((self)())
    }
}
