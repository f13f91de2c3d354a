//! # Supervised worker abstraction.
//!
//! A [`Worker`] is the opaque, long-lived unit a supervisor keeps alive. The
//! supervisor never inspects it beyond an optional liveness check: workers that
//! return `true` from [`Worker::checks_liveness`] get their
//! [`health_check`](Worker::health_check) polled by the heartbeat scheduler.
//!
//! The common handle type is [`WorkerRef`], an `Arc<dyn Worker>`.
//!
//! # Example
//! ```
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use async_trait::async_trait;
//! use agentvisor::{Worker, WorkerError};
//!
//! struct Agent {
//!     healthy: AtomicBool,
//! }
//!
//! #[async_trait]
//! impl Worker for Agent {
//!     fn checks_liveness(&self) -> bool { true }
//!
//!     async fn health_check(&self) -> Result<(), WorkerError> {
//!         if self.healthy.load(Ordering::Relaxed) {
//!             Ok(())
//!         } else {
//!             Err(WorkerError::HeartbeatFailed { error: "stalled".into() })
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkerError;

/// Long-lived supervised unit.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns `true` if the worker answers liveness checks.
    ///
    /// Default: `false` (heartbeats are skipped even if the child spec declares them).
    fn checks_liveness(&self) -> bool {
        false
    }

    /// Liveness check invoked by the heartbeat scheduler.
    ///
    /// A rejection, or not answering within the heartbeat timeout, is reported as a crash.
    async fn health_check(&self) -> Result<(), WorkerError> {
        Ok(())
    }
}

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;
