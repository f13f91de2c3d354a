//! # Heartbeat scheduler.
//!
//! One timer task per running child that declares a heartbeat and whose worker
//! answers liveness checks. The timer is owned by a [`CancellationToken`]
//! derived from the supervisor's runtime token; cancelling it is the only way a
//! timer ends besides reporting a failure.
//!
//! ```text
//! loop {
//!   ├─► wait interval            (cancellable)
//!   ├─► timeout(health_check)    (cancellable)
//!   │     ├─ Ok       ─► continue
//!   │     ├─ Err(e)   ─► report HeartbeatFailed
//!   │     └─ elapsed  ─► report HeartbeatTimeout
//!   └─► report_heartbeat_failure(idx, generation, err) ─► exit
//! }
//! ```
//!
//! ## Rules
//! - A report carries the worker generation; the supervisor ignores stale ones.
//! - A cancelled timer never reports.
//! - The timer holds only a `Weak` supervisor reference.

use std::sync::Weak;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::supervisor::Supervisor;
use crate::error::WorkerError;
use crate::workers::{Heartbeat, WorkerRef};

/// Arms a heartbeat timer for the child at `idx`.
pub(super) fn spawn(
    sup: Weak<Supervisor>,
    idx: usize,
    generation: u64,
    worker: WorkerRef,
    hb: Heartbeat,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + hb.interval, hb.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let error = loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let check = time::timeout(hb.timeout, worker.health_check());
            let outcome = tokio::select! {
                _ = token.cancelled() => return,
                res = check => res,
            };

            match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) if e.is_heartbeat() => break e,
                Ok(Err(e)) => break WorkerError::HeartbeatFailed { error: e.to_string() },
                Err(_elapsed) => break WorkerError::HeartbeatTimeout { timeout: hb.timeout },
            }
        };

        if token.is_cancelled() {
            return;
        }
        match sup.upgrade() {
            Some(sup) => sup.report_heartbeat_failure(idx, generation, error).await,
            None => debug!(idx, "heartbeat outlived its supervisor"),
        }
    });
}
