//! # LogWriter: lifecycle events as structured logs.
//!
//! Renders supervisor lifecycle events through `tracing`. Other event types
//! are logged at `debug` with their type and sequence number.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  supervisor started supervisor="root" strategy="one-for-one" children=2
//! WARN  child crashed supervisor="root" child="planner" error="crashed: boom"
//! INFO  child restarted supervisor="root" child="planner" restarts=1
//! ERROR restart intensity exceeded supervisor="root" child="planner" max_restarts=3
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Lifecycle log subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let sup = e.field_str("supervisor").unwrap_or("?");
        let child = e.field_str("child").unwrap_or("?");
        let source = e.source().unwrap_or("local");

        match e.kind() {
            Some(EventKind::SupervisorStart) => {
                let strategy = e.field_str("strategy").unwrap_or("?");
                let children = e.data.get("children").and_then(|v| v.as_u64()).unwrap_or(0);
                info!(supervisor = sup, strategy, children, source, "supervisor started");
            }
            Some(EventKind::SupervisorStop) => {
                info!(supervisor = sup, source, "supervisor stopped");
            }
            Some(EventKind::ChildStarted) => {
                info!(supervisor = sup, child, source, "child started");
            }
            Some(EventKind::ChildRestarted) => {
                let restarts = e.data.get("restarts").and_then(|v| v.as_u64()).unwrap_or(0);
                info!(supervisor = sup, child, restarts, source, "child restarted");
            }
            Some(EventKind::ChildCrashed) => {
                let err = e.field_str("error").unwrap_or("unknown");
                warn!(supervisor = sup, child, error = err, source, "child crashed");
            }
            Some(EventKind::ChildStopped) => {
                debug!(supervisor = sup, child, source, "child stopped");
            }
            Some(EventKind::IntensityExceeded) => {
                let max = e.data.get("max_restarts").and_then(|v| v.as_u64()).unwrap_or(0);
                error!(supervisor = sup, child, max_restarts = max, source, "restart intensity exceeded");
            }
            None => {
                debug!(event = %e.event_type, seq = e.seq, source, "event");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
