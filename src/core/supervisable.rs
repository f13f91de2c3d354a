//! # Supervisable units.
//!
//! [`Supervisable`] is the only surface a supervisor needs from its parent: the
//! crash-handling entry point. A [`Supervisor`](crate::Supervisor) implements it,
//! so escalation is self-similar: a supervisor that gives up reports *itself* as
//! the failing child of its parent.
//!
//! ```text
//! outer.handle_child_crash("inner", Escalated{..})
//!            ▲
//!            │ budget exhausted
//! inner.handle_child_crash("agent-1", err)
//! ```

use async_trait::async_trait;

use crate::error::WorkerError;

/// A unit that accepts crash reports for its children.
#[async_trait]
pub trait Supervisable: Send + Sync + 'static {
    /// Stable id, used as the child id when this unit escalates to its parent.
    fn id(&self) -> &str;

    /// Reports that `child_id` failed.
    ///
    /// Never fails: outcomes are observable through status queries and events.
    /// Reports for children that are not currently running are ignored.
    async fn handle_child_crash(&self, child_id: &str, error: WorkerError);
}
