//! Runtime core: supervision and lifecycle.
//!
//! The public surface of this module is [`Supervisor`] (with its
//! [`SupervisorBuilder`]), the [`Supervisable`] escalation seam and the
//! read-only [`ChildInfo`] / [`ChildStatus`] views.
//!
//! Internal modules:
//! - [`supervisor`]: start pass, crash path, restart strategies, escalation, shutdown;
//! - [`child`]: per-child state table (status, worker, restart window, heartbeat token);
//! - [`heartbeat`]: per-child liveness timers;
//! - [`builder`]: supervisor construction;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod child;
mod heartbeat;
mod shutdown;
mod supervisable;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use child::{ChildInfo, ChildStatus};
pub use shutdown::wait_for_shutdown_signal;
pub use supervisable::Supervisable;
pub use supervisor::Supervisor;
