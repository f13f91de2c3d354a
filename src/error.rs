//! Error types used by the agentvisor runtime, its event bus and its workers.
//!
//! This module defines three error enums:
//!
//! - [`BusError`]: configuration errors raised by the [`EventBus`](crate::EventBus).
//! - [`WorkerError`]: failures of supervised workers (the crash reason).
//! - [`SupervisorError`]: errors surfaced by supervisor operations.
//!
//! All of them provide `as_label` (stable snake_case label for logs/metrics)
//! and `as_message` helpers.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the event bus.
///
/// Both variants are configuration errors: they fail fast at the call that
/// caused them and never leave the bus in a partially updated state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The per-topic listener cap is already reached.
    #[error("listener limit {limit} reached for topic '{topic}'")]
    ListenerLimit {
        /// Topic (event type, `*`, or `ns:<namespace>`) that is full.
        topic: String,
        /// The configured cap.
        limit: usize,
    },

    /// A child bus with this namespace is already registered on the parent.
    #[error("namespace '{namespace}' is already taken")]
    NamespaceTaken {
        /// The conflicting namespace.
        namespace: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use agentvisor::BusError;
    ///
    /// let err = BusError::NamespaceTaken { namespace: "planner".into() };
    /// assert_eq!(err.as_label(), "bus_namespace_taken");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::ListenerLimit { .. } => "bus_listener_limit",
            BusError::NamespaceTaken { .. } => "bus_namespace_taken",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::ListenerLimit { topic, limit } => {
                format!("listener limit: topic={topic} limit={limit}")
            }
            BusError::NamespaceTaken { namespace } => {
                format!("namespace taken: {namespace}")
            }
        }
    }
}

/// # Failures of supervised workers.
///
/// This is the crash reason handed to
/// [`Supervisable::handle_child_crash`](crate::Supervisable::handle_child_crash).
/// Factory failures and heartbeat failures are folded into the same channel
/// as explicit crash reports.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The factory could not build a worker instance.
    #[error("factory failed: {error}")]
    Factory {
        /// The underlying error message.
        error: String,
    },

    /// The worker reported (or was reported to have) crashed.
    #[error("worker crashed: {error}")]
    Crashed {
        /// The underlying error message.
        error: String,
    },

    /// The liveness check did not answer within its timeout.
    #[error("heartbeat timed out after {timeout:?}")]
    HeartbeatTimeout {
        /// The heartbeat timeout that was exceeded.
        timeout: Duration,
    },

    /// The liveness check answered with a failure.
    #[error("heartbeat failed: {error}")]
    HeartbeatFailed {
        /// The underlying error message.
        error: String,
    },

    /// A nested supervisor exhausted its restart intensity.
    #[error("supervisor '{supervisor}' exhausted its restart intensity: {error}")]
    Escalated {
        /// Id of the supervisor that gave up.
        supervisor: String,
        /// The crash that exhausted the budget.
        error: String,
    },
}

impl WorkerError {
    /// Convenience constructor for [`WorkerError::Crashed`].
    pub fn crashed(error: impl Into<String>) -> Self {
        WorkerError::Crashed {
            error: error.into(),
        }
    }

    /// Convenience constructor for [`WorkerError::Factory`].
    pub fn factory(error: impl Into<String>) -> Self {
        WorkerError::Factory {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use agentvisor::WorkerError;
    /// use std::time::Duration;
    ///
    /// let err = WorkerError::HeartbeatTimeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "worker_heartbeat_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Factory { .. } => "worker_factory_failed",
            WorkerError::Crashed { .. } => "worker_crashed",
            WorkerError::HeartbeatTimeout { .. } => "worker_heartbeat_timeout",
            WorkerError::HeartbeatFailed { .. } => "worker_heartbeat_failed",
            WorkerError::Escalated { .. } => "supervisor_escalated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Factory { error } => format!("factory: {error}"),
            WorkerError::Crashed { error } => format!("crashed: {error}"),
            WorkerError::HeartbeatTimeout { timeout } => format!("heartbeat timeout: {timeout:?}"),
            WorkerError::HeartbeatFailed { error } => format!("heartbeat: {error}"),
            WorkerError::Escalated { supervisor, error } => {
                format!("escalated by {supervisor}: {error}")
            }
        }
    }

    /// Indicates whether the failure was detected by the heartbeat scheduler.
    pub fn is_heartbeat(&self) -> bool {
        matches!(
            self,
            WorkerError::HeartbeatTimeout { .. } | WorkerError::HeartbeatFailed { .. }
        )
    }
}

/// # Errors produced by supervisor operations.
///
/// Crash handling never fails; only the initial [`start`](crate::Supervisor::start)
/// pass reports factory failures to its caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// A child factory failed during the initial start pass.
    ///
    /// The crash was recorded (and handled per strategy) before this was returned.
    #[error("child '{child}' failed to start: {error}")]
    StartFailed {
        /// Id of the first child that failed.
        child: String,
        /// The factory error.
        error: WorkerError,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::StartFailed { .. } => "supervisor_start_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::StartFailed { child, error } => {
                format!("start failed: child={child} {}", error.as_message())
            }
        }
    }
}
