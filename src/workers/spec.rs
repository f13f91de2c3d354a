//! # Child specification.
//!
//! Defines [`ChildSpec`], the immutable description of one supervised child:
//! id, [`RestartPolicy`], [`Factory`], optional heartbeat and optional degraded
//! fallback.
//!
//! ## Example
//! ```rust
//! use std::{sync::Arc, time::Duration};
//! use agentvisor::{ChildSpec, RestartPolicy, Worker, WorkerError, WorkerRef};
//!
//! struct Idle;
//! impl Worker for Idle {}
//!
//! let spec = ChildSpec::new("planner", RestartPolicy::Permanent, || async {
//!     Ok::<WorkerRef, WorkerError>(Arc::new(Idle))
//! })
//! .with_heartbeat(Duration::from_secs(1), None);
//!
//! assert_eq!(spec.id(), "planner");
//! assert_eq!(spec.heartbeat().unwrap().timeout, Duration::from_secs(5));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::policies::RestartPolicy;
use crate::workers::factory::{DegradedFallback, Factory};

/// Heartbeat timeout used when a spec only declares an interval.
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);

/// Heartbeat schedule of one child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Heartbeat {
    /// Period between liveness checks.
    pub interval: Duration,
    /// Maximum time one liveness check may take.
    pub timeout: Duration,
}

/// Specification of a supervised child.
#[derive(Clone)]
pub struct ChildSpec {
    id: Arc<str>,
    policy: RestartPolicy,
    factory: Arc<dyn Factory>,
    heartbeat: Option<Heartbeat>,
    fallback: Option<Arc<dyn DegradedFallback>>,
}

impl ChildSpec {
    /// Creates a child spec without heartbeat or fallback.
    pub fn new(id: impl Into<Arc<str>>, policy: RestartPolicy, factory: impl Factory) -> Self {
        Self {
            id: id.into(),
            policy,
            factory: Arc::new(factory),
            heartbeat: None,
            fallback: None,
        }
    }

    /// Enables periodic liveness checks.
    ///
    /// `timeout = None` uses [`DEFAULT_HEARTBEAT_TIMEOUT`]. A zero interval disables heartbeats.
    pub fn with_heartbeat(mut self, interval: Duration, timeout: Option<Duration>) -> Self {
        self.heartbeat = (!interval.is_zero()).then(|| Heartbeat {
            interval,
            timeout: timeout.unwrap_or(DEFAULT_HEARTBEAT_TIMEOUT),
        });
        self
    }

    /// Sets the fallback run when this child exhausts a root supervisor's budget.
    pub fn with_degraded_fallback(mut self, fallback: impl DegradedFallback) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Returns a new spec with updated restart policy.
    pub fn with_policy(mut self, policy: RestartPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn policy(&self) -> RestartPolicy {
        self.policy
    }

    pub fn heartbeat(&self) -> Option<Heartbeat> {
        self.heartbeat
    }

    pub(crate) fn factory(&self) -> &Arc<dyn Factory> {
        &self.factory
    }

    pub(crate) fn fallback(&self) -> Option<&Arc<dyn DegradedFallback>> {
        self.fallback.as_ref()
    }

    /// Returns `true` if a degraded fallback is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSpec")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .field("heartbeat", &self.heartbeat)
            .field("fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}
