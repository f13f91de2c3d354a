//! # Supervisor: keeps a declared set of children alive.
//!
//! The [`Supervisor`] owns an ordered list of [`ChildSpec`]s, starts them,
//! detects failures (explicit crash reports and heartbeat failures) and applies
//! its [`RestartStrategy`] within a [`RestartIntensity`](crate::RestartIntensity)
//! budget. When a child exhausts the budget the supervisor escalates to its
//! parent (reporting itself as the failing child) or, at the root, runs the
//! child's degraded fallback.
//!
//! ## High-level architecture
//! ```text
//! start():
//!   ChildSpec[0]  ChildSpec[1]  ...  ChildSpec[N-1]      (declaration order)
//!       └──► factory() ─ ok ─► running, heartbeat armed, child-started
//!                     └ err ─► crash path (then StartFailed is returned)
//!
//! crash path (explicit report │ heartbeat failure │ factory failure):
//!   guard: only running children (or a just-failed restart) are eligible
//!   ├─► crashed, heartbeat cleared, child-crashed
//!   ├─► temporary          ─► stopped
//!   ├─► budget exhausted   ─► intensity-exceeded, stopped
//!   │                          ├─ parent?   ─► parent.handle_child_crash(self.id)
//!   │                          └─ fallback? ─► fallback() (errors swallowed)
//!   └─► record restart, strategy:
//!          one-for-one  ─► restart child
//!          one-for-all  ─► stop all        ─► restart all (in order)
//!          rest-for-one ─► stop child..end ─► restart child..end (in order)
//!        failed restarts are queued and go through the crash path again
//!
//! shutdown():
//!   cancel runtime token (all heartbeats) ─► stop children in reverse order ─► supervisor:stop
//! ```
//!
//! ## Concurrency
//! Start, crash handling and shutdown are serialized by an async flow lock, so
//! every state transition happens on one logical flow. The child table lock is
//! never held across an `.await` nor while events are dispatched.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use agentvisor::{
//!     ChildSpec, ChildStatus, RestartPolicy, RestartStrategy, Supervisable, Supervisor,
//!     SupervisorConfig, Worker, WorkerError, WorkerRef,
//! };
//!
//! struct Agent;
//! impl Worker for Agent {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SupervisorConfig::default().with_strategy(RestartStrategy::OneForAll);
//!     let sup = Supervisor::builder("root", cfg)
//!         .with_child(ChildSpec::new("agent", RestartPolicy::Permanent, || async {
//!             Ok::<WorkerRef, WorkerError>(Arc::new(Agent))
//!         }))
//!         .build();
//!
//!     sup.start().await?;
//!     sup.handle_child_crash("agent", WorkerError::crashed("boom")).await;
//!     assert_eq!(sup.child_state("agent").unwrap().status, ChildStatus::Running);
//!
//!     sup.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Value, json};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    builder::SupervisorBuilder,
    child::{ChildInfo, ChildStatus, ChildTable},
    heartbeat,
    shutdown,
    supervisable::Supervisable,
};
use crate::{
    config::SupervisorConfig,
    error::{SupervisorError, WorkerError},
    events::{EventBus, EventKind},
    policies::RestartStrategy,
    workers::{Worker, WorkerRef},
};

/// Why a child is being (re)started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StartMode {
    Initial,
    Restart,
}

/// A failure waiting to go through the crash path.
///
/// `generation` pins the worker instance the failure belongs to; a queued
/// failure whose child has moved on is dropped.
#[derive(Debug)]
struct Failure {
    idx: usize,
    generation: u64,
    error: WorkerError,
}

/// Keeps a declared set of children alive according to policy.
pub struct Supervisor {
    pub(super) id: Arc<str>,
    pub(super) cfg: SupervisorConfig,
    pub(super) bus: Arc<EventBus>,
    pub(super) parent: Option<Weak<dyn Supervisable>>,
    pub(super) table: Mutex<ChildTable>,
    pub(super) flow: tokio::sync::Mutex<()>,
    pub(super) runtime_token: Mutex<CancellationToken>,
    pub(super) me: Weak<Supervisor>,
}

impl Supervisor {
    /// Returns a builder for a supervisor named `id`.
    pub fn builder(id: impl Into<Arc<str>>, cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(id, cfg)
    }

    /// Bus on which lifecycle events are emitted.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Starts every declared child, strictly in declaration order.
    ///
    /// A factory failure is handled as an immediate crash of that child and does
    /// not prevent the following children from starting. The first failure is
    /// returned once every child has been attempted.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let _flow = self.flow.lock().await;
        let token = self.renew_runtime_token();

        let count = self.table().len();
        info!(supervisor = %self.id, strategy = %self.cfg.strategy, children = count, "starting supervisor");
        self.emit(
            EventKind::SupervisorStart,
            json!({
                "supervisor": &*self.id,
                "strategy": self.cfg.strategy.as_str(),
                "children": count,
            }),
        );

        let mut first_failure: Option<(String, WorkerError)> = None;
        for idx in 0..count {
            if token.is_cancelled() {
                break;
            }
            // A restart pass triggered by an earlier failure may already have started it.
            if self.table().slot(idx).status() == ChildStatus::Running {
                continue;
            }
            if let Err(error) = self.start_child(idx, StartMode::Initial).await {
                let (child, generation) = {
                    let mut t = self.table();
                    let generation = t.state_mut(idx).generation;
                    (t.slot(idx).spec.id().to_string(), generation)
                };
                if first_failure.is_none() {
                    first_failure = Some((child, error.clone()));
                }
                self.process_failures(Failure {
                    idx,
                    generation,
                    error,
                })
                .await;
            }
        }

        match first_failure {
            Some((child, error)) => Err(SupervisorError::StartFailed { child, error }),
            None => Ok(()),
        }
    }

    /// Stops every child in reverse declaration order and clears all heartbeats.
    ///
    /// Workers are only released, never asked to stop. If crash handling is in
    /// flight, shutdown waits for it up to the advisory shutdown timeout and then
    /// proceeds anyway; a factory call that completes afterwards is discarded.
    pub async fn shutdown(&self) {
        self.current_runtime_token().cancel();

        let _flow = match self.cfg.shutdown_timeout() {
            Some(limit) => match time::timeout(limit, self.flow.lock()).await {
                Ok(guard) => Some(guard),
                Err(_elapsed) => {
                    warn!(supervisor = %self.id, timeout = ?limit, "in-flight restart exceeded shutdown timeout; stopping anyway");
                    None
                }
            },
            None => Some(self.flow.lock().await),
        };

        let count = self.table().len();
        for idx in (0..count).rev() {
            self.stop_child(idx);
        }

        info!(supervisor = %self.id, "supervisor stopped");
        self.emit(EventKind::SupervisorStop, json!({ "supervisor": &*self.id }));
    }

    /// Starts the tree, waits for a termination signal, then shuts down.
    ///
    /// Start failures are logged (they were already handled as crashes).
    /// Returns an error only if signal registration failed; shutdown still runs.
    pub async fn run_until_shutdown_signal(&self) -> std::io::Result<()> {
        if let Err(e) = self.start().await {
            warn!(supervisor = %self.id, error = %e, "start pass reported a failure");
        }
        let signal = shutdown::wait_for_shutdown_signal().await;
        info!(supervisor = %self.id, "shutdown signal received");
        self.shutdown().await;
        signal
    }

    /// Returns a snapshot of one child (`None` for unknown ids).
    pub fn child_state(&self, child_id: &str) -> Option<ChildInfo> {
        let t = self.table();
        t.position(child_id).map(|idx| t.slot(idx).info())
    }

    /// Returns `(id, status)` of every declared child, in declaration order.
    pub fn children_status(&self) -> Vec<(String, ChildStatus)> {
        self.table()
            .slots()
            .iter()
            .map(|s| (s.spec.id().to_string(), s.status()))
            .collect()
    }

    /// Returns the worker of `child_id` only while its status is exactly `running`.
    pub fn live_node(&self, child_id: &str) -> Option<WorkerRef> {
        let t = self.table();
        let idx = t.position(child_id)?;
        let state = t.slot(idx).state.as_ref()?;
        match state.status {
            ChildStatus::Running => state.worker.clone(),
            _ => None,
        }
    }

    /// Number of armed heartbeat timers.
    pub fn active_heartbeats(&self) -> usize {
        self.table().active_heartbeats()
    }

    // ---------------------------
    // Crash path
    // ---------------------------

    /// Entry point for heartbeat timers.
    pub(super) async fn report_heartbeat_failure(&self, idx: usize, generation: u64, error: WorkerError) {
        let _flow = self.flow.lock().await;
        if self.running_generation(idx) != Some(generation) {
            debug!(supervisor = %self.id, idx, generation, "stale heartbeat failure ignored");
            return;
        }
        self.process_failures(Failure {
            idx,
            generation,
            error,
        })
        .await;
    }

    /// Runs the crash path for `first` and every restart failure it causes.
    ///
    /// Callers hold the flow lock.
    async fn process_failures(&self, first: Failure) {
        let token = self.current_runtime_token();
        let mut pending = VecDeque::from([first]);

        while let Some(failure) = pending.pop_front() {
            if token.is_cancelled() {
                break;
            }
            if !self.still_current(&failure) {
                continue;
            }
            for next in self.on_crash(failure).await {
                // One pending failure per child is enough; a repeat would double-count.
                if !pending.iter().any(|p| p.idx == next.idx) {
                    pending.push_back(next);
                }
            }
        }
    }

    /// Handles one accepted crash and returns the restarts that failed.
    async fn on_crash(&self, failure: Failure) -> Vec<Failure> {
        let Failure { idx, error, .. } = failure;
        let now = Instant::now();
        let intensity = self.cfg.intensity;

        let (child, policy, exhausted) = {
            let mut t = self.table();
            let policy = t.slot(idx).spec.policy();
            let child = t.slot(idx).spec.id().to_string();
            let state = t.state_mut(idx);
            state.detach(ChildStatus::Crashed);
            let exhausted = policy.allows_restart() && state.restarts.is_exhausted(now, &intensity);
            (child, policy, exhausted)
        };

        warn!(supervisor = %self.id, child = %child, error = %error, "child crashed");
        self.emit(
            EventKind::ChildCrashed,
            json!({
                "supervisor": &*self.id,
                "child": &child,
                "error": error.to_string(),
                "reason": error.as_label(),
            }),
        );

        if !policy.allows_restart() {
            debug!(supervisor = %self.id, child = %child, "temporary child not restarted");
            self.stop_child(idx);
            return Vec::new();
        }

        if exhausted {
            self.on_intensity_exceeded(idx, &child, error).await;
            return Vec::new();
        }

        self.table().state_mut(idx).restarts.record(now);
        self.apply_strategy(idx).await
    }

    async fn on_intensity_exceeded(&self, idx: usize, child: &str, error: WorkerError) {
        let intensity = self.cfg.intensity;
        warn!(
            supervisor = %self.id,
            child,
            max_restarts = intensity.max_restarts,
            window_ms = intensity.window_ms,
            "restart intensity exceeded"
        );
        self.emit(
            EventKind::IntensityExceeded,
            json!({
                "supervisor": &*self.id,
                "child": child,
                "error": error.to_string(),
                "max_restarts": intensity.max_restarts,
                "window_ms": intensity.window_ms,
            }),
        );
        self.stop_child(idx);

        if let Some(parent) = &self.parent {
            match parent.upgrade() {
                Some(parent) => {
                    info!(supervisor = %self.id, parent = parent.id(), "escalating to parent supervisor");
                    parent
                        .handle_child_crash(
                            &self.id,
                            WorkerError::Escalated {
                                supervisor: self.id.to_string(),
                                error: error.to_string(),
                            },
                        )
                        .await;
                    return;
                }
                None => warn!(supervisor = %self.id, "parent supervisor is gone; cannot escalate"),
            }
        }

        let fallback = self.table().slot(idx).spec.fallback().cloned();
        if let Some(fallback) = fallback {
            info!(supervisor = %self.id, child, "running degraded fallback");
            match AssertUnwindSafe(fallback.run()).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(supervisor = %self.id, child, error = %e, "degraded fallback failed"),
                Err(_panic) => warn!(supervisor = %self.id, child, "degraded fallback panicked"),
            }
        }
    }

    /// Restarts the siblings selected by the strategy, in declaration order.
    async fn apply_strategy(&self, idx: usize) -> Vec<Failure> {
        let strategy = self.cfg.strategy;
        let targets: Vec<usize> = {
            let t = self.table();
            strategy
                .affected(idx, t.len())
                .filter(|&i| i == idx || (t.slot(i).state.is_some() && !t.slot(i).is_retired()))
                .collect()
        };

        if strategy != RestartStrategy::OneForOne {
            for &i in &targets {
                self.stop_child(i);
            }
        }

        let token = self.current_runtime_token();
        let mut failed = Vec::new();
        for i in targets {
            if token.is_cancelled() {
                break;
            }
            if let Err(error) = self.start_child(i, StartMode::Restart).await {
                let generation = self.table().state_mut(i).generation;
                failed.push(Failure {
                    idx: i,
                    generation,
                    error,
                });
            }
        }
        failed
    }

    /// Runs the factory for the child at `idx` and attaches the new worker.
    ///
    /// On failure the child is left `stopped` without a worker.
    async fn start_child(&self, idx: usize, mode: StartMode) -> Result<(), WorkerError> {
        let (child, factory) = {
            let mut t = self.table();
            let child = t.slot(idx).spec.id().to_string();
            let factory = t.slot(idx).spec.factory().clone();
            let status = match mode {
                StartMode::Initial => ChildStatus::Stopped,
                StartMode::Restart => ChildStatus::Restarting,
            };
            t.state_mut(idx).detach(status);
            (child, factory)
        };

        debug!(supervisor = %self.id, child = %child, ?mode, "invoking factory");
        let created = factory.create().await;

        let token = self.current_runtime_token();
        let worker = match created {
            Ok(worker) => worker,
            Err(error) => {
                self.table().state_mut(idx).detach(ChildStatus::Stopped);
                return Err(error);
            }
        };
        if token.is_cancelled() {
            debug!(supervisor = %self.id, child = %child, "discarding worker created during shutdown");
            self.table().state_mut(idx).detach(ChildStatus::Stopped);
            return Ok(());
        }

        let (generation, restarts) = {
            let mut t = self.table();
            let hb = t.slot(idx).spec.heartbeat();
            let state = t.state_mut(idx);
            state.generation += 1;
            state.status = ChildStatus::Running;
            state.worker = Some(worker.clone());

            if let Some(hb) = hb.filter(|_| worker.checks_liveness()) {
                let hb_token = token.child_token();
                state.heartbeat = Some(hb_token.clone());
                heartbeat::spawn(self.me.clone(), idx, state.generation, worker, hb, hb_token);
            }
            (state.generation, state.restarts.len())
        };

        match mode {
            StartMode::Initial => {
                info!(supervisor = %self.id, child = %child, "child started");
                self.emit(
                    EventKind::ChildStarted,
                    json!({ "supervisor": &*self.id, "child": &child }),
                );
            }
            StartMode::Restart => {
                info!(supervisor = %self.id, child = %child, generation, "child restarted");
                self.emit(
                    EventKind::ChildRestarted,
                    json!({ "supervisor": &*self.id, "child": &child, "restarts": restarts }),
                );
            }
        }
        Ok(())
    }

    /// Moves the child at `idx` to `stopped`. No-op for unstarted or stopped children.
    fn stop_child(&self, idx: usize) {
        let child = {
            let mut t = self.table();
            let child = t.slot(idx).spec.id().to_string();
            match t.existing_mut(idx) {
                Some(state) if state.status != ChildStatus::Stopped => {
                    state.detach(ChildStatus::Stopped);
                }
                _ => return,
            }
            child
        };

        debug!(supervisor = %self.id, child = %child, "child stopped");
        self.emit(
            EventKind::ChildStopped,
            json!({ "supervisor": &*self.id, "child": &child }),
        );
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn table(&self) -> MutexGuard<'_, ChildTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_runtime_token(&self) -> CancellationToken {
        self.runtime_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a live runtime token, replacing one cancelled by a previous shutdown.
    fn renew_runtime_token(&self) -> CancellationToken {
        let mut token = self.runtime_token.lock().unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        token.clone()
    }

    /// Generation of the child at `idx` if it is running.
    fn running_generation(&self, idx: usize) -> Option<u64> {
        let t = self.table();
        t.slot(idx)
            .state
            .as_ref()
            .filter(|s| s.status == ChildStatus::Running)
            .map(|s| s.generation)
    }

    /// A failure is current while its worker generation is still attached (running)
    /// or is the one whose start just failed (stopped).
    fn still_current(&self, failure: &Failure) -> bool {
        let t = self.table();
        t.slot(failure.idx).state.as_ref().is_some_and(|s| {
            s.generation == failure.generation
                && matches!(s.status, ChildStatus::Running | ChildStatus::Stopped)
        })
    }

    fn emit(&self, kind: EventKind, data: Value) {
        self.bus.emit(kind.as_str(), data);
    }
}

#[async_trait]
impl Supervisable for Supervisor {
    fn id(&self) -> &str {
        &self.id
    }

    async fn handle_child_crash(&self, child_id: &str, error: WorkerError) {
        let Some(idx) = self.table().position(child_id) else {
            warn!(supervisor = %self.id, child = child_id, "crash reported for unknown child");
            return;
        };
        // The report belongs to the worker running now; pin it before waiting
        // so that a duplicate queued behind the flow lock cannot hit its replacement.
        let Some(generation) = self.running_generation(idx) else {
            debug!(supervisor = %self.id, child = child_id, "crash report ignored; child not running");
            return;
        };

        let _flow = self.flow.lock().await;
        if self.running_generation(idx) != Some(generation) {
            debug!(supervisor = %self.id, child = child_id, generation, "crash report ignored; already handled");
            return;
        }
        self.process_failures(Failure {
            idx,
            generation,
            error,
        })
        .await;
    }
}

/// A supervisor can itself be a child of another supervisor.
///
/// It exposes no liveness check; failures surface through escalation.
impl Worker for Supervisor {}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.runtime_token
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
