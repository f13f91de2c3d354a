//! # Child table: per-child mutable state owned by one supervisor.
//!
//! The table is an arena indexed by declaration order with an id → index map.
//! Entries are created lazily on first start and mutated in place afterwards.
//! Nothing outside `core` can reach a [`ChildState`].
//!
//! ## State machine
//! ```text
//! stopped ──factory ok──► running ──crash──► crashed ──policy allows──► restarting ──► running
//!                                               │
//!                                               └── temporary / budget exhausted ──► stopped
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::policies::{RestartPolicy, RestartWindow};
use crate::workers::{ChildSpec, WorkerRef};

/// Lifecycle status of a child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildStatus {
    /// A live worker is attached.
    Running,
    /// No worker; initial and final state.
    Stopped,
    /// A crash was accepted and is being handled.
    Crashed,
    /// The factory is producing a replacement worker.
    Restarting,
}

impl ChildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChildStatus::Running => "running",
            ChildStatus::Stopped => "stopped",
            ChildStatus::Crashed => "crashed",
            ChildStatus::Restarting => "restarting",
        }
    }
}

/// Read-only view of one child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChildInfo {
    /// Child id.
    pub id: String,
    /// Current status (`Stopped` for children never started).
    pub status: ChildStatus,
    /// Restart policy from the spec.
    pub policy: RestartPolicy,
    /// Restart timestamps currently held in the sliding window.
    pub restarts_in_window: usize,
    /// Whether a heartbeat timer is armed.
    pub heartbeat_active: bool,
    /// Number of successful starts so far.
    pub generation: u64,
}

/// Mutable per-child state.
#[derive(Default)]
pub(crate) struct ChildState {
    pub(crate) worker: Option<WorkerRef>,
    pub(crate) status: ChildStatus,
    pub(crate) restarts: RestartWindow,
    pub(crate) heartbeat: Option<CancellationToken>,
    pub(crate) generation: u64,
}

impl Default for ChildStatus {
    fn default() -> Self {
        ChildStatus::Stopped
    }
}

impl ChildState {
    /// Cancels the heartbeat timer, if any. Returns `true` if one was armed.
    pub(crate) fn clear_heartbeat(&mut self) -> bool {
        match self.heartbeat.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Moves to `status`, dropping the worker and the heartbeat.
    pub(crate) fn detach(&mut self, status: ChildStatus) {
        self.clear_heartbeat();
        self.worker = None;
        self.status = status;
    }

    fn heartbeat_armed(&self) -> bool {
        self.heartbeat.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

pub(crate) struct Slot {
    pub(crate) spec: ChildSpec,
    pub(crate) state: Option<ChildState>,
}

impl Slot {
    pub(crate) fn status(&self) -> ChildStatus {
        self.state.as_ref().map_or(ChildStatus::Stopped, |s| s.status)
    }

    /// Temporary children that terminated are never brought back by sibling restarts.
    pub(crate) fn is_retired(&self) -> bool {
        self.spec.policy() == RestartPolicy::Temporary && self.status() == ChildStatus::Stopped
    }

    pub(crate) fn info(&self) -> ChildInfo {
        let (restarts_in_window, heartbeat_active, generation) = match &self.state {
            Some(s) => (s.restarts.len(), s.heartbeat_armed(), s.generation),
            None => (0, false, 0),
        };
        ChildInfo {
            id: self.spec.id().to_string(),
            status: self.status(),
            policy: self.spec.policy(),
            restarts_in_window,
            heartbeat_active,
            generation,
        }
    }
}

/// Arena of children in declaration order.
pub(crate) struct ChildTable {
    slots: Vec<Slot>,
    index: HashMap<Arc<str>, usize>,
}

impl ChildTable {
    /// Builds the table; a repeated id keeps its first declaration.
    pub(crate) fn new(specs: Vec<ChildSpec>) -> Self {
        let mut slots = Vec::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());
        for spec in specs {
            let id: Arc<str> = spec.id().into();
            if index.contains_key(&id) {
                warn!(child = %id, "duplicate child id ignored");
                continue;
            }
            index.insert(id, slots.len());
            slots.push(Slot { spec, state: None });
        }
        Self { slots, index }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn slot(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// State of the child at `idx`, created on first access.
    pub(crate) fn state_mut(&mut self, idx: usize) -> &mut ChildState {
        self.slots[idx].state.get_or_insert_with(ChildState::default)
    }

    pub(crate) fn existing_mut(&mut self, idx: usize) -> Option<&mut ChildState> {
        self.slots[idx].state.as_mut()
    }

    /// Number of armed heartbeat timers.
    pub(crate) fn active_heartbeats(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.state.as_ref())
            .filter(|s| s.heartbeat_armed())
            .count()
    }
}
