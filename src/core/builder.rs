use std::sync::{Arc, Mutex, Weak};

use tokio_util::sync::CancellationToken;

use super::{child::ChildTable, supervisable::Supervisable, supervisor::Supervisor};
use crate::{
    config::{BusConfig, SupervisorConfig},
    events::EventBus,
    workers::ChildSpec,
};

/// Builder for constructing a Supervisor with optional features.
pub struct SupervisorBuilder {
    id: Arc<str>,
    cfg: SupervisorConfig,
    children: Vec<ChildSpec>,
    bus: Option<Arc<EventBus>>,
    parent: Option<Weak<dyn Supervisable>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given id and configuration.
    pub fn new(id: impl Into<Arc<str>>, cfg: SupervisorConfig) -> Self {
        Self {
            id: id.into(),
            cfg,
            children: Vec::new(),
            bus: None,
            parent: None,
        }
    }

    /// Appends a child; declaration order is start order.
    pub fn with_child(mut self, spec: ChildSpec) -> Self {
        self.children.push(spec);
        self
    }

    /// Appends several children in order.
    pub fn with_children(mut self, specs: impl IntoIterator<Item = ChildSpec>) -> Self {
        self.children.extend(specs);
        self
    }

    /// Emits lifecycle events on `bus` instead of a private root bus.
    ///
    /// Pass a child of an ancestor's bus to get centralized observability:
    /// lifecycle events then bubble up tagged with the bus namespace.
    pub fn with_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Sets the parent that receives escalations.
    ///
    /// Only a weak reference is kept; if the parent is gone when the budget
    /// runs out, the child's degraded fallback runs instead.
    pub fn with_parent<S: Supervisable>(mut self, parent: &Arc<S>) -> Self {
        let weak = Arc::downgrade(parent);
        self.parent = Some(weak as Weak<dyn Supervisable>);
        self
    }

    /// Same as [`with_parent`](Self::with_parent) for an already type-erased handle.
    pub fn with_parent_weak(mut self, parent: Weak<dyn Supervisable>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builds and returns the Supervisor instance.
    ///
    /// Nothing is started; call [`Supervisor::start`].
    pub fn build(self) -> Arc<Supervisor> {
        let bus = self
            .bus
            .unwrap_or_else(|| EventBus::new(self.id.clone(), BusConfig::default()));
        let table = ChildTable::new(self.children);

        Arc::new_cyclic(|me| Supervisor {
            id: self.id,
            cfg: self.cfg,
            bus,
            parent: self.parent,
            table: Mutex::new(table),
            flow: tokio::sync::Mutex::new(()),
            runtime_token: Mutex::new(CancellationToken::new()),
            me: me.clone(),
        })
    }
}
