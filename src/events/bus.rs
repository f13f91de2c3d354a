//! # Hierarchical event bus.
//!
//! [`EventBus`] is a per-node pub/sub hub. Nodes form a tree: a child created via
//! [`EventBus::create_child`] bubbles every event it emits up to its ancestors,
//! and a node can [`broadcast`](EventBus::broadcast) down to all descendants.
//!
//! ## Architecture
//! ```text
//!                    root ("session-1")
//!                   ▲    │ broadcast (capture pass, no bubbling)
//!         bubble    │    ▼
//!              ┌────┴─────────┐
//!           "planner"      "executor"
//!              ▲
//!              │ emit("tick") ─► local listeners ─► parent.receive_from_child("planner")
//!                                                     ├─ limiter.admit("planner")  (anti-storm)
//!                                                     ├─ derive: data + {_source, _bubbled}
//!                                                     ├─ local listeners + on_namespaced("planner")
//!                                                     └─ bubble further (provenance unchanged)
//! ```
//!
//! ## Rules
//! - **Synchronous dispatch**: typed listeners first, then wildcard (`*`), each in registration order.
//! - **Listener cap**: `on`/`on_namespaced` fail fast with [`BusError::ListenerLimit`].
//! - **Idempotent off**: removing an unknown/removed listener is a no-op returning `false`.
//! - **Unique namespaces** per parent; [`BusError::NamespaceTaken`] otherwise.
//! - **Panic isolation**: a panicking listener is logged and skipped; the rest still run.
//! - **No lock is held** while listeners run, so listeners may emit or (un)subscribe.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use agentvisor::{BusConfig, EventBus};
//! use serde_json::json;
//!
//! let root = EventBus::new("session-1", BusConfig::default());
//! let child = root.create_child("planner").unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! root.on("tick", move |ev| sink.lock().unwrap().push(ev.source().map(str::to_owned)))
//!     .unwrap();
//!
//! child.emit("tick", json!({"n": 1}));
//! assert_eq!(*seen.lock().unwrap(), vec![Some("planner".to_string())]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde_json::Value;
use tokio::time::Instant;
use tracing::warn;

use super::event::Event;
use super::limiter::{Admission, BubbleLimiter};
use crate::config::BusConfig;
use crate::error::BusError;

/// Topic name matching every event type.
pub const WILDCARD: &str = "*";

/// Listener callback.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// Handle returned by [`EventBus::on`] / [`EventBus::on_namespaced`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Topic {
    Event(String),
    Any,
    Namespace(String),
}

impl Topic {
    fn parse(name: &str) -> Self {
        if name == WILDCARD {
            Topic::Any
        } else {
            Topic::Event(name.to_string())
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Event(name) => f.write_str(name),
            Topic::Any => f.write_str(WILDCARD),
            Topic::Namespace(ns) => write!(f, "ns:{ns}"),
        }
    }
}

#[derive(Default)]
struct Listeners {
    by_topic: HashMap<Topic, Vec<(ListenerId, Handler)>>,
    index: HashMap<ListenerId, Topic>,
}

/// One node of the event tree.
pub struct EventBus {
    session_id: Arc<str>,
    namespace: Option<Arc<str>>,
    cfg: BusConfig,
    listeners: RwLock<Listeners>,
    parent: Option<Weak<EventBus>>,
    children: RwLock<Vec<(Arc<str>, Arc<EventBus>)>>,
    limiter: Mutex<BubbleLimiter>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates a root bus.
    pub fn new(session_id: impl Into<Arc<str>>, cfg: BusConfig) -> Arc<Self> {
        Arc::new(Self::node(session_id.into(), None, None, cfg))
    }

    fn node(
        session_id: Arc<str>,
        namespace: Option<Arc<str>>,
        parent: Option<Weak<EventBus>>,
        cfg: BusConfig,
    ) -> Self {
        Self {
            session_id,
            namespace,
            cfg,
            listeners: RwLock::new(Listeners::default()),
            parent,
            children: RwLock::new(Vec::new()),
            limiter: Mutex::new(BubbleLimiter::new(cfg.max_bubbles_per_second)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Session id stamped on every event emitted by this node.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Namespace under which this node is registered on its parent (`None` for a root).
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Configuration of this node.
    pub fn config(&self) -> BusConfig {
        self.cfg
    }

    /// Subscribes `handler` to an event type, or to every type with [`WILDCARD`].
    pub fn on<F>(&self, topic: &str, handler: F) -> Result<ListenerId, BusError>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(Topic::parse(topic), Arc::new(handler))
    }

    /// Subscribes `handler` to every event that bubbled from (or through) the
    /// direct child registered as `namespace`, regardless of type.
    pub fn on_namespaced<F>(&self, namespace: &str, handler: F) -> Result<ListenerId, BusError>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(Topic::Namespace(namespace.to_string()), Arc::new(handler))
    }

    fn subscribe(&self, topic: Topic, handler: Handler) -> Result<ListenerId, BusError> {
        let mut ls = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let limit = self.cfg.listener_cap();
        let current = ls.by_topic.get(&topic).map_or(0, Vec::len);
        if current >= limit {
            return Err(BusError::ListenerLimit {
                topic: topic.to_string(),
                limit,
            });
        }

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        ls.by_topic
            .entry(topic.clone())
            .or_default()
            .push((id, handler));
        ls.index.insert(id, topic);
        Ok(id)
    }

    /// Removes a listener. Returns `false` if it was already removed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut ls = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let Some(topic) = ls.index.remove(&id) else {
            return false;
        };
        if let Some(list) = ls.by_topic.get_mut(&topic) {
            list.retain(|(lid, _)| *lid != id);
            if list.is_empty() {
                ls.by_topic.remove(&topic);
            }
        }
        true
    }

    /// Number of listeners registered for `topic` (`*` for wildcard).
    pub fn listener_count(&self, topic: &str) -> usize {
        let ls = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        ls.by_topic.get(&Topic::parse(topic)).map_or(0, Vec::len)
    }

    /// Emits an event: local dispatch, then bubbling to the parent (if any).
    ///
    /// Returns the stamped event.
    pub fn emit(&self, event_type: &str, data: impl Into<Value>) -> Event {
        let ev = Event::new(event_type, self.session_id.clone(), data.into());
        self.dispatch_local(&ev);
        self.bubble(&ev);
        ev
    }

    /// Delivers an event to every descendant's local listeners, depth-first.
    ///
    /// This node's own listeners are not invoked and nothing bubbles back up.
    pub fn broadcast(&self, event_type: &str, data: impl Into<Value>) {
        let ev = Event::new(event_type, self.session_id.clone(), data.into());
        for child in self.child_nodes() {
            child.capture(&ev);
        }
    }

    fn capture(&self, ev: &Event) {
        self.dispatch_local(ev);
        for child in self.child_nodes() {
            child.capture(ev);
        }
    }

    /// Creates a child bus registered under `namespace`.
    ///
    /// The child inherits this node's session id and configuration.
    pub fn create_child(
        self: &Arc<Self>,
        namespace: impl Into<String>,
    ) -> Result<Arc<EventBus>, BusError> {
        let namespace: Arc<str> = namespace.into().into();
        let mut children = self.children.write().unwrap_or_else(PoisonError::into_inner);
        if children.iter().any(|(ns, _)| *ns == namespace) {
            return Err(BusError::NamespaceTaken {
                namespace: namespace.to_string(),
            });
        }

        let child = Arc::new(Self::node(
            self.session_id.clone(),
            Some(namespace.clone()),
            Some(Arc::downgrade(self)),
            self.cfg,
        ));
        children.push((namespace, child.clone()));
        Ok(child)
    }

    /// Returns the direct child registered as `namespace`.
    pub fn child(&self, namespace: &str) -> Option<Arc<EventBus>> {
        let children = self.children.read().unwrap_or_else(PoisonError::into_inner);
        children
            .iter()
            .find(|(ns, _)| &**ns == namespace)
            .map(|(_, c)| c.clone())
    }

    /// Namespaces of direct children, in creation order.
    pub fn namespaces(&self) -> Vec<String> {
        let children = self.children.read().unwrap_or_else(PoisonError::into_inner);
        children.iter().map(|(ns, _)| ns.to_string()).collect()
    }

    /// Bubbled events dropped from child `namespace` by the anti-storm guard.
    pub fn dropped_bubbles(&self, namespace: &str) -> u64 {
        self.limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dropped(namespace)
    }

    fn child_nodes(&self) -> Vec<Arc<EventBus>> {
        let children = self.children.read().unwrap_or_else(PoisonError::into_inner);
        children.iter().map(|(_, c)| c.clone()).collect()
    }

    fn bubble(&self, ev: &Event) {
        let (Some(parent), Some(ns)) = (self.parent.as_ref().and_then(Weak::upgrade), &self.namespace)
        else {
            return;
        };
        parent.receive_from_child(ns, ev);
    }

    fn receive_from_child(&self, namespace: &str, ev: &Event) {
        let verdict = self
            .limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .admit(namespace, Instant::now());

        if let Admission::Drop { first } = verdict {
            if first {
                warn!(
                    namespace,
                    limit = self.cfg.max_bubbles_per_second,
                    event_type = %ev.event_type,
                    "bubble rate exceeded; dropping events from child for the rest of the window"
                );
            }
            return;
        }

        let derived = ev.clone().with_provenance(namespace);
        self.dispatch_local(&derived);
        self.dispatch_topic(&Topic::Namespace(namespace.to_string()), &derived);
        self.bubble(&derived);
    }

    fn dispatch_local(&self, ev: &Event) {
        self.dispatch_topic(&Topic::Event(ev.event_type.to_string()), ev);
        self.dispatch_topic(&Topic::Any, ev);
    }

    fn dispatch_topic(&self, topic: &Topic, ev: &Event) {
        let handlers: Vec<Handler> = {
            let ls = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            match ls.by_topic.get(topic) {
                Some(list) => list.iter().map(|(_, h)| h.clone()).collect(),
                None => return,
            }
        };

        for h in handlers {
            if panic::catch_unwind(AssertUnwindSafe(|| h(ev))).is_err() {
                warn!(topic = %topic, event_type = %ev.event_type, "event listener panicked");
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("session_id", &self.session_id)
            .field("namespace", &self.namespace)
            .field("children", &self.namespaces())
            .finish_non_exhaustive()
    }
}
