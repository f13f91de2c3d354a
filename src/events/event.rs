//! # Events carried by the [`EventBus`](crate::EventBus).
//!
//! An [`Event`] is `{type, timestamp, sessionId, data}` plus a process-wide
//! sequence number. The payload is an opaque [`serde_json::Value`]; the bus only
//! looks inside it when merging bubble provenance.
//!
//! The [`EventKind`] enum names the lifecycle vocabulary emitted by the
//! [`Supervisor`](crate::Supervisor). Any other string is a valid event type too.
//!
//! ## Provenance
//! ```text
//! object payload:      {"x": 1}  ─► {"x": 1, "_source": "worker-a", "_bubbled": true}
//! non-object payload:  42        ─► {"_value": 42, "_source": "worker-a", "_bubbled": true}
//! already bubbled:     unchanged (provenance is never overwritten on later hops)
//! ```
//!
//! ## Example
//! ```rust
//! use agentvisor::{Event, EventKind};
//! use serde_json::json;
//!
//! let ev = Event::new(EventKind::ChildCrashed.as_str(), "session-1", json!({"child": "db"}));
//! assert_eq!(ev.kind(), Some(EventKind::ChildCrashed));
//! assert!(!ev.is_bubbled());
//!
//! let up = ev.with_provenance("db-pool");
//! assert_eq!(up.source(), Some("db-pool"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Map, Value};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Payload key naming the child namespace an event bubbled from.
pub const SOURCE_KEY: &str = "_source";
/// Payload key marking an event as bubbled.
pub const BUBBLED_KEY: &str = "_bubbled";
/// Payload key wrapping non-object payloads of bubbled events.
pub const VALUE_KEY: &str = "_value";

/// Lifecycle events emitted by a supervisor on its bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `supervisor:start`: the start pass began.
    ///
    /// Sets: `supervisor`
    SupervisorStart,

    /// `supervisor:stop`: shutdown finished.
    ///
    /// Sets: `supervisor`
    SupervisorStop,

    /// `supervisor:child-started`: a factory produced a worker during the start pass.
    ///
    /// Sets: `supervisor`, `child`
    ChildStarted,

    /// `supervisor:child-restarted`: a factory produced a replacement worker.
    ///
    /// Sets: `supervisor`, `child`, `restarts` (restarts within the window)
    ChildRestarted,

    /// `supervisor:child-crashed`: a crash (explicit, factory or heartbeat) was accepted.
    ///
    /// Sets: `supervisor`, `child`, `error`, `reason` (stable label)
    ChildCrashed,

    /// `supervisor:child-stopped`: a child was moved to `stopped`.
    ///
    /// Sets: `supervisor`, `child`
    ChildStopped,

    /// `supervisor:intensity-exceeded`: a child exhausted the restart budget.
    ///
    /// Sets: `supervisor`, `child`, `error`, `max_restarts`, `window_ms`
    IntensityExceeded,
}

impl EventKind {
    /// All lifecycle kinds, in vocabulary order.
    pub const ALL: [EventKind; 7] = [
        EventKind::SupervisorStart,
        EventKind::SupervisorStop,
        EventKind::ChildStarted,
        EventKind::ChildRestarted,
        EventKind::ChildCrashed,
        EventKind::ChildStopped,
        EventKind::IntensityExceeded,
    ];

    /// Returns the wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::SupervisorStart => "supervisor:start",
            EventKind::SupervisorStop => "supervisor:stop",
            EventKind::ChildStarted => "supervisor:child-started",
            EventKind::ChildRestarted => "supervisor:child-restarted",
            EventKind::ChildCrashed => "supervisor:child-crashed",
            EventKind::ChildStopped => "supervisor:child-stopped",
            EventKind::IntensityExceeded => "supervisor:intensity-exceeded",
        }
    }

    /// Maps a wire name back to a lifecycle kind.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

/// Event delivered to bus listeners.
///
/// - `seq`: monotonic global sequence for ordering
/// - `timestamp`: wall-clock milliseconds since the Unix epoch
/// - `session_id`: correlation tag of the emitting bus
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Event type (free-form; see [`EventKind`] for the supervisor vocabulary).
    #[serde(rename = "type")]
    pub event_type: Arc<str>,
    /// Wall-clock timestamp (ms since epoch).
    pub timestamp: u64,
    /// Session id of the bus that stamped the event.
    pub session_id: Arc<str>,
    /// Opaque payload.
    pub data: Value,
}

impl Event {
    /// Creates a new event stamped with the current time and the next sequence number.
    pub fn new(
        event_type: impl Into<Arc<str>>,
        session_id: impl Into<Arc<str>>,
        data: Value,
    ) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            event_type: event_type.into(),
            timestamp: now_millis(),
            session_id: session_id.into(),
            data,
        }
    }

    /// Returns the lifecycle kind if the type belongs to the supervisor vocabulary.
    #[inline]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }

    /// Returns `true` if the event reached this bus by bubbling from a child.
    ///
    /// Provenance is the pair `_bubbled: true` plus a string `_source`; either
    /// key alone is ordinary payload.
    pub fn is_bubbled(&self) -> bool {
        self.source().is_some()
    }

    /// Returns the namespace of the child the event originally bubbled from.
    pub fn source(&self) -> Option<&str> {
        let bubbled = self
            .data
            .get(BUBBLED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !bubbled {
            return None;
        }
        self.data.get(SOURCE_KEY).and_then(Value::as_str)
    }

    /// Reads a string field from an object payload.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Returns the event tagged as bubbled from `namespace`.
    ///
    /// Object payloads get `_source`/`_bubbled` merged in; any other payload is
    /// wrapped as `{_value, _source, _bubbled}`. An event that already carries
    /// provenance is returned unchanged.
    pub fn with_provenance(mut self, namespace: &str) -> Self {
        if self.is_bubbled() {
            return self;
        }
        let mut map = match self.data {
            Value::Object(map) => map,
            other => {
                let mut map = Map::with_capacity(3);
                map.insert(VALUE_KEY.to_string(), other);
                map
            }
        };
        map.insert(SOURCE_KEY.to_string(), Value::String(namespace.to_string()));
        map.insert(BUBBLED_KEY.to_string(), Value::Bool(true));
        self.data = Value::Object(map);
        self
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}
