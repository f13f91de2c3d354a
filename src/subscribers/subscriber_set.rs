//! # Non-blocking fan-out from a bus node to async subscribers.
//!
//! [`SubscriberSet::attach`] registers one wildcard listener on an
//! [`EventBus`] and forwards every event it sees (local and bubbled) to a
//! bounded queue per subscriber.
//!
//! ```text
//! bus.emit(..) ──► wildcard listener ──try_send──► [queue 1] ──► task 1 ──► sub1.on_event()
//!                                     ├─────────► [queue 2] ──► task 2 ──► sub2.on_event()
//!                                     └─────────► [queue N] ──► task N ──► subN.on_event()
//! ```
//!
//! ## Rules
//! - **Non-blocking**: the listener uses `try_send`; a full queue drops the event
//!   for that subscriber only (warn + counter).
//! - **Per-subscriber FIFO**, no ordering across subscribers.
//! - **Panic isolation**: a panicking `on_event` is logged; the task keeps going.
//! - [`SubscriberSet::shutdown`] detaches the listener and drains every queue.
//!
//! `AssertUnwindSafe` is used, so a subscriber that panics while holding a lock
//! may leave its own state inconsistent.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::error::BusError;
use crate::events::{Event, EventBus, ListenerId, WILDCARD};
use crate::subscribers::Subscribe;

/// Per-subscriber queue endpoint.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
    dropped: AtomicU64,
}

impl SubscriberChannel {
    fn offer(&self, event: &Arc<Event>) {
        match self.sender.try_send(Arc::clone(event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(subscriber = self.name, event = %event.event_type, dropped = total, "subscriber queue full; event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Async subscribers attached to one bus node.
pub struct SubscriberSet {
    bus: Arc<EventBus>,
    listener: ListenerId,
    channels: Arc<Vec<SubscriberChannel>>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Spawns one task per subscriber and starts forwarding events from `bus`.
    ///
    /// Must be called inside a Tokio runtime. Fails only if the bus refuses
    /// another wildcard listener.
    pub fn attach(bus: &Arc<EventBus>, subs: Vec<Arc<dyn Subscribe>>) -> Result<Self, BusError> {
        let mut channels = Vec::with_capacity(subs.len());
        let mut receivers = Vec::with_capacity(subs.len());
        for sub in &subs {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            channels.push(SubscriberChannel {
                name: sub.name(),
                sender: tx,
                dropped: AtomicU64::new(0),
            });
            receivers.push(rx);
        }
        let channels = Arc::new(channels);

        let fanout = Arc::clone(&channels);
        let listener = bus.on(WILDCARD, move |ev| {
            let ev = Arc::new(ev.clone());
            for channel in fanout.iter() {
                channel.offer(&ev);
            }
        })?;

        let workers = subs
            .into_iter()
            .zip(receivers)
            .map(|(sub, rx)| tokio::spawn(drive(sub, rx)))
            .collect();

        Ok(Self {
            bus: Arc::clone(bus),
            listener,
            channels,
            workers,
        })
    }

    /// Number of attached subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Events dropped so far for the subscriber named `name`.
    pub fn dropped(&self, name: &str) -> u64 {
        self.channels
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.dropped.load(Ordering::Relaxed))
            .sum()
    }

    /// Detaches from the bus, then waits until every queued event was handled.
    pub async fn shutdown(mut self) {
        self.bus.off(self.listener);
        self.channels = Arc::new(Vec::new());

        for h in std::mem::take(&mut self.workers) {
            let _ = h.await;
        }
    }
}

impl Drop for SubscriberSet {
    /// Frees the listener slot; workers exit once their queues drain.
    fn drop(&mut self) {
        self.bus.off(self.listener);
    }
}

async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>) {
    while let Some(ev) = rx.recv().await {
        if let Err(panic_err) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            warn!(subscriber = sub.name(), event = %ev.event_type, panic = %info, "subscriber panicked");
        }
    }
}
