//! # Anti-storm guard for bubbled events.
//!
//! A parent bus keeps one [`BubbleLimiter`] with a 1-second window per child
//! namespace. Once a child exceeds `max_per_second` bubbles inside a window the
//! rest of that window is dropped. The first drop of a window is flagged so the
//! caller can log a single warning.
//!
//! ```text
//! max=3         window #1                     window #2
//! bubble:  1  2  3  4  5  6 ...          │ 1  2 ...
//! verdict: A  A  A  D* D  D              │ A  A
//!                   └─ first drop: warn  │ (counter + warned reset)
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(1);

/// Verdict for one bubble attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Deliver the event.
    Allow,
    /// Drop the event; `first` is `true` only for the first drop in the window.
    Drop { first: bool },
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: usize,
    warned: bool,
}

/// Per-child sliding counters.
#[derive(Debug)]
pub(crate) struct BubbleLimiter {
    max_per_second: usize,
    windows: HashMap<String, Window>,
    dropped: HashMap<String, u64>,
}

impl BubbleLimiter {
    pub(crate) fn new(max_per_second: usize) -> Self {
        Self {
            max_per_second,
            windows: HashMap::new(),
            dropped: HashMap::new(),
        }
    }

    /// Counts one bubble from `namespace` at `now` and returns the verdict.
    pub(crate) fn admit(&mut self, namespace: &str, now: Instant) -> Admission {
        let window = self
            .windows
            .entry(namespace.to_string())
            .or_insert_with(|| Window {
                started: now,
                count: 0,
                warned: false,
            });

        if now.saturating_duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
            window.warned = false;
        }

        window.count += 1;
        if window.count <= self.max_per_second {
            return Admission::Allow;
        }

        *self.dropped.entry(namespace.to_string()).or_insert(0) += 1;
        let first = !window.warned;
        window.warned = true;
        Admission::Drop { first }
    }

    /// Total events dropped for `namespace` since creation.
    pub(crate) fn dropped(&self, namespace: &str) -> u64 {
        self.dropped.get(namespace).copied().unwrap_or(0)
    }
}
