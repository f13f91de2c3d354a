//! # Restart intensity: bounded restarts within a sliding window.
//!
//! [`RestartIntensity`] caps how many restarts a child may consume within
//! `window_ms`. [`RestartWindow`] holds the per-child timestamps.
//!
//! ## Rules
//! - Timestamps older than the window are **pruned** before each check.
//! - A crash is allowed a restart only while `pruned_len < max_restarts`.
//! - The window is time-ordered; pruning pops from the front.
//!
//! ```text
//! max_restarts=2, window=1000ms
//!
//! t=0     crash ─► [0]          restart
//! t=300   crash ─► [0,300]      restart
//! t=600   crash ─► len=2 ≥ 2    exhausted (escalate / fallback)
//! t=1400  crash ─► prune → [ ]  restart
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Maximum restarts tolerated within a sliding window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartIntensity {
    /// Restarts allowed within the window.
    pub max_restarts: usize,
    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl RestartIntensity {
    /// Creates a new intensity budget.
    pub fn new(max_restarts: usize, window_ms: u64) -> Self {
        Self {
            max_restarts,
            window_ms,
        }
    }

    /// Returns the window as a [`Duration`].
    #[inline]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for RestartIntensity {
    /// Three restarts per five seconds.
    fn default() -> Self {
        Self {
            max_restarts: 3,
            window_ms: 5_000,
        }
    }
}

/// Time-ordered restart timestamps of one child.
#[derive(Debug, Default, Clone)]
pub struct RestartWindow {
    stamps: VecDeque<Instant>,
}

impl RestartWindow {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops timestamps that fall outside `window` relative to `now`.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(front) = self.stamps.front() {
            if now.saturating_duration_since(*front) > window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Prunes, then reports whether the budget is exhausted.
    pub fn is_exhausted(&mut self, now: Instant, intensity: &RestartIntensity) -> bool {
        self.prune(now, intensity.window());
        self.stamps.len() >= intensity.max_restarts
    }

    /// Records a restart at `now`.
    pub fn record(&mut self, now: Instant) {
        self.stamps.push_back(now);
    }

    /// Number of timestamps currently held (as of the last prune).
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}
