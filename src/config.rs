//! # Construction-time configuration.
//!
//! Provides [`SupervisorConfig`] and [`BusConfig`]. Both are plain data with
//! sensible defaults and `serde` support, so hosts can load them from JSON/YAML.
//! They are fixed at construction time; nothing reads them mutably afterwards.
//!
//! ## Sentinel values
//! - `shutdown_timeout_ms = 0` → wait indefinitely for an in-flight restart during shutdown
//! - `max_listeners_per_event = 0` → treated as 1 (a topic always accepts one listener)

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policies::{RestartIntensity, RestartStrategy};

/// Supervisor configuration.
///
/// ## Field semantics
/// - `strategy`: which siblings restart with a crashed child
/// - `intensity`: restart budget per child (`max_restarts` within `window_ms`)
/// - `shutdown_timeout_ms`: advisory wait for an in-flight factory call before
///   shutdown proceeds anyway; the factory itself is never aborted
///
/// ## Example
/// ```rust
/// use agentvisor::{RestartStrategy, SupervisorConfig};
///
/// let cfg: SupervisorConfig = serde_json::from_str(
///     r#"{"strategy":"rest-for-one","intensity":{"max_restarts":5,"window_ms":1000}}"#,
/// ).unwrap();
/// assert_eq!(cfg.strategy, RestartStrategy::RestForOne);
/// assert_eq!(cfg.shutdown_timeout_ms, 5_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Restart strategy.
    pub strategy: RestartStrategy,

    /// Restart budget applied to every child.
    pub intensity: RestartIntensity,

    /// Advisory shutdown timeout in milliseconds.
    pub shutdown_timeout_ms: u64,
}

impl SupervisorConfig {
    /// Returns the shutdown timeout as an `Option`.
    ///
    /// - `None` → no limit
    /// - `Some(d)` → wait at most `d` for in-flight crash handling
    #[inline]
    pub fn shutdown_timeout(&self) -> Option<Duration> {
        if self.shutdown_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.shutdown_timeout_ms))
        }
    }

    /// Returns a copy with the given strategy.
    pub fn with_strategy(mut self, strategy: RestartStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns a copy with the given intensity.
    pub fn with_intensity(mut self, max_restarts: usize, window_ms: u64) -> Self {
        self.intensity = RestartIntensity::new(max_restarts, window_ms);
        self
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `strategy = OneForOne`
    /// - `intensity = 3 restarts / 5000ms`
    /// - `shutdown_timeout_ms = 5000`
    fn default() -> Self {
        Self {
            strategy: RestartStrategy::default(),
            intensity: RestartIntensity::default(),
            shutdown_timeout_ms: 5_000,
        }
    }
}

/// Event bus configuration, inherited by child buses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum listeners per topic (event type, wildcard, or child namespace).
    pub max_listeners_per_event: usize,

    /// Maximum events bubbled from one child per 1-second window.
    pub max_bubbles_per_second: usize,
}

impl BusConfig {
    /// Returns the listener cap clamped to a minimum of 1.
    #[inline]
    pub fn listener_cap(&self) -> usize {
        self.max_listeners_per_event.max(1)
    }
}

impl Default for BusConfig {
    /// 100 listeners per topic, 100 bubbles per child per second.
    fn default() -> Self {
        Self {
            max_listeners_per_event: 100,
            max_bubbles_per_second: 100,
        }
    }
}
