//! Restart policies, strategies and intensity budgets.
//!
//! This module groups the knobs that control **if** a crashed child is
//! restarted, **which siblings** go with it, and **how often** restarts are
//! tolerated before the supervisor gives up.
//!
//! ## Contents
//! - [`RestartPolicy`] per-child: permanent / transient / temporary
//! - [`RestartStrategy`] per-supervisor: one-for-one / one-for-all / rest-for-one
//! - [`RestartIntensity`] per-supervisor budget, tracked per child by [`RestartWindow`]
//!
//! ## Quick wiring
//! ```text
//! ChildSpec { policy: RestartPolicy, .. }
//! SupervisorConfig { strategy: RestartStrategy, intensity: RestartIntensity, .. }
//!      └─► core::supervisor uses:
//!           - policy.allows_restart() to decide stop vs restart
//!           - window.is_exhausted(now, &intensity) to decide escalate vs restart
//!           - strategy.affected(idx, len) to pick the siblings to restart
//! ```

mod intensity;
mod restart;
mod strategy;

pub use intensity::{RestartIntensity, RestartWindow};
pub use restart::RestartPolicy;
pub use strategy::RestartStrategy;
