//! # Restart policies for supervised children.
//!
//! [`RestartPolicy`] determines whether a crashed child is eligible for restart.
//!
//! - [`RestartPolicy::Permanent`] the child is always restarted (within the intensity budget).
//! - [`RestartPolicy::Transient`] the child is restarted after a crash (within the intensity budget).
//! - [`RestartPolicy::Temporary`] the child is never restarted; a crash stops it for good.
//!
//! ## Permanent vs transient
//! Crash reports carry no notion of a "normal" exit, so `Permanent` and
//! `Transient` behave identically. The distinction is kept for configuration
//! compatibility:
//! ```text
//! Permanent  ─► crash ─► restart (budget permitting)
//! Transient  ─► crash ─► restart (budget permitting)
//! Temporary  ─► crash ─► stopped, never restarted
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Policy controlling whether a child is restarted after it crashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Always restart (default).
    Permanent,
    /// Restart after a crash. Currently identical to `Permanent`.
    Transient,
    /// Never restart: the first crash stops the child permanently.
    Temporary,
}

impl RestartPolicy {
    /// Returns `true` if a crashed child with this policy may be restarted.
    #[inline]
    pub fn allows_restart(self) -> bool {
        !matches!(self, RestartPolicy::Temporary)
    }

    /// Returns the configuration name of the policy.
    pub fn as_str(self) -> &'static str {
        match self {
            RestartPolicy::Permanent => "permanent",
            RestartPolicy::Transient => "transient",
            RestartPolicy::Temporary => "temporary",
        }
    }
}

impl Default for RestartPolicy {
    /// Returns [`RestartPolicy::Permanent`].
    fn default() -> Self {
        RestartPolicy::Permanent
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permanent" => Ok(RestartPolicy::Permanent),
            "transient" => Ok(RestartPolicy::Transient),
            "temporary" => Ok(RestartPolicy::Temporary),
            other => Err(format!("unknown restart policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_temporary_forbids_restart() {
        assert!(RestartPolicy::Permanent.allows_restart());
        assert!(RestartPolicy::Transient.allows_restart());
        assert!(!RestartPolicy::Temporary.allows_restart());
    }

    #[test]
    fn parses_configuration_names() {
        for p in [
            RestartPolicy::Permanent,
            RestartPolicy::Transient,
            RestartPolicy::Temporary,
        ] {
            assert_eq!(p.as_str().parse::<RestartPolicy>(), Ok(p));
        }
        assert!("sometimes".parse::<RestartPolicy>().is_err());
    }
}
