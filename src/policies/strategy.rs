//! # Restart strategies.
//!
//! [`RestartStrategy`] decides which siblings are restarted when one child crashes.
//!
//! ```text
//! children: [a, b, c, d]      b crashes
//!
//! OneForOne   ─► restart b
//! OneForAll   ─► stop a b c d ─► restart a b c d   (declaration order)
//! RestForOne  ─► stop b c d   ─► restart b c d     (a is never touched)
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which siblings get restarted alongside a crashed child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartStrategy {
    /// Restart only the crashed child (default).
    OneForOne,
    /// Stop every child, then restart all of them in declaration order.
    OneForAll,
    /// Stop the crashed child and every child declared after it, then restart that tail in order.
    RestForOne,
}

impl RestartStrategy {
    /// Returns the indexes (into the declaration list of `len` children) affected
    /// by a crash of the child at `crashed`.
    pub fn affected(self, crashed: usize, len: usize) -> std::ops::Range<usize> {
        match self {
            RestartStrategy::OneForOne => crashed..(crashed + 1).min(len),
            RestartStrategy::OneForAll => 0..len,
            RestartStrategy::RestForOne => crashed.min(len)..len,
        }
    }

    /// Returns the configuration name of the strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            RestartStrategy::OneForOne => "one-for-one",
            RestartStrategy::OneForAll => "one-for-all",
            RestartStrategy::RestForOne => "rest-for-one",
        }
    }
}

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy::OneForOne
    }
}

impl fmt::Display for RestartStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestartStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-for-one" => Ok(RestartStrategy::OneForOne),
            "one-for-all" => Ok(RestartStrategy::OneForAll),
            "rest-for-one" => Ok(RestartStrategy::RestForOne),
            other => Err(format!("unknown restart strategy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affected_ranges() {
        assert_eq!(RestartStrategy::OneForOne.affected(1, 3), 1..2);
        assert_eq!(RestartStrategy::OneForAll.affected(1, 3), 0..3);
        assert_eq!(RestartStrategy::RestForOne.affected(1, 3), 1..3);
        assert_eq!(RestartStrategy::RestForOne.affected(2, 3), 2..3);
    }

    #[test]
    fn serde_uses_kebab_case() {
        let s: RestartStrategy = serde_json::from_str("\"rest-for-one\"").unwrap();
        assert_eq!(s, RestartStrategy::RestForOne);
        assert_eq!(
            serde_json::to_string(&RestartStrategy::OneForAll).unwrap(),
            "\"one-for-all\""
        );
        assert_eq!("one-for-one".parse(), Ok(RestartStrategy::OneForOne));
    }
}
