//! Wealth tiers derived from net worth.
//!
//! The ladder is fixed and non-overlapping: each level owns the half-open
//! range `[threshold, next.threshold)`, and `Perpetual` is unbounded above.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Level {
    #[default]
    Architect,
    Accumulator,
    Optimizer,
    Autonomy,
    Perpetual,
}

impl Level {
    /// All tiers in ascending order.
    pub const ALL: [Level; 5] = [
        Level::Architect,
        Level::Accumulator,
        Level::Optimizer,
        Level::Autonomy,
        Level::Perpetual,
    ];

    /// Net worth at which this tier begins.
    pub fn threshold(self) -> u64 {
        match self {
            Level::Architect => 0,
            Level::Accumulator => 10_000_000,
            Level::Optimizer => 50_000_000,
            Level::Autonomy => 250_000_000,
            Level::Perpetual => 1_000_000_000,
        }
    }

    /// The following tier, `None` at the top of the ladder.
    pub fn next(self) -> Option<Level> {
        match self {
            Level::Architect => Some(Level::Accumulator),
            Level::Accumulator => Some(Level::Optimizer),
            Level::Optimizer => Some(Level::Autonomy),
            Level::Autonomy => Some(Level::Perpetual),
            Level::Perpetual => None,
        }
    }

    /// The unique tier whose range contains `net_worth`.
    pub fn for_net_worth(net_worth: u64) -> Level {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| net_worth >= level.threshold())
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Architect => "Architect",
            Level::Accumulator => "Accumulator",
            Level::Optimizer => "Optimizer",
            Level::Autonomy => "Autonomy",
            Level::Perpetual => "Perpetual",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownName {
                kind: "level",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ladder_scenarios() {
        assert_eq!(Level::for_net_worth(5_000_000), Level::Architect);
        assert_eq!(Level::for_net_worth(75_000_000), Level::Optimizer);
        assert_eq!(Level::for_net_worth(1_000_000_000), Level::Perpetual);
    }

    #[test]
    fn boundaries_belong_to_upper_tier() {
        assert_eq!(Level::for_net_worth(0), Level::Architect);
        assert_eq!(Level::for_net_worth(9_999_999), Level::Architect);
        assert_eq!(Level::for_net_worth(10_000_000), Level::Accumulator);
        assert_eq!(Level::for_net_worth(49_999_999), Level::Accumulator);
        assert_eq!(Level::for_net_worth(50_000_000), Level::Optimizer);
        assert_eq!(Level::for_net_worth(249_999_999), Level::Optimizer);
        assert_eq!(Level::for_net_worth(250_000_000), Level::Autonomy);
        assert_eq!(Level::for_net_worth(999_999_999), Level::Autonomy);
        assert_eq!(Level::for_net_worth(u64::MAX), Level::Perpetual);
    }

    #[test]
    fn thresholds_strictly_increase() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0].threshold() < pair[1].threshold());
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Level::Perpetual.next(), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("optimizer".parse::<Level>().unwrap(), Level::Optimizer);
        assert_eq!(" PERPETUAL ".parse::<Level>().unwrap(), Level::Perpetual);
        assert!("tycoon".parse::<Level>().is_err());
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Level::for_net_worth(lo) <= Level::for_net_worth(hi));
        }

        #[test]
        fn net_worth_falls_inside_its_tier_range(n in any::<u64>()) {
            let level = Level::for_net_worth(n);
            prop_assert!(n >= level.threshold());
            if let Some(next) = level.next() {
                prop_assert!(n < next.threshold());
            }
        }
    }
}
