//! Engine configuration.
//!
//! Typically built in code by the application crate, or deserialized from a
//! config file with the `serde` feature, and passed to the driver builder.

use std::fmt;
use std::str::FromStr;

use crate::TwError;

// ── DrainPolicy ───────────────────────────────────────────────────────────────

/// What the scheduler does with an action registered for the current tick
/// while that tick's bucket is already being drained.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DrainPolicy {
    /// Keep draining the current tick's bucket until it stays empty, so
    /// same-tick insertions still run before the tick ends.
    #[default]
    UntilEmpty,
    /// Redirect same-tick insertions made mid-drain to the next tick.
    DeferToNext,
}

impl fmt::Display for DrainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DrainPolicy::UntilEmpty  => "until_empty",
            DrainPolicy::DeferToNext => "defer_to_next",
        })
    }
}

impl FromStr for DrainPolicy {
    type Err = TwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "until_empty"   => Ok(DrainPolicy::UntilEmpty),
            "defer_to_next" => Ok(DrainPolicy::DeferToNext),
            other => Err(TwError::Parse(format!("unknown drain policy {other:?}"))),
        }
    }
}

// ── RunOrder ──────────────────────────────────────────────────────────────────

/// Order in which owned agents run within a tick.
///
/// Agents are sorted by their rank (unranked agents count as rank 0); ties
/// keep the order in which the host listed the agents.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunOrder {
    /// Highest rank first.
    #[default]
    RankDescending,
    /// Lowest rank first.
    RankAscending,
    /// Host order, ranks ignored.
    HostOrder,
}

impl fmt::Display for RunOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunOrder::RankDescending => "rank_descending",
            RunOrder::RankAscending  => "rank_ascending",
            RunOrder::HostOrder      => "host_order",
        })
    }
}

impl FromStr for RunOrder {
    type Err = TwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rank_descending" => Ok(RunOrder::RankDescending),
            "rank_ascending"  => Ok(RunOrder::RankAscending),
            "host_order"      => Ok(RunOrder::HostOrder),
            other => Err(TwError::Parse(format!("unknown run order {other:?}"))),
        }
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Same-tick insertion policy for the scheduler.
    pub drain_policy: DrainPolicy,

    /// Per-tick controller run order.
    pub run_order: RunOrder,
}

impl EngineConfig {
    /// Build a config from `key=value` pairs, e.g. taken from the command
    /// line: `drain_policy=defer_to_next`.  Unknown keys are an error.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, TwError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = EngineConfig::default();
        for (key, value) in pairs {
            match key.trim() {
                "drain_policy" => config.drain_policy = value.trim().parse()?,
                "run_order"    => config.run_order = value.trim().parse()?,
                other => {
                    return Err(TwError::Config(format!("unknown config key {other:?}")));
                }
            }
        }
        Ok(config)
    }
}
