//! Transition-year estimation between two observations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How to place a change that happened between two observation years.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Halfway between the two observations
    #[default]
    Midpoint,
    /// As late as the evidence allows for appearance, as early for disappearance
    LastObserved,
    /// Right after the earlier observation, or at the later one
    FirstObserved,
}

impl TransitionPolicy {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Midpoint => "midpoint",
            TransitionPolicy::LastObserved => "last_observed",
            TransitionPolicy::FirstObserved => "first_observed",
        }
    }

    /// End year for an object seen in `last_present` and gone by `first_absent`.
    ///
    /// - `midpoint`: `(a + b) / 2`, rounded down
    /// - `last_observed`: `a`
    /// - `first_observed`: `b`
    pub fn disappearance(&self, last_present: i32, first_absent: i32) -> i32 {
        let (a, b) = ordered(last_present, first_absent);
        match self {
            TransitionPolicy::Midpoint => midpoint(a, b),
            TransitionPolicy::LastObserved => a,
            TransitionPolicy::FirstObserved => b,
        }
    }

    /// Start year for an object absent in `last_absent` and seen by `first_present`.
    ///
    /// - `midpoint`: `(a + b) / 2`, never earlier than `a + 1`
    /// - `last_observed`: `b`
    /// - `first_observed`: `a + 1`
    ///
    /// The result always postdates the absence unless the years coincide.
    pub fn appearance(&self, last_absent: i32, first_present: i32) -> i32 {
        let (a, b) = ordered(last_absent, first_present);
        if a == b {
            return b;
        }
        match self {
            TransitionPolicy::Midpoint => midpoint(a, b).max(a + 1),
            TransitionPolicy::LastObserved => b,
            TransitionPolicy::FirstObserved => a + 1,
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn midpoint(a: i32, b: i32) -> i32 {
    (a + (b - a) / 2).min(b)
}
