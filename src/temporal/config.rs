//! Configuration for temporal inference.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::config::{ConfigError, ensure_unit};

use super::policy::TransitionPolicy;

/// Configuration for the temporal inference engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// Year of the modern baseline extract, used when the baseline source
    /// declares none.
    /// Default: 2024
    #[serde(default = "defaults::baseline_year")]
    pub baseline_year: i32,

    /// Placement of appearance/disappearance years between observations.
    /// Default: midpoint
    #[serde(default)]
    pub transition_policy: TransitionPolicy,

    /// Minimum detection confidence for a presence confirmation.
    /// Default: 0.5
    #[serde(default = "defaults::min_detection_confidence")]
    pub min_detection_confidence: f64,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            baseline_year: defaults::baseline_year(),
            transition_policy: TransitionPolicy::default(),
            min_detection_confidence: defaults::min_detection_confidence(),
        }
    }
}

impl TemporalConfig {
    /// Builder-style setter for the baseline year.
    pub fn with_baseline_year(mut self, year: i32) -> Self {
        self.baseline_year = year;
        self
    }

    /// Builder-style setter for the transition policy.
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_unit(
            "temporal.min_detection_confidence",
            self.min_detection_confidence,
        )
    }
}
