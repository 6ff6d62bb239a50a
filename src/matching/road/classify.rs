//! Road change classification from shape metrics.

use serde::{Deserialize, Serialize};

use crate::core::RoadChange;
use crate::matching::config::RoadMatchConfig;
use crate::matching::types::MatchConfidence;

/// Shape comparison of two road polylines.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadComparison {
    /// Longest similar subsequence over the shorter sample count
    pub lss_ratio: f64,
    /// Symmetric Hausdorff distance between samples (meters)
    pub hausdorff_m: f64,
    /// Both endpoints agree within tolerance (either orientation)
    pub endpoints_match: bool,
    /// Resulting classification, `None` when the roads are unrelated
    pub change: Option<RoadChange>,
}

impl RoadComparison {
    /// Match confidence implied by the classification.
    pub fn confidence(&self) -> MatchConfidence {
        match self.change {
            Some(RoadChange::Unchanged) | Some(RoadChange::Widened) => MatchConfidence::High,
            Some(RoadChange::Rerouted) => MatchConfidence::Medium,
            _ => MatchConfidence::Low,
        }
    }
}

/// Classify a pair from its metrics.
///
/// | Class     | LSS ratio | Hausdorff |
/// |-----------|-----------|-----------|
/// | unchanged | >= 0.9    | <= 5m     |
/// | widened   | >= 0.8    | <= 10m    |
/// | rerouted  | >= 0.5    | <= 20m    |
/// | replaced  | < 0.5     | > 20m     |
///
/// `replaced` also needs both endpoints to agree. Pairs outside every row
/// are unrelated.
pub fn classify(
    config: &RoadMatchConfig,
    lss_ratio: f64,
    hausdorff_m: f64,
    endpoints_match: bool,
) -> Option<RoadChange> {
    if lss_ratio >= config.unchanged_min_lss && hausdorff_m <= config.unchanged_max_hausdorff_m {
        Some(RoadChange::Unchanged)
    } else if lss_ratio >= config.widened_min_lss && hausdorff_m <= config.widened_max_hausdorff_m
    {
        Some(RoadChange::Widened)
    } else if lss_ratio >= config.rerouted_min_lss
        && hausdorff_m <= config.rerouted_max_hausdorff_m
    {
        Some(RoadChange::Rerouted)
    } else if endpoints_match
        && lss_ratio < config.rerouted_min_lss
        && hausdorff_m > config.rerouted_max_hausdorff_m
    {
        Some(RoadChange::Replaced)
    } else {
        None
    }
}

/// Ranking of pair classes, most similar first.
pub(crate) fn class_rank(change: RoadChange) -> u8 {
    match change {
        RoadChange::Unchanged => 0,
        RoadChange::Widened => 1,
        RoadChange::Rerouted => 2,
        RoadChange::Replaced => 3,
        RoadChange::Demolished | RoadChange::New => 4,
    }
}
