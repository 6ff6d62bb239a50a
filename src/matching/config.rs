//! Configuration for the spatial matchers.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::config::{ConfigError, ensure_non_negative, ensure_positive, ensure_unit};

/// Configuration for point-to-polygon matching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointMatchConfig {
    /// Maximum distance from the point to a polygon boundary (meters).
    /// Default: 20m
    #[serde(default = "defaults::point_buffer_m")]
    pub buffer_m: f64,

    /// Distance under which an uncontained match is `medium` confidence.
    /// Default: 5m
    #[serde(default = "defaults::point_near_m")]
    pub near_m: f64,
}

impl Default for PointMatchConfig {
    fn default() -> Self {
        Self {
            buffer_m: defaults::point_buffer_m(),
            near_m: defaults::point_near_m(),
        }
    }
}

impl PointMatchConfig {
    /// Builder-style setter for the buffer distance.
    pub fn with_buffer(mut self, meters: f64) -> Self {
        self.buffer_m = meters;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("point_match.buffer_m", self.buffer_m)?;
        ensure_non_negative("point_match.near_m", self.near_m)
    }
}

/// Configuration for polygon footprint matching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootprintMatchConfig {
    /// Minimum intersection-over-union for a match.
    /// Default: 0.5
    #[serde(default = "defaults::min_iou")]
    pub min_iou: f64,

    /// IoU at or above which a match is `high` confidence.
    /// Default: 0.8
    #[serde(default = "defaults::high_iou")]
    pub high_iou: f64,

    /// IoU at or above which a match is `medium` confidence.
    /// Default: 0.65
    #[serde(default = "defaults::medium_iou")]
    pub medium_iou: f64,
}

impl Default for FootprintMatchConfig {
    fn default() -> Self {
        Self {
            min_iou: defaults::min_iou(),
            high_iou: defaults::high_iou(),
            medium_iou: defaults::medium_iou(),
        }
    }
}

impl FootprintMatchConfig {
    /// Builder-style setter for the minimum IoU.
    pub fn with_min_iou(mut self, iou: f64) -> Self {
        self.min_iou = iou;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, v) in [
            ("footprint_match.min_iou", self.min_iou),
            ("footprint_match.high_iou", self.high_iou),
            ("footprint_match.medium_iou", self.medium_iou),
        ] {
            ensure_unit(field, v)?;
        }
        if self.medium_iou > self.high_iou {
            return Err(ConfigError::invalid(
                "footprint_match.medium_iou",
                "must not exceed high_iou",
            ));
        }
        Ok(())
    }
}

/// Configuration for road shape matching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadMatchConfig {
    /// Arc-length sampling interval (meters).
    /// Default: 5m
    #[serde(default = "defaults::sample_interval_m")]
    pub sample_interval_m: f64,

    /// Two samples match when closer than this (meters).
    /// Default: 10m
    #[serde(default = "defaults::match_threshold_m")]
    pub match_threshold_m: f64,

    /// Candidate search margin around a road's envelope (meters).
    /// Default: 50m
    #[serde(default = "defaults::hausdorff_cutoff_m")]
    pub hausdorff_cutoff_m: f64,

    /// Endpoint agreement required for `replaced` (meters).
    /// Default: 30m
    #[serde(default = "defaults::endpoint_tolerance_m")]
    pub endpoint_tolerance_m: f64,

    /// Minimum LSS ratio for `unchanged`. Default: 0.9
    #[serde(default = "defaults::unchanged_min_lss")]
    pub unchanged_min_lss: f64,

    /// Maximum Hausdorff for `unchanged`. Default: 5m
    #[serde(default = "defaults::unchanged_max_hausdorff_m")]
    pub unchanged_max_hausdorff_m: f64,

    /// Minimum LSS ratio for `widened`. Default: 0.8
    #[serde(default = "defaults::widened_min_lss")]
    pub widened_min_lss: f64,

    /// Maximum Hausdorff for `widened`. Default: 10m
    #[serde(default = "defaults::widened_max_hausdorff_m")]
    pub widened_max_hausdorff_m: f64,

    /// Minimum LSS ratio for `rerouted`. Default: 0.5
    #[serde(default = "defaults::rerouted_min_lss")]
    pub rerouted_min_lss: f64,

    /// Maximum Hausdorff for `rerouted`. Default: 20m
    #[serde(default = "defaults::rerouted_max_hausdorff_m")]
    pub rerouted_max_hausdorff_m: f64,
}

impl Default for RoadMatchConfig {
    fn default() -> Self {
        Self {
            sample_interval_m: defaults::sample_interval_m(),
            match_threshold_m: defaults::match_threshold_m(),
            hausdorff_cutoff_m: defaults::hausdorff_cutoff_m(),
            endpoint_tolerance_m: defaults::endpoint_tolerance_m(),
            unchanged_min_lss: defaults::unchanged_min_lss(),
            unchanged_max_hausdorff_m: defaults::unchanged_max_hausdorff_m(),
            widened_min_lss: defaults::widened_min_lss(),
            widened_max_hausdorff_m: defaults::widened_max_hausdorff_m(),
            rerouted_min_lss: defaults::rerouted_min_lss(),
            rerouted_max_hausdorff_m: defaults::rerouted_max_hausdorff_m(),
        }
    }
}

impl RoadMatchConfig {
    /// Builder-style setter for the sampling interval.
    pub fn with_sample_interval(mut self, meters: f64) -> Self {
        self.sample_interval_m = meters;
        self
    }

    /// Builder-style setter for the sample match threshold.
    pub fn with_match_threshold(mut self, meters: f64) -> Self {
        self.match_threshold_m = meters;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("road_match.sample_interval_m", self.sample_interval_m)?;
        for (field, v) in [
            ("road_match.match_threshold_m", self.match_threshold_m),
            ("road_match.hausdorff_cutoff_m", self.hausdorff_cutoff_m),
            ("road_match.endpoint_tolerance_m", self.endpoint_tolerance_m),
            ("road_match.unchanged_max_hausdorff_m", self.unchanged_max_hausdorff_m),
            ("road_match.widened_max_hausdorff_m", self.widened_max_hausdorff_m),
            ("road_match.rerouted_max_hausdorff_m", self.rerouted_max_hausdorff_m),
        ] {
            ensure_non_negative(field, v)?;
        }
        for (field, v) in [
            ("road_match.unchanged_min_lss", self.unchanged_min_lss),
            ("road_match.widened_min_lss", self.widened_min_lss),
            ("road_match.rerouted_min_lss", self.rerouted_min_lss),
        ] {
            ensure_unit(field, v)?;
        }
        Ok(())
    }
}
