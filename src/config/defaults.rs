//! Default value functions for serde deserialization.

use crate::core::Evidence;
use crate::replacement::EraGate;

// Point-to-polygon matching

pub fn point_buffer_m() -> f64 {
    20.0
}

pub fn point_near_m() -> f64 {
    5.0
}

// Footprint matching

pub fn min_iou() -> f64 {
    0.5
}

pub fn high_iou() -> f64 {
    0.8
}

pub fn medium_iou() -> f64 {
    0.65
}

// Road shape matching

pub fn sample_interval_m() -> f64 {
    5.0
}

pub fn match_threshold_m() -> f64 {
    10.0
}

pub fn hausdorff_cutoff_m() -> f64 {
    50.0
}

pub fn endpoint_tolerance_m() -> f64 {
    30.0
}

pub fn unchanged_min_lss() -> f64 {
    0.9
}

pub fn unchanged_max_hausdorff_m() -> f64 {
    5.0
}

pub fn widened_min_lss() -> f64 {
    0.8
}

pub fn widened_max_hausdorff_m() -> f64 {
    10.0
}

pub fn rerouted_min_lss() -> f64 {
    0.5
}

pub fn rerouted_max_hausdorff_m() -> f64 {
    20.0
}

// Temporal inference

pub fn baseline_year() -> i32 {
    2024
}

pub fn min_detection_confidence() -> f64 {
    0.5
}

// Replacement detection

pub fn min_overlap_ratio() -> f64 {
    0.5
}

pub fn fallback_offset_years() -> i32 {
    1
}

pub fn era_gates() -> Vec<EraGate> {
    vec![
        EraGate {
            until_year: 1899,
            min_evidence: Evidence::High,
        },
        EraGate {
            until_year: 1950,
            min_evidence: Evidence::Medium,
        },
    ]
}

pub fn default_min_evidence() -> Evidence {
    Evidence::Low
}

// Date inheritance

pub fn max_radius_m() -> f64 {
    1000.0
}

pub fn enabled() -> bool {
    true
}

pub fn fallback_year_building() -> i32 {
    1960
}

pub fn fallback_year_other() -> i32 {
    2000
}

// Source priority

pub fn priority_registry() -> u8 {
    0
}

pub fn priority_municipal_record() -> u8 {
    1
}

pub fn priority_verified_detection() -> u8 {
    2
}

pub fn priority_baseline() -> u8 {
    3
}

pub fn priority_unverified_detection() -> u8 {
    4
}
