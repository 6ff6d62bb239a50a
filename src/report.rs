//! Run statistics, serialized as pretty JSON next to the output.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Feature, SourceId};
use crate::error::{InputError, MalformedFeature};
use crate::matching::{Match, MatchKind};

/// Input section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputReport {
    /// Accepted features per source
    pub features_per_source: BTreeMap<SourceId, usize>,
    /// Skipped malformed features
    pub skipped: Vec<MalformedFeature>,
    /// Unmatched detections that could not seed a historical object
    pub discarded_detections: usize,
}

/// Matching section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingReport {
    /// Point matches per confidence tier
    pub point_matches: BTreeMap<String, usize>,
    /// Registry records placed on no footprint
    pub orphans: usize,
    /// Orphans attached to a historical footprint on retry
    pub orphans_reattached: usize,
    /// Footprint (IoU) matches
    pub footprint_matches: usize,
    /// Road matches per change class
    pub road_matches: BTreeMap<String, usize>,
    /// Mean boundary distance of point matches (meters)
    pub mean_point_distance_m: Option<f64>,
    /// Mean Hausdorff distance of road matches (meters)
    pub mean_hausdorff_m: Option<f64>,
    /// Selections decided by the id tie-break
    pub ambiguous: usize,
    /// Objects seen only in historical snapshots
    pub historical_objects: usize,
}

impl MatchingReport {
    /// Tally a batch of matches.
    pub fn record(&mut self, matches: &[Match]) {
        let mut point_distance = 0.0;
        let mut hausdorff = 0.0;
        let mut points = 0usize;
        let mut roads = 0usize;
        for m in matches {
            match m.kind {
                MatchKind::PointInPolygon => {
                    *self
                        .point_matches
                        .entry(m.confidence.as_str().to_string())
                        .or_default() += 1;
                    point_distance += m.distance_m;
                    points += 1;
                }
                MatchKind::Footprint => self.footprint_matches += 1,
                MatchKind::RoadShape => {
                    if let Some(change) = m.change {
                        *self.road_matches.entry(change.as_str().to_string()).or_default() += 1;
                    }
                    hausdorff += m.distance_m;
                    roads += 1;
                }
            }
        }
        self.mean_point_distance_m = (points > 0).then(|| point_distance / points as f64);
        self.mean_hausdorff_m = (roads > 0).then(|| hausdorff / roads as f64);
    }
}

/// Temporal inference section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalReport {
    /// Objects per start-date evidence
    pub by_evidence: BTreeMap<String, usize>,
    /// Objects per date kind
    pub by_date_kind: BTreeMap<String, usize>,
    /// Registry start later than a snapshot confirmation
    pub date_conflicts: usize,
    /// Objects without temporal evidence
    pub undated: usize,
}

/// Replacement section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplacementReport {
    /// Accepted links
    pub links: usize,
    /// Of which derived from road classification
    pub road_links: usize,
    /// Candidates that failed the era gate
    pub rejected_by_era: usize,
    /// Overlapping candidates below the overlap threshold
    pub rejected_by_overlap: usize,
}

/// Inheritance section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InheritanceReport {
    /// Dates borrowed from a donor
    pub inherited: usize,
    /// Fallback years assigned
    pub fallback: usize,
    /// Mean donor distance (meters)
    pub mean_donor_distance_m: Option<f64>,
}

/// Lifetime extent of the output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest start date
    pub earliest_start: Option<i32>,
    /// Latest start date
    pub latest_start: Option<i32>,
    /// Latest end date
    pub latest_end: Option<i32>,
    /// Features with an end date
    pub with_end_date: usize,
}

/// Output section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputReport {
    /// Output feature count
    pub features: usize,
    /// Features per quality tier
    pub by_tier: BTreeMap<String, usize>,
    /// Features per contributing source
    pub by_source: BTreeMap<SourceId, usize>,
    /// Features per feature type
    pub by_feature_type: BTreeMap<String, usize>,
    /// Road features per change class
    pub by_change: BTreeMap<String, usize>,
    /// Lifetime extent
    pub date_range: DateRange,
}

impl OutputReport {
    /// Summarize the final feature set.
    pub fn summarize(features: &[Feature]) -> Self {
        let mut report = OutputReport {
            features: features.len(),
            ..Default::default()
        };
        let range = &mut report.date_range;
        for f in features {
            if let Some(tier) = f.quality_tier {
                *report.by_tier.entry(tier.as_str().to_string()).or_default() += 1;
            }
            for source in &f.all_sources {
                *report.by_source.entry(source.clone()).or_default() += 1;
            }
            *report
                .by_feature_type
                .entry(f.feature_type().as_str().to_string())
                .or_default() += 1;
            if let Some(change) = f.change {
                *report.by_change.entry(change.as_str().to_string()).or_default() += 1;
            }
            if let Some(start) = f.start_date {
                range.earliest_start = Some(range.earliest_start.map_or(start, |s| s.min(start)));
                range.latest_start = Some(range.latest_start.map_or(start, |s| s.max(start)));
            }
            if let Some(end) = f.end_date {
                range.latest_end = Some(range.latest_end.map_or(end, |e| e.max(end)));
                range.with_end_date += 1;
            }
        }
        report
    }
}

/// Statistics of one fusion run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionReport {
    /// Input counts and skipped features
    pub input: InputReport,
    /// Matcher results
    pub matching: MatchingReport,
    /// Inference results
    pub temporal: TemporalReport,
    /// Replacement links
    pub replacement: ReplacementReport,
    /// Date inheritance
    pub inheritance: InheritanceReport,
    /// Final feature set
    pub output: OutputReport,
}

impl FusionReport {
    /// Pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON to a file.
    pub fn write(&self, path: &Path) -> Result<(), InputError> {
        let json = self.to_json().map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        DateKind, Evidence, FeatureClass, FeatureType, GeoPoint, Geometry, QualityTier,
        RoadChange,
    };
    use crate::matching::MatchConfidence;
    use approx::assert_relative_eq;

    fn feature(id: &str, start: i32, end: Option<i32>) -> Feature {
        let mut f = Feature::new(
            id,
            "osm",
            FeatureClass::empty(FeatureType::Building),
            Geometry::Point(GeoPoint::new(0.0, 0.0)),
        )
        .with_start(start, DateKind::Exact, Evidence::High);
        f.end_date = end;
        f.quality_tier = Some(QualityTier::Bronze);
        f.all_sources = vec!["osm".to_string()];
        f
    }

    #[test]
    fn test_output_summary() {
        let features = vec![feature("a", 1875, None), feature("b", 1920, Some(1960))];
        let out = OutputReport::summarize(&features);
        assert_eq!(out.features, 2);
        assert_eq!(out.by_tier.get("bronze"), Some(&2));
        assert_eq!(out.by_source.get("osm"), Some(&2));
        assert_eq!(out.date_range.earliest_start, Some(1875));
        assert_eq!(out.date_range.latest_start, Some(1920));
        assert_eq!(out.date_range.latest_end, Some(1960));
        assert_eq!(out.date_range.with_end_date, 1);
    }

    #[test]
    fn test_matching_tally() {
        let m = |kind, distance_m, change| Match {
            observation: "o".into(),
            target: "t".into(),
            kind,
            score: 1.0,
            confidence: MatchConfidence::High,
            distance_m,
            change,
        };
        let mut report = MatchingReport::default();
        report.record(&[
            m(MatchKind::PointInPolygon, 0.0, None),
            m(MatchKind::PointInPolygon, 4.0, None),
            m(MatchKind::RoadShape, 8.0, Some(RoadChange::Widened)),
        ]);
        assert_eq!(report.point_matches.get("high"), Some(&2));
        assert_relative_eq!(report.mean_point_distance_m.unwrap(), 2.0);
        assert_relative_eq!(report.mean_hausdorff_m.unwrap(), 8.0);
        assert_eq!(report.road_matches.get("widened"), Some(&1));
    }

    #[test]
    fn test_json_sections() {
        let json = FusionReport::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for section in ["input", "matching", "temporal", "replacement", "inheritance", "output"] {
            assert!(value.get(section).is_some(), "missing {section}");
        }
    }
}
