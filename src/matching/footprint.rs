//! Polygon footprint matching by intersection over union.

use std::cmp::Ordering;

use crate::core::FeatureId;
use crate::spatial::SpatialIndex;

use super::config::FootprintMatchConfig;
use super::types::{
    Match, MatchConfidence, MatchKind, ProjectedFeature, Selection, build_index, cmp_within,
};

/// IoU values closer than this are tied.
const IOU_TOLERANCE: f64 = 1e-9;

/// Centroid distances closer than this are tied (meters).
const DISTANCE_TOLERANCE_M: f64 = 1e-3;

/// Result of matching a batch of footprints.
#[derive(Clone, Debug, Default)]
pub struct FootprintMatchOutcome {
    /// Best match per matched observation
    pub matches: Vec<Match>,
    /// Observations without a target above the IoU threshold
    pub unmatched: Vec<FeatureId>,
    /// Selections that needed the id tie-break
    pub ambiguous: usize,
}

/// Matches same-type polygons by IoU.
#[derive(Clone, Debug, Default)]
pub struct FootprintMatcher {
    config: FootprintMatchConfig,
}

impl FootprintMatcher {
    /// Create a matcher.
    pub fn new(config: FootprintMatchConfig) -> Self {
        Self { config }
    }

    /// Matcher configuration.
    pub fn config(&self) -> &FootprintMatchConfig {
        &self.config
    }

    /// Confidence tier for an IoU value.
    pub fn confidence(&self, iou: f64) -> MatchConfidence {
        if iou >= self.config.high_iou {
            MatchConfidence::High
        } else if iou >= self.config.medium_iou {
            MatchConfidence::Medium
        } else {
            MatchConfidence::Low
        }
    }

    /// Best target for one observation: highest IoU, then nearest
    /// centroid, then smallest id.
    ///
    /// The selection is ambiguous when another candidate ties on both IoU
    /// and centroid distance.
    pub fn best_match(
        &self,
        observation: &ProjectedFeature<'_>,
        targets: &[ProjectedFeature<'_>],
        index: &SpatialIndex,
    ) -> Option<Selection> {
        let footprint = observation.geometry.as_footprint()?;
        let feature_type = observation.feature.feature_type();

        let mut best: Option<(usize, f64, f64)> = None;
        let mut ambiguous = false;
        for i in index.potential_matches(footprint.envelope(), 0.0) {
            let target = &targets[i];
            if target.feature.feature_type() != feature_type || target.id() == observation.id() {
                continue;
            }
            let Some(other) = target.geometry.as_footprint() else {
                continue;
            };
            let iou = footprint.iou(other);
            if iou < self.config.min_iou || iou <= 0.0 {
                continue;
            }
            let dist = footprint.centroid().distance(&other.centroid());

            let Some((bi, biou, bdist)) = best else {
                best = Some((i, iou, dist));
                continue;
            };
            let order = cmp_within(biou, iou, IOU_TOLERANCE)
                .then_with(|| cmp_within(dist, bdist, DISTANCE_TOLERANCE_M));
            match order {
                Ordering::Less => {
                    best = Some((i, iou, dist));
                    ambiguous = false;
                }
                Ordering::Equal => {
                    ambiguous = true;
                    if target.id() < targets[bi].id() {
                        best = Some((i, iou, dist));
                    }
                }
                Ordering::Greater => {}
            }
        }

        best.map(|(i, iou, dist)| Selection {
            matched: Match {
                observation: observation.id().clone(),
                target: targets[i].id().clone(),
                kind: MatchKind::Footprint,
                score: iou,
                confidence: self.confidence(iou),
                distance_m: dist,
                change: None,
            },
            target_index: i,
            ambiguous,
        })
    }

    /// Match every observation polygon against the targets.
    pub fn match_footprints(
        &self,
        observations: &[ProjectedFeature<'_>],
        targets: &[ProjectedFeature<'_>],
    ) -> FootprintMatchOutcome {
        let index = build_index(targets);
        let mut outcome = FootprintMatchOutcome::default();
        for obs in observations {
            match self.best_match(obs, targets, &index) {
                Some(selection) => {
                    if selection.ambiguous {
                        outcome.ambiguous += 1;
                    }
                    outcome.matches.push(selection.matched);
                }
                None => outcome.unmatched.push(obs.id().clone()),
            }
        }
        log::debug!(
            "Footprint matching: {} matched, {} unmatched, {} ambiguous",
            outcome.matches.len(),
            outcome.unmatched.len(),
            outcome.ambiguous
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, FeatureClass, FeatureType, GeoPoint, Geometry};
    use crate::matching::project_all;
    use crate::spatial::LocalFrame;
    use approx::assert_relative_eq;

    const M: f64 = 1.0 / 111_195.0;

    fn rect(id: &str, feature_type: FeatureType, x: f64, w: f64) -> Feature {
        Feature::new(
            id,
            "src",
            FeatureClass::empty(feature_type),
            Geometry::Polygon(vec![
                GeoPoint::new(x * M, 0.0),
                GeoPoint::new((x + w) * M, 0.0),
                GeoPoint::new((x + w) * M, 10.0 * M),
                GeoPoint::new(x * M, 10.0 * M),
            ]),
        )
    }

    fn run(obs: &[Feature], targets: &[Feature]) -> FootprintMatchOutcome {
        let frame = LocalFrame::default();
        FootprintMatcher::default()
            .match_footprints(&project_all(&frame, obs), &project_all(&frame, targets))
    }

    #[test]
    fn test_identical_footprints_match_high() {
        let obs = vec![rect("det:1", FeatureType::Building, 0.0, 10.0)];
        let targets = vec![rect("osm:1", FeatureType::Building, 0.0, 10.0)];
        let outcome = run(&obs, &targets);
        assert_eq!(outcome.matches.len(), 1);
        assert_relative_eq!(outcome.matches[0].score, 1.0, epsilon = 1e-6);
        assert_eq!(outcome.matches[0].confidence, MatchConfidence::High);
    }

    #[test]
    fn test_low_iou_unmatched() {
        // 5m shift of a 10m square: IoU = 1/3
        let obs = vec![rect("det:1", FeatureType::Building, 5.0, 10.0)];
        let targets = vec![rect("osm:1", FeatureType::Building, 0.0, 10.0)];
        let outcome = run(&obs, &targets);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unmatched, vec!["det:1".to_string()]);
    }

    #[test]
    fn test_type_mismatch_ignored() {
        let obs = vec![rect("det:1", FeatureType::Water, 0.0, 10.0)];
        let targets = vec![rect("osm:1", FeatureType::Building, 0.0, 10.0)];
        assert!(run(&obs, &targets).matches.is_empty());
    }

    #[test]
    fn test_best_by_iou() {
        let obs = vec![rect("det:1", FeatureType::Building, 0.0, 10.0)];
        let targets = vec![
            rect("osm:a", FeatureType::Building, 2.0, 10.0),
            rect("osm:b", FeatureType::Building, 1.0, 10.0),
        ];
        let outcome = run(&obs, &targets);
        assert_eq!(outcome.matches[0].target, "osm:b");
        assert_eq!(outcome.matches[0].confidence, MatchConfidence::High);
        assert_eq!(outcome.ambiguous, 0);
    }

    #[test]
    fn test_tie_broken_by_id_is_ambiguous() {
        // Shifted 1m left and right: same IoU, same centroid distance
        let obs = vec![rect("det:1", FeatureType::Building, 0.0, 10.0)];
        let targets = vec![
            rect("osm:b", FeatureType::Building, 1.0, 10.0),
            rect("osm:a", FeatureType::Building, -1.0, 10.0),
        ];
        let outcome = run(&obs, &targets);
        assert_eq!(outcome.matches[0].target, "osm:a");
        assert_eq!(outcome.ambiguous, 1);
    }
}
