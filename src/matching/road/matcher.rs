//! Road shape matcher: pairs historical and modern road polylines.

use std::cmp::Ordering;

use crate::core::{FeatureId, LocalPoint, RoadChange};
use crate::matching::config::RoadMatchConfig;
use crate::matching::types::{
    Match, MatchKind, ProjectedFeature, Selection, build_index, cmp_within,
};
use crate::spatial::{SpatialIndex, sample_polyline};

use super::classify::{RoadComparison, class_rank, classify};
use super::hausdorff::hausdorff;
use super::lss::lss_ratio;

/// LSS ratios closer than this are tied.
const LSS_TOLERANCE: f64 = 1e-9;

/// Hausdorff distances closer than this are tied (meters).
const HAUSDORFF_TOLERANCE_M: f64 = 1e-3;

/// Result of matching historical roads against modern ones.
#[derive(Clone, Debug, Default)]
pub struct RoadMatchOutcome {
    /// Best classified pair per matched historical road
    pub matches: Vec<Match>,
    /// Historical roads with no counterpart
    pub demolished: Vec<FeatureId>,
    /// Modern roads with no same-road historical counterpart
    pub new: Vec<FeatureId>,
    /// Selections that needed the id tie-break
    pub ambiguous: usize,
}

/// Compares road polylines by longest similar subsequence and Hausdorff
/// distance.
#[derive(Clone, Debug, Default)]
pub struct RoadMatcher {
    config: RoadMatchConfig,
}

impl RoadMatcher {
    /// Create a matcher.
    pub fn new(config: RoadMatchConfig) -> Self {
        Self { config }
    }

    /// Matcher configuration.
    pub fn config(&self) -> &RoadMatchConfig {
        &self.config
    }

    /// Compare two local polylines.
    ///
    /// Symmetric in its arguments.
    pub fn compare(&self, a: &[LocalPoint], b: &[LocalPoint]) -> RoadComparison {
        let interval = self.config.sample_interval_m;
        let sa = sample_polyline(a, interval);
        let sb = sample_polyline(b, interval);

        let lss = lss_ratio(&sa, &sb, self.config.match_threshold_m);
        let hd = hausdorff(&sa, &sb);
        let endpoints_match = self.endpoints_match(a, b);

        RoadComparison {
            lss_ratio: lss,
            hausdorff_m: hd,
            endpoints_match,
            change: classify(&self.config, lss, hd, endpoints_match),
        }
    }

    /// Both endpoint pairs within tolerance, in either orientation.
    fn endpoints_match(&self, a: &[LocalPoint], b: &[LocalPoint]) -> bool {
        let (Some(a0), Some(a1), Some(b0), Some(b1)) = (a.first(), a.last(), b.first(), b.last())
        else {
            return false;
        };
        let tol = self.config.endpoint_tolerance_m;
        let same = a0.distance(b0) <= tol && a1.distance(b1) <= tol;
        let flipped = a0.distance(b1) <= tol && a1.distance(b0) <= tol;
        same || flipped
    }

    /// Best classified counterpart for one road.
    ///
    /// Candidates come from the index, envelope expanded by the Hausdorff
    /// cutoff. Ranking: most similar class, higher LSS ratio, lower
    /// Hausdorff, smaller id. Ambiguous when the id decided.
    pub fn best_match(
        &self,
        road: &ProjectedFeature<'_>,
        targets: &[ProjectedFeature<'_>],
        index: &SpatialIndex,
    ) -> Option<Selection> {
        self.best_match_where(road, targets, index, |_| true)
    }

    /// [`best_match`](Self::best_match) restricted to accepted classes.
    pub fn best_match_where<F>(
        &self,
        road: &ProjectedFeature<'_>,
        targets: &[ProjectedFeature<'_>],
        index: &SpatialIndex,
        accept: F,
    ) -> Option<Selection>
    where
        F: Fn(RoadChange) -> bool,
    {
        let line = road.geometry.as_line()?;
        let feature_type = road.feature.feature_type();

        let mut best: Option<(usize, RoadComparison, RoadChange)> = None;
        let mut ambiguous = false;
        for i in index.potential_matches(road.geometry.envelope(), self.config.hausdorff_cutoff_m)
        {
            let target = &targets[i];
            if target.feature.feature_type() != feature_type || target.id() == road.id() {
                continue;
            }
            let Some(other) = target.geometry.as_line() else {
                continue;
            };
            let cmp = self.compare(line, other);
            let Some(change) = cmp.change.filter(|c| accept(*c)) else {
                continue;
            };

            let Some((bi, bcmp, bchange)) = &best else {
                best = Some((i, cmp, change));
                continue;
            };
            match rank_pair(change, &cmp, *bchange, bcmp) {
                Ordering::Less => {
                    best = Some((i, cmp, change));
                    ambiguous = false;
                }
                Ordering::Equal => {
                    ambiguous = true;
                    if target.id() < targets[*bi].id() {
                        best = Some((i, cmp, change));
                    }
                }
                Ordering::Greater => {}
            }
        }

        best.map(|(i, cmp, change)| Selection {
            matched: Match {
                observation: road.id().clone(),
                target: targets[i].id().clone(),
                kind: MatchKind::RoadShape,
                score: cmp.lss_ratio,
                confidence: cmp.confidence(),
                distance_m: cmp.hausdorff_m,
                change: Some(change),
            },
            target_index: i,
            ambiguous,
        })
    }

    /// Match historical roads against modern ones.
    ///
    /// Historical roads without any classified counterpart are
    /// `demolished`; modern roads that no historical road matched as the
    /// same road are `new`.
    pub fn match_roads(
        &self,
        historical: &[ProjectedFeature<'_>],
        modern: &[ProjectedFeature<'_>],
    ) -> RoadMatchOutcome {
        let index = build_index(modern);
        let mut outcome = RoadMatchOutcome::default();
        let mut modern_matched = vec![false; modern.len()];

        for road in historical.iter().filter(|r| r.geometry.as_line().is_some()) {
            match self.best_match(road, modern, &index) {
                Some(selection) => {
                    if selection.matched.change.is_some_and(|c| c.is_same_road()) {
                        modern_matched[selection.target_index] = true;
                    }
                    if selection.ambiguous {
                        outcome.ambiguous += 1;
                    }
                    outcome.matches.push(selection.matched);
                }
                None => outcome.demolished.push(road.id().clone()),
            }
        }

        outcome.new = modern
            .iter()
            .zip(&modern_matched)
            .filter(|(r, matched)| !**matched && r.geometry.as_line().is_some())
            .map(|(r, _)| r.id().clone())
            .collect();

        log::debug!(
            "Road matching: {} matched, {} demolished, {} new",
            outcome.matches.len(),
            outcome.demolished.len(),
            outcome.new.len()
        );
        outcome
    }
}

/// Order two classified pairs, most similar first. Equal pairs are tied.
fn rank_pair(
    a_change: RoadChange,
    a: &RoadComparison,
    b_change: RoadChange,
    b: &RoadComparison,
) -> Ordering {
    class_rank(a_change)
        .cmp(&class_rank(b_change))
        .then_with(|| cmp_within(b.lss_ratio, a.lss_ratio, LSS_TOLERANCE))
        .then_with(|| cmp_within(a.hausdorff_m, b.hausdorff_m, HAUSDORFF_TOLERANCE_M))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, FeatureClass, FeatureType, GeoPoint, Geometry};
    use crate::matching::project_all;
    use crate::spatial::LocalFrame;
    use approx::assert_relative_eq;

    const M: f64 = 1.0 / 111_195.0;

    fn road(id: &str, pts: &[(f64, f64)]) -> Feature {
        Feature::new(
            id,
            id.split(':').next().unwrap_or(id),
            FeatureClass::empty(FeatureType::Road),
            Geometry::LineString(pts.iter().map(|(x, y)| GeoPoint::new(x * M, y * M)).collect()),
        )
    }

    fn local(pts: &[(f64, f64)]) -> Vec<LocalPoint> {
        pts.iter().map(|(x, y)| LocalPoint::new(*x, *y)).collect()
    }

    #[test]
    fn test_exact_copy() {
        let matcher = RoadMatcher::default();
        let a = local(&[(0.0, 0.0), (100.0, 0.0)]);
        let cmp = matcher.compare(&a, &a);
        assert_eq!(cmp.lss_ratio, 1.0);
        assert_eq!(cmp.hausdorff_m, 0.0);
        assert_eq!(cmp.change, Some(RoadChange::Unchanged));
    }

    #[test]
    fn test_parallel_eight_meters_is_widened() {
        let matcher = RoadMatcher::default();
        let a = local(&[(0.0, 0.0), (100.0, 0.0)]);
        let b = local(&[(0.0, 8.0), (100.0, 8.0)]);
        let cmp = matcher.compare(&a, &b);
        assert_relative_eq!(cmp.lss_ratio, 1.0);
        assert_relative_eq!(cmp.hausdorff_m, 8.0, epsilon = 1e-9);
        assert_eq!(cmp.change, Some(RoadChange::Widened));
    }

    #[test]
    fn test_reversed_direction_unchanged() {
        let matcher = RoadMatcher::default();
        let a = local(&[(0.0, 0.0), (100.0, 0.0)]);
        let b = local(&[(100.0, 0.0), (0.0, 0.0)]);
        assert_eq!(matcher.compare(&a, &b).change, Some(RoadChange::Unchanged));
    }

    #[test]
    fn test_detour_with_same_endpoints_is_replaced() {
        let matcher = RoadMatcher::default();
        let a = local(&[(0.0, 0.0), (200.0, 0.0)]);
        let b = local(&[(0.0, 0.0), (0.0, 60.0), (200.0, 60.0), (200.0, 0.0)]);
        let cmp = matcher.compare(&a, &b);
        assert!(cmp.lss_ratio < 0.5);
        assert!(cmp.hausdorff_m > 20.0);
        assert!(cmp.endpoints_match);
        assert_eq!(cmp.change, Some(RoadChange::Replaced));
    }

    #[test]
    fn test_short_detour_with_same_endpoints_is_unrelated() {
        let matcher = RoadMatcher::default();
        let a = local(&[(0.0, 0.0), (200.0, 0.0)]);
        let b = local(&[
            (0.0, 0.0),
            (80.0, 0.0),
            (90.0, 25.0),
            (110.0, 25.0),
            (120.0, 0.0),
            (200.0, 0.0),
        ]);
        let cmp = matcher.compare(&a, &b);
        assert!(cmp.lss_ratio >= 0.5);
        assert!(cmp.hausdorff_m > 20.0);
        assert!(cmp.endpoints_match);
        assert_eq!(cmp.change, None);
    }

    #[test]
    fn test_unchanged_symmetric() {
        let matcher = RoadMatcher::default();
        let a = local(&[(0.0, 0.0), (50.0, 2.0), (100.0, 0.0)]);
        let b = local(&[(0.0, 1.0), (100.0, 1.0)]);
        assert_eq!(matcher.compare(&a, &b).change, Some(RoadChange::Unchanged));
        assert_eq!(matcher.compare(&b, &a).change, Some(RoadChange::Unchanged));
    }

    #[test]
    fn test_demolished_and_new() {
        let frame = LocalFrame::default();
        let hist = vec![road("map:1", &[(0.0, 0.0), (100.0, 0.0)])];
        let modern = vec![road("osm:9", &[(0.0, 500.0), (100.0, 500.0)])];
        let hist = project_all(&frame, &hist);
        let modern = project_all(&frame, &modern);

        let outcome = RoadMatcher::default().match_roads(&hist, &modern);
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.demolished, vec!["map:1".to_string()]);
        assert_eq!(outcome.new, vec!["osm:9".to_string()]);
    }

    #[test]
    fn test_best_candidate_prefers_closer_class() {
        let frame = LocalFrame::default();
        let hist = vec![road("map:1", &[(0.0, 0.0), (100.0, 0.0)])];
        let modern = vec![
            road("osm:a", &[(0.0, 8.0), (100.0, 8.0)]),
            road("osm:b", &[(0.0, 1.0), (100.0, 1.0)]),
        ];
        let hist = project_all(&frame, &hist);
        let modern = project_all(&frame, &modern);

        let outcome = RoadMatcher::default().match_roads(&hist, &modern);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].target, "osm:b");
        assert_eq!(outcome.matches[0].change, Some(RoadChange::Unchanged));
        assert_eq!(outcome.new, vec!["osm:a".to_string()]);
    }
}
