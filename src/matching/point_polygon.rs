//! Point-to-polygon matching.
//!
//! Places registry point records onto footprints. Selection order:
//!
//! 1. A polygon containing the point wins outright
//! 2. Otherwise the polygon with the nearest centroid
//! 3. Ties prefer an equal declared subtype, then an undeclared one
//! 4. Remaining ties go to the smallest polygon id (counted as ambiguous)
//!
//! Candidates must share the point's feature type and lie within the
//! buffer distance, measured to the polygon boundary.

use std::cmp::Ordering;

use crate::core::FeatureId;
use crate::spatial::SpatialIndex;

use super::config::PointMatchConfig;
use super::types::{Match, MatchConfidence, MatchKind, ProjectedFeature, Selection, build_index};

/// Centroid distances closer than this are treated as tied (meters).
const TIE_EPSILON_M: f64 = 1e-3;

/// Result of matching a batch of points.
#[derive(Clone, Debug, Default)]
pub struct PointMatchOutcome {
    /// One match per placed point
    pub matches: Vec<Match>,
    /// Points with no candidate polygon
    pub orphans: Vec<FeatureId>,
    /// Selections that needed the id tie-break
    pub ambiguous: usize,
}

#[derive(Clone, Debug)]
struct Candidate<'a> {
    index: usize,
    id: &'a str,
    contained: bool,
    boundary_m: f64,
    centroid_m: f64,
    subtype_rank: u8,
}

/// Matches point records to polygon footprints.
#[derive(Clone, Debug, Default)]
pub struct PointPolygonMatcher {
    config: PointMatchConfig,
}

impl PointPolygonMatcher {
    /// Create a matcher.
    pub fn new(config: PointMatchConfig) -> Self {
        Self { config }
    }

    /// Matcher configuration.
    pub fn config(&self) -> &PointMatchConfig {
        &self.config
    }

    /// Match every point against the polygons.
    ///
    /// Pure: identical input always yields identical output.
    pub fn match_points(
        &self,
        points: &[ProjectedFeature<'_>],
        polygons: &[ProjectedFeature<'_>],
    ) -> PointMatchOutcome {
        let index = build_index(polygons);
        let mut outcome = PointMatchOutcome::default();

        for point in points {
            match self.select(point, polygons, &index) {
                Some(selection) => {
                    if selection.ambiguous {
                        outcome.ambiguous += 1;
                    }
                    outcome.matches.push(selection.matched);
                }
                None => outcome.orphans.push(point.id().clone()),
            }
        }

        log::debug!(
            "Point matching: {} matched, {} orphans, {} ambiguous",
            outcome.matches.len(),
            outcome.orphans.len(),
            outcome.ambiguous
        );
        outcome
    }

    /// Select the best polygon for one point, or `None` without candidates.
    pub fn select(
        &self,
        point: &ProjectedFeature<'_>,
        polygons: &[ProjectedFeature<'_>],
        index: &SpatialIndex,
    ) -> Option<Selection> {
        let p = point.centroid();
        let buffer = self.config.buffer_m;
        let point_type = point.feature.feature_type();

        let mut candidates: Vec<Candidate<'_>> = index
            .potential_matches((p, p), buffer)
            .into_iter()
            .filter_map(|i| {
                let target = &polygons[i];
                if target.feature.feature_type() != point_type || target.id() == point.id() {
                    return None;
                }
                let footprint = target.geometry.as_footprint()?;
                let contained = footprint.contains(p);
                let boundary_m = if contained {
                    0.0
                } else {
                    footprint.boundary_distance(p)
                };
                if boundary_m > buffer {
                    return None;
                }
                Some(Candidate {
                    index: i,
                    id: target.id().as_str(),
                    contained,
                    boundary_m,
                    centroid_m: footprint.centroid().distance(&p),
                    subtype_rank: subtype_rank(point, target),
                })
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }

        // Containment wins outright; all containing polygons are tied
        if candidates.iter().any(|c| c.contained) {
            candidates.retain(|c| c.contained);
        } else {
            let nearest = candidates
                .iter()
                .map(|c| c.centroid_m)
                .fold(f64::INFINITY, f64::min);
            candidates.retain(|c| c.centroid_m - nearest <= TIE_EPSILON_M);
        }

        candidates.sort_by(|a, b| {
            a.subtype_rank
                .cmp(&b.subtype_rank)
                .then_with(|| a.centroid_m.partial_cmp(&b.centroid_m).unwrap_or(Ordering::Equal))
                .then_with(|| a.id.cmp(b.id))
        });

        let best = &candidates[0];
        let ambiguous = candidates
            .iter()
            .filter(|c| {
                c.subtype_rank == best.subtype_rank
                    && (c.centroid_m - best.centroid_m).abs() <= TIE_EPSILON_M
            })
            .count()
            > 1;

        let target = &polygons[best.index];
        let subtype_ok = best.subtype_rank < 2;
        let confidence = if best.contained && subtype_ok {
            MatchConfidence::High
        } else if best.boundary_m <= self.config.near_m {
            MatchConfidence::Medium
        } else {
            MatchConfidence::Low
        };
        let score = if best.contained || buffer <= 0.0 {
            1.0
        } else {
            (1.0 - best.boundary_m / buffer).clamp(0.0, 1.0)
        };

        Some(Selection {
            matched: Match {
                observation: point.id().clone(),
                target: target.id().clone(),
                kind: MatchKind::PointInPolygon,
                score,
                confidence,
                distance_m: best.boundary_m,
                change: None,
            },
            target_index: best.index,
            ambiguous,
        })
    }
}

/// 0: equal declared subtypes, 1: one side undeclared, 2: conflicting.
fn subtype_rank(point: &ProjectedFeature<'_>, target: &ProjectedFeature<'_>) -> u8 {
    if point.feature.class.subtype_equal(&target.feature.class) {
        0
    } else if point.feature.class.subtype_compatible(&target.feature.class) {
        1
    } else {
        2
    }
}
