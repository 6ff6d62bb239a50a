//! Match results and projected match candidates.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Feature, FeatureId, LocalPoint, RoadChange};
use crate::spatial::{IndexedFeature, LocalFrame, LocalGeometry, SpatialIndex};

/// Which matcher produced a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Point record inside or near a polygon footprint
    PointInPolygon,
    /// Polygon footprints overlapping by IoU
    Footprint,
    /// Polylines compared by LSS and Hausdorff distance
    RoadShape,
}

/// Match confidence tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Weak match
    Low,
    /// Reasonable match
    Medium,
    /// Strong match
    High,
}

impl MatchConfidence {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchConfidence::Low => "low",
            MatchConfidence::Medium => "medium",
            MatchConfidence::High => "high",
        }
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pairing of an observation with a target feature of the same type.
///
/// A relation only: neither feature owns the other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The feature being placed (registry point, detection, historical road)
    pub observation: FeatureId,
    /// The feature it was matched to
    pub target: FeatureId,
    /// Matcher that produced the pairing
    pub kind: MatchKind,
    /// Similarity in [0, 1]
    pub score: f64,
    /// Confidence tier
    pub confidence: MatchConfidence,
    /// Geometric distance in meters (boundary, centroid or Hausdorff)
    pub distance_m: f64,
    /// Road change classification
    pub change: Option<RoadChange>,
}

/// One observation's chosen target.
#[derive(Clone, Debug)]
pub struct Selection {
    /// Chosen target as a match
    pub matched: Match,
    /// Position of the target in the candidate slice
    pub target_index: usize,
    /// The id tie-break decided the selection
    pub ambiguous: bool,
}

/// Compare two metrics, treating differences within `tolerance` as equal.
pub(crate) fn cmp_within(a: f64, b: f64, tolerance: f64) -> Ordering {
    if (a - b).abs() <= tolerance {
        Ordering::Equal
    } else {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}

/// A feature together with its geometry in the local frame.
#[derive(Clone, Debug)]
pub struct ProjectedFeature<'a> {
    /// The feature
    pub feature: &'a Feature,
    /// Projected geometry
    pub geometry: LocalGeometry,
}

impl<'a> ProjectedFeature<'a> {
    /// Project a feature. Returns `None` for degenerate polygons.
    pub fn project(frame: &LocalFrame, feature: &'a Feature) -> Option<Self> {
        LocalGeometry::project(frame, &feature.geometry).map(|geometry| Self { feature, geometry })
    }

    /// Feature id shortcut.
    #[inline]
    pub fn id(&self) -> &FeatureId {
        &self.feature.id
    }

    /// Representative point.
    #[inline]
    pub fn centroid(&self) -> LocalPoint {
        self.geometry.centroid()
    }
}

/// Project every feature, skipping degenerate geometries.
pub fn project_all<'a, I>(frame: &LocalFrame, features: I) -> Vec<ProjectedFeature<'a>>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .filter_map(|f| {
            let projected = ProjectedFeature::project(frame, f);
            if projected.is_none() {
                log::debug!("Skipping degenerate geometry of {}", f.id);
            }
            projected
        })
        .collect()
}

/// Build an R-tree over projected features, keyed by slice position.
pub fn build_index(items: &[ProjectedFeature<'_>]) -> SpatialIndex {
    SpatialIndex::new(
        items
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedFeature::new(i, p.centroid(), p.geometry.envelope()))
            .collect(),
    )
}
