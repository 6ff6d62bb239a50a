//! Spatial indexing for candidate search.
//!
//! Uses an R-tree over feature envelopes:
//! - Nearest centroid to a point
//! - Centroids within a radius
//! - Envelopes intersecting a margin-expanded box
//!
//! Distances are measured to the stored centroid. The centroid always lies
//! inside the envelope, so the envelope distance is a valid lower bound for
//! the R-tree's nearest-neighbour search.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::core::LocalPoint;

/// An indexed feature for R-tree storage.
#[derive(Clone, Debug)]
pub struct IndexedFeature {
    /// Index of the feature in the caller's collection.
    pub index: usize,
    /// Representative point.
    pub centroid: LocalPoint,
    min: [f64; 2],
    max: [f64; 2],
}

impl IndexedFeature {
    /// Create a new indexed feature from its centroid and envelope.
    pub fn new(index: usize, centroid: LocalPoint, envelope: (LocalPoint, LocalPoint)) -> Self {
        let (lo, hi) = envelope;
        Self {
            index,
            centroid,
            min: [lo.x.min(centroid.x), lo.y.min(centroid.y)],
            max: [hi.x.max(centroid.x), hi.y.max(centroid.y)],
        }
    }
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for IndexedFeature {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.centroid
            .distance_squared(&LocalPoint::new(point[0], point[1]))
    }
}

/// R-tree spatial index over feature envelopes.
///
/// Read-only once built; each stage builds the indexes it needs.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedFeature>,
}

impl SpatialIndex {
    /// Bulk-load an index.
    pub fn new(items: Vec<IndexedFeature>) -> Self {
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// Create an empty spatial index.
    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }

    /// Number of indexed features.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest centroid to a point.
    ///
    /// Returns (index, distance), or None if the index is empty.
    pub fn nearest(&self, point: LocalPoint) -> Option<(usize, f64)> {
        self.tree
            .nearest_neighbor(&point.to_array())
            .map(|item| (item.index, item.centroid.distance(&point)))
    }

    /// Nearest centroid within `max_distance` whose index satisfies `accept`.
    pub fn nearest_where<F>(
        &self,
        point: LocalPoint,
        max_distance: f64,
        mut accept: F,
    ) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> bool,
    {
        self.tree
            .nearest_neighbor_iter(&point.to_array())
            .map(|item| (item.index, item.centroid.distance(&point)))
            .take_while(|(_, d)| *d <= max_distance)
            .find(|(i, _)| accept(*i))
    }

    /// All centroids within a radius, nearest first.
    pub fn within_distance(&self, point: LocalPoint, max_distance: f64) -> Vec<(usize, f64)> {
        self.tree
            .nearest_neighbor_iter(&point.to_array())
            .map(|item| (item.index, item.centroid.distance(&point)))
            .take_while(|(_, d)| *d <= max_distance)
            .collect()
    }

    /// Features whose envelope intersects the box expanded by `margin`.
    ///
    /// Indices are returned in ascending order.
    pub fn potential_matches(
        &self,
        envelope: (LocalPoint, LocalPoint),
        margin: f64,
    ) -> Vec<usize> {
        let (lo, hi) = envelope;
        let aabb = AABB::from_corners(
            [lo.x - margin, lo.y - margin],
            [hi.x + margin, hi.y + margin],
        );
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|item| item.index)
            .collect();
        hits.sort_unstable();
        hits
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_item(index: usize, x: f64, y: f64) -> IndexedFeature {
        let p = LocalPoint::new(x, y);
        IndexedFeature::new(index, p, (p, p))
    }

    fn sample_index() -> SpatialIndex {
        SpatialIndex::new(vec![
            point_item(0, 0.0, 0.0),
            point_item(1, 10.0, 0.0),
            point_item(2, 100.0, 0.0),
        ])
    }

    #[test]
    fn test_nearest() {
        let index = sample_index();
        let (i, d) = index.nearest(LocalPoint::new(8.0, 0.0)).unwrap();
        assert_eq!(i, 1);
        assert!((d - 2.0).abs() < 1e-9);
        assert!(SpatialIndex::empty().nearest(LocalPoint::ZERO).is_none());
    }

    #[test]
    fn test_within_distance_sorted() {
        let index = sample_index();
        let hits = index.within_distance(LocalPoint::new(1.0, 0.0), 20.0);
        let ids: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_nearest_where_skips_rejected() {
        let index = sample_index();
        let hit = index.nearest_where(LocalPoint::ZERO, 50.0, |i| i != 0);
        assert_eq!(hit.map(|(i, _)| i), Some(1));
        assert!(index.nearest_where(LocalPoint::ZERO, 50.0, |i| i == 2).is_none());
    }

    #[test]
    fn test_potential_matches_margin() {
        let index = sample_index();
        let query = LocalPoint::new(50.0, 0.0);
        assert!(index.potential_matches((query, query), 10.0).is_empty());
        assert_eq!(index.potential_matches((query, query), 50.0), vec![0, 1, 2]);
    }
}
