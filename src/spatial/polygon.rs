//! Projected polygon footprints.
//!
//! Area, hull, containment and boolean intersection come from the `geo`
//! crate; the footprint caches area and centroid since every matcher asks
//! for them repeatedly.

use geo::{Area, BooleanOps, Centroid, Contains, ConvexHull, Coord, LineString, Point, Polygon};

use crate::core::LocalPoint;

/// Simple polygon in local meters (exterior ring only).
#[derive(Clone, Debug)]
pub struct Footprint {
    polygon: Polygon<f64>,
    ring: Vec<LocalPoint>,
    area: f64,
    centroid: LocalPoint,
}

impl Footprint {
    /// Build from an open or closed ring.
    ///
    /// Returns `None` for rings with fewer than three distinct vertices or
    /// zero area.
    pub fn new(ring: &[LocalPoint]) -> Option<Self> {
        let mut ring: Vec<LocalPoint> = ring.to_vec();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return None;
        }

        let coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
        let polygon = Polygon::new(LineString::new(coords), vec![]);
        let area = polygon.unsigned_area();
        if area.is_nan() || area <= f64::EPSILON {
            return None;
        }
        let centroid = polygon
            .centroid()
            .map(|c| LocalPoint::new(c.x(), c.y()))
            .unwrap_or_else(|| vertex_mean(&ring));

        Some(Self {
            polygon,
            ring,
            area,
            centroid,
        })
    }

    /// Open exterior ring.
    pub fn ring(&self) -> &[LocalPoint] {
        &self.ring
    }

    /// Area in square meters.
    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Area centroid.
    #[inline]
    pub fn centroid(&self) -> LocalPoint {
        self.centroid
    }

    /// Bounding box `(min, max)`.
    pub fn envelope(&self) -> (LocalPoint, LocalPoint) {
        envelope_of(&self.ring)
    }

    /// Strict interior containment.
    pub fn contains(&self, p: LocalPoint) -> bool {
        self.polygon.contains(&Point::new(p.x, p.y))
    }

    /// Distance from a point to the polygon boundary.
    pub fn boundary_distance(&self, p: LocalPoint) -> f64 {
        let n = self.ring.len();
        (0..n)
            .map(|i| p.distance_to_segment(&self.ring[i], &self.ring[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance from a point to the footprint: 0 inside, else to the boundary.
    pub fn distance_to(&self, p: LocalPoint) -> f64 {
        if self.contains(p) {
            0.0
        } else {
            self.boundary_distance(p)
        }
    }

    /// Convex hull as a footprint.
    pub fn convex_hull(&self) -> Footprint {
        let hull = self.polygon.convex_hull();
        let ring: Vec<LocalPoint> = hull
            .exterior()
            .coords()
            .map(|c| LocalPoint::new(c.x, c.y))
            .collect();
        // A valid polygon always has a non-degenerate hull
        Footprint::new(&ring).unwrap_or_else(|| self.clone())
    }

    /// Area of the intersection with another footprint.
    pub fn intersection_area(&self, other: &Footprint) -> f64 {
        if !envelopes_overlap(self.envelope(), other.envelope()) {
            return 0.0;
        }
        self.polygon.intersection(&other.polygon).unsigned_area()
    }

    /// Intersection over union.
    pub fn iou(&self, other: &Footprint) -> f64 {
        let inter = self.intersection_area(other);
        let union = self.area + other.area - inter;
        if union > 0.0 { inter / union } else { 0.0 }
    }

    /// Intersection area divided by the area of the smaller footprint.
    pub fn overlap_ratio(&self, other: &Footprint) -> f64 {
        let smaller = self.area.min(other.area);
        if smaller > 0.0 {
            (self.intersection_area(other) / smaller).min(1.0)
        } else {
            0.0
        }
    }
}

/// Bounding box `(min, max)` of a point set.
pub(crate) fn envelope_of(points: &[LocalPoint]) -> (LocalPoint, LocalPoint) {
    let mut min = LocalPoint::new(f64::INFINITY, f64::INFINITY);
    let mut max = LocalPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

fn envelopes_overlap(a: (LocalPoint, LocalPoint), b: (LocalPoint, LocalPoint)) -> bool {
    a.0.x <= b.1.x && b.0.x <= a.1.x && a.0.y <= b.1.y && b.0.y <= a.1.y
}

fn vertex_mean(points: &[LocalPoint]) -> LocalPoint {
    let n = points.len().max(1) as f64;
    let sum = points.iter().fold(LocalPoint::ZERO, |acc, p| acc + *p);
    sum * (1.0 / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Footprint {
        Footprint::new(&[
            LocalPoint::new(x0, y0),
            LocalPoint::new(x1, y0),
            LocalPoint::new(x1, y1),
            LocalPoint::new(x0, y1),
        ])
        .unwrap()
    }

    #[test]
    fn test_area_and_centroid() {
        let r = rect(0.0, 0.0, 10.0, 20.0);
        assert_relative_eq!(r.area(), 200.0);
        assert_relative_eq!(r.centroid().x, 5.0);
        assert_relative_eq!(r.centroid().y, 10.0);
    }

    #[test]
    fn test_degenerate_rejected() {
        assert!(
            Footprint::new(&[
                LocalPoint::new(0.0, 0.0),
                LocalPoint::new(1.0, 0.0),
                LocalPoint::new(2.0, 0.0),
            ])
            .is_none()
        );
    }

    #[test]
    fn test_distance_to() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(r.distance_to(LocalPoint::new(5.0, 5.0)), 0.0);
        assert_relative_eq!(r.distance_to(LocalPoint::new(13.0, 5.0)), 3.0);
        assert_relative_eq!(r.boundary_distance(LocalPoint::new(5.0, 4.0)), 4.0);
    }

    #[test]
    fn test_overlap_measures() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 0.0, 15.0, 10.0);
        assert_relative_eq!(a.intersection_area(&b), 50.0, epsilon = 1e-6);
        assert_relative_eq!(a.iou(&b), 50.0 / 150.0, epsilon = 1e-9);
        assert_relative_eq!(a.overlap_ratio(&b), 0.5, epsilon = 1e-9);

        let far = rect(100.0, 100.0, 110.0, 110.0);
        assert_eq!(a.iou(&far), 0.0);
    }

    #[test]
    fn test_convex_hull_of_l_shape() {
        let l = Footprint::new(&[
            LocalPoint::new(0.0, 0.0),
            LocalPoint::new(10.0, 0.0),
            LocalPoint::new(10.0, 2.0),
            LocalPoint::new(2.0, 2.0),
            LocalPoint::new(2.0, 10.0),
            LocalPoint::new(0.0, 10.0),
        ])
        .unwrap();
        let hull = l.convex_hull();
        assert!(hull.area() > l.area());
        let notch = LocalPoint::new(5.0, 5.0);
        assert!(!l.contains(notch));
        assert!(hull.contains(notch));
    }
}
