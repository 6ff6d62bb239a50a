//! Feature geometry in geographic coordinates.

use serde::{Deserialize, Serialize};

use super::bounds::GeoBounds;
use super::point::GeoPoint;

/// Geometry class, ordered by richness (point < line < polygon).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeometryClass {
    /// Single position
    Point,
    /// Open polyline
    Line,
    /// Closed footprint
    Polygon,
}

/// Point, polyline, or polygon (exterior ring) in lon/lat degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Single position
    Point(GeoPoint),
    /// Ordered polyline vertices
    LineString(Vec<GeoPoint>),
    /// Exterior ring; the closing vertex may or may not be repeated
    Polygon(Vec<GeoPoint>),
}

impl Geometry {
    /// Geometry class of this geometry.
    pub fn class(&self) -> GeometryClass {
        match self {
            Geometry::Point(_) => GeometryClass::Point,
            Geometry::LineString(_) => GeometryClass::Line,
            Geometry::Polygon(_) => GeometryClass::Polygon,
        }
    }

    /// All vertices.
    pub fn vertices(&self) -> &[GeoPoint] {
        match self {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::LineString(pts) | Geometry::Polygon(pts) => pts,
        }
    }

    /// Check structural validity: finite coordinates and enough vertices.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.vertices().iter().any(|p| !p.is_valid()) {
            return Err("coordinate out of range");
        }
        match self {
            Geometry::Point(_) => Ok(()),
            Geometry::LineString(pts) if pts.len() < 2 => Err("line needs at least 2 vertices"),
            Geometry::Polygon(pts) if open_ring(pts).len() < 3 => {
                Err("polygon needs at least 3 distinct vertices")
            }
            _ => Ok(()),
        }
    }

    /// Bounding box.
    pub fn bounds(&self) -> GeoBounds {
        let mut bounds = GeoBounds::empty();
        for p in self.vertices() {
            bounds.expand_to_include(*p);
        }
        bounds
    }

    /// Representative point in degrees.
    ///
    /// Vertex mean for lines and the open polygon ring. Polygon area
    /// centroids are computed in the local frame by [`crate::spatial`];
    /// this value is only used for coverage checks and projection origins.
    pub fn representative_point(&self) -> GeoPoint {
        let pts = match self {
            Geometry::Point(p) => return *p,
            Geometry::LineString(pts) => pts.as_slice(),
            Geometry::Polygon(pts) => open_ring(pts),
        };
        if pts.is_empty() {
            return GeoPoint::default();
        }
        let n = pts.len() as f64;
        let (lon, lat) = pts
            .iter()
            .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon, lat + p.lat));
        GeoPoint::new(lon / n, lat / n)
    }
}

/// Ring without its repeated closing vertex.
fn open_ring(pts: &[GeoPoint]) -> &[GeoPoint] {
    match (pts.first(), pts.last()) {
        (Some(first), Some(last)) if pts.len() > 1 && first == last => &pts[..pts.len() - 1],
        _ => pts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Geometry {
        Geometry::Polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.001, 0.0),
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.0),
        ])
    }

    #[test]
    fn test_class_ordering() {
        assert!(GeometryClass::Polygon > GeometryClass::Line);
        assert!(GeometryClass::Line > GeometryClass::Point);
        assert_eq!(square().class(), GeometryClass::Polygon);
    }

    #[test]
    fn test_validate() {
        assert!(square().validate().is_ok());
        assert!(Geometry::LineString(vec![GeoPoint::new(0.0, 0.0)]).validate().is_err());
        let degenerate = Geometry::Polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(0.0, 0.0),
        ]);
        assert!(degenerate.validate().is_err());
    }

    #[test]
    fn test_representative_point_ignores_closing_vertex() {
        let c = square().representative_point();
        assert!((c.lon - 0.0005).abs() < 1e-12);
        assert!((c.lat - 0.0005).abs() < 1e-12);
    }
}
