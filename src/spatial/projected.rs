//! Feature geometry projected into the local frame.

use crate::core::{Geometry, LocalPoint};

use super::frame::LocalFrame;
use super::polygon::{Footprint, envelope_of};

/// A [`Geometry`] in local meters.
#[derive(Clone, Debug)]
pub enum LocalGeometry {
    /// Single position
    Point(LocalPoint),
    /// Polyline vertices
    Line(Vec<LocalPoint>),
    /// Polygon footprint
    Polygon(Footprint),
}

impl LocalGeometry {
    /// Project a geometry. Returns `None` for degenerate polygons.
    pub fn project(frame: &LocalFrame, geometry: &Geometry) -> Option<Self> {
        match geometry {
            Geometry::Point(p) => Some(LocalGeometry::Point(frame.to_local(*p))),
            Geometry::LineString(pts) if pts.is_empty() => None,
            Geometry::LineString(pts) => Some(LocalGeometry::Line(frame.project(pts))),
            Geometry::Polygon(pts) => {
                Footprint::new(&frame.project(pts)).map(LocalGeometry::Polygon)
            }
        }
    }

    /// Representative point: the point itself, the length-weighted line
    /// midpoint, or the polygon area centroid.
    pub fn centroid(&self) -> LocalPoint {
        match self {
            LocalGeometry::Point(p) => *p,
            LocalGeometry::Line(pts) => line_centroid(pts),
            LocalGeometry::Polygon(fp) => fp.centroid(),
        }
    }

    /// Bounding box `(min, max)`.
    pub fn envelope(&self) -> (LocalPoint, LocalPoint) {
        match self {
            LocalGeometry::Point(p) => (*p, *p),
            LocalGeometry::Line(pts) => envelope_of(pts),
            LocalGeometry::Polygon(fp) => fp.envelope(),
        }
    }

    /// Footprint for polygons.
    pub fn as_footprint(&self) -> Option<&Footprint> {
        match self {
            LocalGeometry::Polygon(fp) => Some(fp),
            _ => None,
        }
    }

    /// Vertices for polylines.
    pub fn as_line(&self) -> Option<&[LocalPoint]> {
        match self {
            LocalGeometry::Line(pts) => Some(pts),
            _ => None,
        }
    }
}

fn line_centroid(pts: &[LocalPoint]) -> LocalPoint {
    let mut weighted = LocalPoint::ZERO;
    let mut total = 0.0;
    for w in pts.windows(2) {
        let len = w[0].distance(&w[1]);
        weighted = weighted + w[0].lerp(&w[1], 0.5) * len;
        total += len;
    }
    if total > f64::EPSILON {
        weighted * (1.0 / total)
    } else {
        pts.first().copied().unwrap_or_default()
    }
}
