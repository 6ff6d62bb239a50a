//! Local planar frame around a geographic origin.

use std::f64::consts::PI;

use crate::core::{GeoBounds, GeoPoint, LocalPoint};

use super::EARTH_RADIUS_M;

/// Equirectangular projection centred on `origin` (x east, y north, meters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    origin: GeoPoint,
    meters_per_deg_lon: f64,
    meters_per_deg_lat: f64,
}

impl LocalFrame {
    /// Frame centred on a point.
    pub fn new(origin: GeoPoint) -> Self {
        let meters_per_deg_lat = EARTH_RADIUS_M * PI / 180.0;
        Self {
            origin,
            meters_per_deg_lon: meters_per_deg_lat * origin.lat.to_radians().cos(),
            meters_per_deg_lat,
        }
    }

    /// Frame centred on the middle of a bounding box (or 0/0 when empty).
    pub fn for_bounds(bounds: &GeoBounds) -> Self {
        if bounds.is_empty() {
            Self::new(GeoPoint::default())
        } else {
            Self::new(bounds.center())
        }
    }

    /// Projection origin.
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Geographic to local meters.
    #[inline]
    pub fn to_local(&self, p: GeoPoint) -> LocalPoint {
        LocalPoint::new(
            (p.lon - self.origin.lon) * self.meters_per_deg_lon,
            (p.lat - self.origin.lat) * self.meters_per_deg_lat,
        )
    }

    /// Local meters back to geographic.
    #[inline]
    pub fn to_geo(&self, p: LocalPoint) -> GeoPoint {
        let lon = if self.meters_per_deg_lon.abs() < f64::EPSILON {
            self.origin.lon
        } else {
            self.origin.lon + p.x / self.meters_per_deg_lon
        };
        GeoPoint::new(lon, self.origin.lat + p.y / self.meters_per_deg_lat)
    }

    /// Project a slice of points.
    pub fn project(&self, points: &[GeoPoint]) -> Vec<LocalPoint> {
        points.iter().map(|p| self.to_local(*p)).collect()
    }
}

impl Default for LocalFrame {
    fn default() -> Self {
        Self::new(GeoPoint::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::haversine_m;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip() {
        let frame = LocalFrame::new(GeoPoint::new(13.4, 52.5));
        let p = GeoPoint::new(13.41, 52.505);
        let back = frame.to_geo(frame.to_local(p));
        assert_relative_eq!(back.lon, p.lon, epsilon = 1e-12);
        assert_relative_eq!(back.lat, p.lat, epsilon = 1e-12);
    }

    #[test]
    fn test_local_distance_matches_haversine() {
        let frame = LocalFrame::new(GeoPoint::new(13.4, 52.5));
        let a = GeoPoint::new(13.400, 52.500);
        let b = GeoPoint::new(13.403, 52.502);
        let local = frame.to_local(a).distance(&frame.to_local(b));
        assert_relative_eq!(local, haversine_m(a, b), max_relative = 1e-3);
    }
}
