//! Geometry and indexing utilities.
//!
//! Everything geometric runs in a [`LocalFrame`]: an equirectangular
//! projection around the dataset origin, in meters. At city scale the
//! distortion is far below the matching thresholds.
//!
//! - [`haversine_m`] / [`polyline_length_m`]: real-world distances from lon/lat
//! - [`Footprint`]: projected polygon with area, containment, hull and overlap
//! - [`sample_polyline`]: fixed-interval arc-length sampling
//! - [`SpatialIndex`]: R-tree over feature envelopes and centroids

mod frame;
mod index;
mod polygon;
mod projected;
mod sampling;

pub use frame::LocalFrame;
pub use index::{IndexedFeature, SpatialIndex};
pub use polygon::Footprint;
pub use projected::LocalGeometry;
pub use sampling::{polyline_length, sample_polyline};

use crate::core::GeoPoint;

/// Mean Earth radius (IUGG), meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two lon/lat points in meters.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Length of a lon/lat polyline in meters.
pub fn polyline_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert_relative_eq!(d, 111_195.0, max_relative = 1e-4);
    }

    #[test]
    fn test_haversine_zero_and_symmetric() {
        let a = GeoPoint::new(13.40, 52.52);
        let b = GeoPoint::new(13.41, 52.53);
        assert_eq!(haversine_m(a, a), 0.0);
        assert_relative_eq!(haversine_m(a, b), haversine_m(b, a), epsilon = 1e-9);
    }

    #[test]
    fn test_polyline_length() {
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.002),
        ];
        assert_relative_eq!(
            polyline_length_m(&pts),
            haversine_m(pts[0], pts[2]),
            max_relative = 1e-9
        );
        assert_eq!(polyline_length_m(&pts[..1]), 0.0);
    }
}
