//! Geographic bounding box.
//!
//! [`GeoBounds`] is used for source coverage (does a snapshot cover this
//! location at all) and for choosing the local projection origin.

use serde::{Deserialize, Serialize};

use super::point::GeoPoint;

/// Axis-aligned lon/lat bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// South-west corner
    pub min: GeoPoint,
    /// North-east corner
    pub max: GeoPoint,
}

impl GeoBounds {
    /// Create bounds from corners.
    #[inline]
    pub const fn new(min: GeoPoint, max: GeoPoint) -> Self {
        Self { min, max }
    }

    /// Create bounds from `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn from_array(bbox: [f64; 4]) -> Self {
        Self::new(
            GeoPoint::new(bbox[0], bbox[1]),
            GeoPoint::new(bbox[2], bbox[3]),
        )
    }

    /// Empty (inverted) bounds that expand to fit any point.
    pub fn empty() -> Self {
        Self {
            min: GeoPoint::new(f64::INFINITY, f64::INFINITY),
            max: GeoPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Check if no point has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.lon > self.max.lon || self.min.lat > self.max.lat
    }

    /// Grow to include a point.
    pub fn expand_to_include(&mut self, p: GeoPoint) {
        self.min.lon = self.min.lon.min(p.lon);
        self.min.lat = self.min.lat.min(p.lat);
        self.max.lon = self.max.lon.max(p.lon);
        self.max.lat = self.max.lat.max(p.lat);
    }

    /// Grow to include other bounds.
    pub fn merge(&mut self, other: &GeoBounds) {
        if other.is_empty() {
            return;
        }
        self.expand_to_include(other.min);
        self.expand_to_include(other.max);
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon >= self.min.lon
            && p.lon <= self.max.lon
            && p.lat >= self.min.lat
            && p.lat <= self.max.lat
    }

    /// Center of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min.lon + self.max.lon) * 0.5,
            (self.min.lat + self.max.lat) * 0.5,
        )
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min.lon, self.min.lat, self.max.lon, self.max.lat]
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::empty()
    }
}
