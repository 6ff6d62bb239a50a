//! Point types: geographic (lon/lat degrees) and local (meters).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Geographic coordinate in WGS84 degrees.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees (east positive)
    pub lon: f64,
    /// Latitude in degrees (north positive)
    pub lat: f64,
}

impl GeoPoint {
    /// Create a new geographic point
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// True when both coordinates are finite and inside the WGS84 range.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Great-circle distance in meters.
    #[inline]
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        crate::spatial::haversine_m(*self, *other)
    }
}

/// Point in a local planar frame (meters, x east, y north).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    /// Easting in meters
    pub x: f64,
    /// Northing in meters
    pub y: f64,
}

impl LocalPoint {
    /// Create a new local point
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin of the local frame
    pub const ZERO: LocalPoint = LocalPoint { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &LocalPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &LocalPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Vector length from the origin
    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Dot product
    #[inline]
    pub fn dot(&self, other: &LocalPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Linear interpolation towards `other` (t in [0, 1])
    #[inline]
    pub fn lerp(&self, other: &LocalPoint, t: f64) -> LocalPoint {
        LocalPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// As an `[x, y]` array (R-tree coordinate)
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Distance from this point to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: &LocalPoint, b: &LocalPoint) -> f64 {
        let dir = *b - *a;
        let len_sq = dir.dot(&dir);
        if len_sq < f64::EPSILON {
            return self.distance(a);
        }
        let t = ((*self - *a).dot(&dir) / len_sq).clamp(0.0, 1.0);
        self.distance(&a.lerp(b, t))
    }
}

impl Add for LocalPoint {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        LocalPoint::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for LocalPoint {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        LocalPoint::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for LocalPoint {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        LocalPoint::new(self.x * scalar, self.y * scalar)
    }
}
