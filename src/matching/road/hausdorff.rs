//! Hausdorff distance between sampled polylines.

use crate::core::LocalPoint;

/// Largest distance from a sample of `a` to its nearest sample of `b`.
pub fn directed_hausdorff(a: &[LocalPoint], b: &[LocalPoint]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }
    a.iter()
        .map(|p| {
            b.iter()
                .map(|q| p.distance_squared(q))
                .fold(f64::INFINITY, f64::min)
        })
        .fold(0.0, f64::max)
        .sqrt()
}

/// Symmetric Hausdorff distance (meters). Infinite when either side is empty.
pub fn hausdorff(a: &[LocalPoint], b: &[LocalPoint]) -> f64 {
    directed_hausdorff(a, b).max(directed_hausdorff(b, a))
}
