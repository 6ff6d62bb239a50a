//! Arc-length sampling of local polylines.

use crate::core::LocalPoint;

/// Total length of a local polyline.
pub fn polyline_length(points: &[LocalPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Sample a polyline every `interval` meters of arc length.
///
/// The first and last vertices are always included. A zero-length line
/// yields a single point; an empty line yields nothing. A non-positive
/// interval returns the vertices unchanged.
pub fn sample_polyline(points: &[LocalPoint], interval: f64) -> Vec<LocalPoint> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if interval <= 0.0 {
        return points.to_vec();
    }

    let total = polyline_length(points);
    if total < f64::EPSILON {
        return vec![first];
    }

    let mut samples = Vec::with_capacity(capacity_hint(total, interval));
    samples.push(first);

    // Arc length at which the next sample falls
    let mut next = interval;
    // Arc length at the start of the current segment
    let mut walked = 0.0;

    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg = a.distance(&b);
        if seg < f64::EPSILON {
            continue;
        }
        while next < walked + seg && next < total {
            samples.push(a.lerp(&b, (next - walked) / seg));
            next += interval;
        }
        walked += seg;
    }

    if let Some(&last) = points.last()
        && samples.last().is_none_or(|s| s.distance(&last) > 1e-9)
    {
        samples.push(last);
    }
    samples
}

/// Expected sample count, capped so tiny intervals cannot overflow it.
fn capacity_hint(total: f64, interval: f64) -> usize {
    const MAX_HINT: usize = 1 << 16;
    ((total / interval).ceil() as usize)
        .saturating_add(2)
        .min(MAX_HINT)
}
