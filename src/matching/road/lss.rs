//! Longest similar subsequence between two sampled polylines.
//!
//! LCS-style dynamic program in which two samples are "equal" when they are
//! closer than a distance threshold. Only two rows of the table are kept,
//! sized by the shorter sequence.

use crate::core::LocalPoint;

/// Length of the longest similar subsequence of `a` and `b`.
pub fn lss_length(a: &[LocalPoint], b: &[LocalPoint], threshold: f64) -> usize {
    // Iterate the longer sequence in the outer loop
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if inner.is_empty() {
        return 0;
    }

    let threshold_sq = threshold * threshold;
    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];

    for p in outer {
        for (j, q) in inner.iter().enumerate() {
            curr[j + 1] = if p.distance_squared(q) < threshold_sq {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[inner.len()]
}

/// LSS length over the length of the shorter sequence.
///
/// Both orientations of `b` are evaluated and the better one kept, so the
/// digitising direction of either line does not matter.
pub fn lss_ratio(a: &[LocalPoint], b: &[LocalPoint], threshold: f64) -> f64 {
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return 0.0;
    }
    let forward = lss_length(a, b, threshold);
    let best = if forward == shorter {
        forward
    } else {
        let reversed: Vec<LocalPoint> = b.iter().rev().copied().collect();
        forward.max(lss_length(a, &reversed, threshold))
    };
    best as f64 / shorter as f64
}
