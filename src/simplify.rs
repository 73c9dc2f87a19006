//! Polyline simplification.
//!
//! Reduces a dense recorded track to the waypoints that matter using the
//! Ramer-Douglas-Peucker algorithm over planar coordinates. The result is
//! always a subsequence of the input: no point is moved or interpolated,
//! so the retained indices identify the original samples directly.
//!
//! Topology is not preserved, a simplified path may cross itself.

use log::trace;

use crate::error::{Error, Result};
use crate::projection::PlanarPoint;

/// Simplify `points` with Ramer-Douglas-Peucker.
///
/// `tolerance` is the largest perpendicular distance, in the units of the
/// planar system, allowed between a dropped point and the simplified path.
/// Typical values for a sailing track in meters:
/// - 20.0: keeps most tacks and gybes
/// - 200.0: only the long legs of a passage
pub fn simplify(points: &[PlanarPoint], tolerance: f64) -> Result<Vec<PlanarPoint>> {
    let indices = simplify_indices(points, tolerance)?;
    Ok(indices.into_iter().map(|i| points[i]).collect())
}

/// Same as [`simplify`] but returns the indices of the retained points,
/// in increasing order.
///
/// The first and last index are always retained. Inputs of fewer than
/// three points come back whole.
pub fn simplify_indices(points: &[PlanarPoint], tolerance: f64) -> Result<Vec<usize>> {
    // Also rejects NaN
    if !(tolerance > 0.0) {
        return Err(Error::InvalidTolerance(tolerance));
    }

    let n = points.len();
    if n <= 2 {
        return Ok((0..n).collect());
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // Explicit stack of inclusive [first, last] ranges still to examine.
    let mut stack = vec![(0usize, n - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }

        let a = &points[first];
        let b = &points[last];

        // Strict comparison keeps the lowest index on ties
        let mut max_dist = f64::NEG_INFINITY;
        let mut max_idx = first;
        for (i, p) in points.iter().enumerate().take(last).skip(first + 1) {
            let dist = perpendicular_distance(p, a, b);
            if dist > max_dist {
                max_dist = dist;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((max_idx, last));
            stack.push((first, max_idx));
        }
    }

    let kept: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect();

    trace!(
        "simplified {} points to {} with tolerance {}",
        n,
        kept.len(),
        tolerance
    );
    Ok(kept)
}

/// Distance from P to the infinite line through A and B.
///
/// Falls back to the distance from A when A and B coincide, which happens
/// when a track returns to its starting point.
fn perpendicular_distance(p: &PlanarPoint, a: &PlanarPoint, b: &PlanarPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);

    if len == 0.0 {
        return p.distance(a);
    }

    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}
