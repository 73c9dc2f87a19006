//! Reattaching per-point attributes to simplified vertices.
//!
//! The simplifier only sees planar coordinates. Timestamps, elevation and
//! the position in the source track are recovered here, either through the
//! retained indices or through an exact coordinate join.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::gpx::Track;
use crate::projection::PlanarPoint;

/// A projected track point together with its source attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    /// Position of the sample in the source track.
    pub index: usize,
    pub planar: PlanarPoint,
    pub ele: Option<f64>,
    pub time: Option<OffsetDateTime>,
}

/// Strategy used to map simplified vertices back to source samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reattach {
    /// Use the indices retained by the simplifier.
    #[default]
    Index,
    /// Exact (x, y) equality join; duplicated samples yield extra rows.
    Coordinates,
}

/// Pair every projected point with the attributes of its source sample.
///
/// `planar` must be the projection of `track`, point for point.
pub fn annotate(planar: &[PlanarPoint], track: &Track) -> Vec<TrackPoint> {
    planar
        .iter()
        .zip(&track.points)
        .enumerate()
        .map(|(index, (p, g))| TrackPoint {
            index,
            planar: *p,
            ele: g.ele,
            time: g.time,
        })
        .collect()
}

/// Select the annotated points at `indices`, in the given order.
///
/// # Panics
///
/// Panics if an index is out of range. Indices come from
/// [`crate::simplify::simplify_indices`] over the same points.
pub fn reattach(indices: &[usize], annotated: &[TrackPoint]) -> Vec<TrackPoint> {
    indices.iter().map(|&i| annotated[i].clone()).collect()
}

/// Equality join on planar coordinates.
///
/// Every original point whose coordinates equal a simplified vertex is
/// returned, so a vertex that occurs several times in the source (a boat
/// sitting still) produces several rows, in source order.
pub fn join_by_coordinates(simplified: &[PlanarPoint], original: &[TrackPoint]) -> Vec<TrackPoint> {
    let mut out = Vec::with_capacity(simplified.len());

    for p in simplified {
        let before = out.len();
        out.extend(original.iter().filter(|o| o.planar == *p).cloned());

        match out.len() - before {
            0 => warn!("simplified vertex {} has no source sample", p),
            1 => {}
            n => debug!("vertex {} matches {} source samples", p, n),
        }
    }
    out
}
