//! Leg (tack) extraction.
//!
//! Walks a simplified, time-annotated track pairwise and computes the
//! straight-line distance, course, duration and speed of every leg.
//! Geometry is planar: distances are Euclidean in the projected system.

use serde::Serialize;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::projection::PlanarPoint;
use crate::reattach::TrackPoint;

/// Meters per second to knots.
pub const MS_TO_KNOTS: f64 = 1.94384;

/// A straight segment between two consecutive simplified waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    /// Start position, rounded to centimeters.
    pub start_point: PlanarPoint,
    /// End position, rounded to centimeters.
    pub end_point: PlanarPoint,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub distance_m: f64,
    /// Degrees clockwise from +y, in [0, 360).
    pub course_deg: f64,
    pub duration_s: i64,
    pub speed_ms: f64,
    pub speed_kts: f64,
}

/// Compute one leg per consecutive pair of `points`.
///
/// Returns no legs for fewer than two points. Every point must carry a
/// timestamp, and two consecutive points may not share the same second.
pub fn extract_legs(points: &[TrackPoint]) -> Result<Vec<Leg>> {
    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| leg(i, &w[0], &w[1]))
        .collect()
}

fn leg(index: usize, a: &TrackPoint, b: &TrackPoint) -> Result<Leg> {
    let start_time = a.time.ok_or(Error::MissingTimestamp { index: a.index })?;
    let end_time = b.time.ok_or(Error::MissingTimestamp { index: b.index })?;

    let dx = b.planar.x - a.planar.x;
    let dy = b.planar.y - a.planar.y;

    let distance_m = round2(dx.hypot(dy));
    let duration_s = (end_time - start_time).whole_seconds();
    if duration_s == 0 {
        return Err(Error::ZeroDuration { index });
    }
    let speed_ms = distance_m / duration_s as f64;

    Ok(Leg {
        start_point: PlanarPoint::new(round2(a.planar.x), round2(a.planar.y)),
        end_point: PlanarPoint::new(round2(b.planar.x), round2(b.planar.y)),
        start_time,
        end_time,
        distance_m,
        // 359.995 and above round to 360.0, which is north again
        course_deg: round2(course(dx, dy)) % 360.0,
        duration_s,
        speed_ms,
        speed_kts: round2(speed_ms * MS_TO_KNOTS),
    })
}

/// Course of a displacement in degrees [0, 360).
///
/// Measured clockwise from the +y (grid north) axis, hence `dx` comes
/// first in `atan2`.
pub fn course(dx: f64, dy: f64) -> f64 {
    let deg = dx.atan2(dy).to_degrees();
    (deg + 360.0) % 360.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
