//! End-to-end track processing.
//!
//! project -> simplify -> reattach -> extract legs, driven by an explicit
//! [`PipelineConfig`].

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gpx::{GeoPoint, Track};
use crate::legs::{extract_legs, Leg};
use crate::projection::{to_geographic, to_planar, Crs, CrsChoice, PlanarPoint};
use crate::reattach::{annotate, join_by_coordinates, reattach, Reattach, TrackPoint};
use crate::simplify::simplify_indices;

/// Default simplification tolerance, in meters.
pub const DEFAULT_TOLERANCE_M: f64 = 200.0;

/// Settings for one [`run`]. Missing fields take their defaults when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Simplification tolerance in meters, strictly positive.
    pub tolerance_m: f64,
    /// Projected system for the geometry, LV03 unless set.
    pub crs: CrsChoice,
    /// How simplified vertices get their timestamps back.
    pub reattach: Reattach,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tolerance_m: DEFAULT_TOLERANCE_M,
            crs: CrsChoice::default(),
            reattach: Reattach::default(),
        }
    }
}

/// Result of processing one track.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub crs: Crs,
    /// Simplified points with their source attributes, in track order.
    pub simplified: Vec<TrackPoint>,
    pub legs: Vec<Leg>,
}

impl Outcome {
    /// Simplified points back in WGS84, with elevation and time attached.
    pub fn simplified_geo(&self) -> Result<Vec<GeoPoint>> {
        let planar: Vec<PlanarPoint> = self.simplified.iter().map(|p| p.planar).collect();
        let mut geo = to_geographic(&planar, self.crs)?;
        for (g, p) in geo.iter_mut().zip(&self.simplified) {
            g.ele = p.ele;
            g.time = p.time;
        }
        Ok(geo)
    }
}

/// Run the whole pipeline over `track`.
pub fn run(track: &Track, config: &PipelineConfig) -> Result<Outcome> {
    if track.points.is_empty() {
        return Err(Error::EmptyTrack);
    }

    let crs = config.crs.resolve(track)?;
    let planar = to_planar(track, crs)?;
    debug!("projected {} points to {}", planar.len(), crs);

    let indices = simplify_indices(&planar, config.tolerance_m)?;
    let annotated = annotate(&planar, track);

    let simplified = match config.reattach {
        Reattach::Index => reattach(&indices, &annotated),
        Reattach::Coordinates => {
            let vertices: Vec<PlanarPoint> = indices.iter().map(|&i| planar[i]).collect();
            join_by_coordinates(&vertices, &annotated)
        }
    };

    let legs = extract_legs(&simplified)?;
    info!(
        "{} points simplified to {} with tolerance {} m, {} legs",
        track.points.len(),
        simplified.len(),
        config.tolerance_m,
        legs.len()
    );

    Ok(Outcome {
        crs,
        simplified,
        legs,
    })
}
