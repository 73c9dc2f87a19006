//! GPX 1.1 track source and sink.
//!
//! Wraps the `gpx` crate. Reading keeps the first track of the file and
//! flattens its segments into one ordered point list; writing produces a
//! single-track, single-segment file that this module can read back.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use ::gpx::{Gpx, GpxVersion, Time, TrackSegment, Waypoint};
use log::{debug, warn};
use time::OffsetDateTime;

use crate::error::{Error, Result};

/// A geographic WGS84 coordinate with optional elevation and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub ele: Option<f64>,
    pub time: Option<OffsetDateTime>,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            ele: None,
            time: None,
        }
    }
}

/// A named, time-ordered sequence of points recorded during one outing.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: Option<String>,
    pub points: Vec<GeoPoint>,
}

/// Parse a GPX document from any reader and return its first track.
pub fn parse<R: Read>(reader: R) -> Result<Track> {
    let gpx = ::gpx::read(reader)?;

    if gpx.tracks.len() > 1 {
        warn!(
            "{} tracks found, only the first one is processed",
            gpx.tracks.len()
        );
    }

    let Some(trk) = gpx.tracks.into_iter().next() else {
        return Err(Error::EmptyTrack);
    };

    let points: Vec<GeoPoint> = trk
        .segments
        .iter()
        .flat_map(|seg| seg.points.iter())
        .map(|wp| GeoPoint {
            lon: wp.point().x(),
            lat: wp.point().y(),
            ele: wp.elevation,
            time: wp.time.clone().map(OffsetDateTime::from),
        })
        .collect();

    if points.is_empty() {
        return Err(Error::EmptyTrack);
    }

    debug!(
        "read track {:?}: {} segment(s), {} points",
        trk.name,
        trk.segments.len(),
        points.len()
    );

    Ok(Track {
        name: trk.name,
        points,
    })
}

/// Read the first track of a GPX file on disk.
pub fn read_track(path: &Path) -> Result<Track> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

/// Serialize `points` as a single-segment GPX 1.1 track.
pub fn write_track<W: Write>(name: Option<&str>, points: &[GeoPoint], writer: W) -> Result<()> {
    let mut segment = TrackSegment::new();
    segment.points = points
        .iter()
        .map(|p| {
            let mut wp = Waypoint::new(geo_types::Point::new(p.lon, p.lat));
            wp.elevation = p.ele;
            wp.time = p.time.map(Time::from);
            wp
        })
        .collect();

    let mut trk = ::gpx::Track::new();
    trk.name = name.map(str::to_owned);
    trk.segments.push(segment);

    let gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(format!("saltpath {}", crate::VERSION)),
        tracks: vec![trk],
        ..Default::default()
    };

    ::gpx::write(&gpx, writer)?;
    Ok(())
}
