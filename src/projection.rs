//! Geodetic projection between WGS84 longitude/latitude and planar
//! metric coordinates.
//!
//! Transforms go through PROJ, keyed by the EPSG code of the target
//! system. Two projected systems are supported:
//! - Swiss LV03 (EPSG:21781).
//! - WGS84 / UTM (EPSG:326zz north, EPSG:327zz south).
//!
//! Planar `x` is the easting and `y` the northing, both in meters, so
//! Euclidean distances approximate ground distances over a track.

use std::fmt;

use log::debug;
use proj::Proj;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gpx::{GeoPoint, Track};

/// A point in a projected coordinate system, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    /// Point at easting `x` and northing `y`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`, in meters.
    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl fmt::Display for PlanarPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A projected coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crs {
    /// CH1903 / LV03, EPSG:21781.
    SwissLv03,
    /// WGS84 / UTM, EPSG:326zz (north) or EPSG:327zz (south).
    Utm { zone: u8, north: bool },
}

/// How the projected system is picked for a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsChoice {
    #[default]
    SwissLv03,
    /// UTM zone of the first track point.
    UtmAuto,
    Fixed(Crs),
}

impl CrsChoice {
    /// The concrete system to use for `track`.
    ///
    /// `UtmAuto` looks at the first point and fails with
    /// [`Error::EmptyTrack`] when there is none.
    pub fn resolve(&self, track: &Track) -> Result<Crs> {
        match self {
            CrsChoice::SwissLv03 => Ok(Crs::SwissLv03),
            CrsChoice::Fixed(crs) => Ok(*crs),
            CrsChoice::UtmAuto => {
                let first = track.points.first().ok_or(Error::EmptyTrack)?;
                let crs = Crs::utm_for(first.lon, first.lat);
                debug!("selected {} from first point", crs);
                Ok(crs)
            }
        }
    }
}

// EPSG:21781 area of use.
const LV03_LON: (f64, f64) = (5.96, 10.49);
const LV03_LAT: (f64, f64) = (45.82, 47.81);

const UTM_LAT: (f64, f64) = (-80.0, 84.0);
const UTM_MAX_DLON: f64 = 6.0;

const WGS84: &str = "EPSG:4326";

impl Crs {
    /// UTM zone and hemisphere containing the given coordinate.
    pub fn utm_for(lon: f64, lat: f64) -> Crs {
        let zone = (((lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) + 1;
        Crs::Utm {
            zone: zone as u8,
            north: lat >= 0.0,
        }
    }

    /// EPSG code of this system.
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::SwissLv03 => 21781,
            Crs::Utm { zone, north: true } => 32600 + *zone as u32,
            Crs::Utm { zone, north: false } => 32700 + *zone as u32,
        }
    }

    /// Project a single WGS84 coordinate into this system.
    ///
    /// Builds a fresh [`Projector`]; use one directly for many points.
    pub fn project(&self, lon: f64, lat: f64) -> Result<PlanarPoint> {
        Projector::new(*self)?.project(lon, lat)
    }

    /// Inverse of [`Crs::project`], returning `(lon, lat)` in degrees.
    pub fn unproject(&self, p: PlanarPoint) -> Result<(f64, f64)> {
        Projector::new(*self)?.unproject(p)
    }

    fn check_domain(&self, lon: f64, lat: f64) -> Result<()> {
        let inside = lon.is_finite()
            && lat.is_finite()
            && match self {
                Crs::SwissLv03 => {
                    (LV03_LON.0..=LV03_LON.1).contains(&lon)
                        && (LV03_LAT.0..=LV03_LAT.1).contains(&lat)
                }
                Crs::Utm { zone, .. } => {
                    let dlon = (lon - central_meridian(*zone) + 180.0).rem_euclid(360.0) - 180.0;
                    (UTM_LAT.0..=UTM_LAT.1).contains(&lat) && dlon.abs() <= UTM_MAX_DLON
                }
            };
        if inside {
            Ok(())
        } else {
            Err(Error::Projection {
                crs: *self,
                lon,
                lat,
            })
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::SwissLv03 => write!(f, "EPSG:{} (CH1903 / LV03)", self.epsg()),
            Crs::Utm { zone, north } => write!(
                f,
                "EPSG:{} (UTM zone {}{})",
                self.epsg(),
                zone,
                if *north { 'N' } else { 'S' }
            ),
        }
    }
}

/// Forward and inverse PROJ transforms between WGS84 and one [`Crs`].
pub struct Projector {
    crs: Crs,
    forward: Proj,
    inverse: Proj,
}

impl Projector {
    pub fn new(crs: Crs) -> Result<Self> {
        let target = format!("EPSG:{}", crs.epsg());
        // known CRS transforms are normalized to (lon, lat) / (east, north) order
        let forward = Proj::new_known_crs(WGS84, &target, None)?;
        let inverse = Proj::new_known_crs(&target, WGS84, None)?;
        Ok(Self {
            crs,
            forward,
            inverse,
        })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Project a WGS84 coordinate, rejecting it outside the system's domain.
    pub fn project(&self, lon: f64, lat: f64) -> Result<PlanarPoint> {
        self.crs.check_domain(lon, lat)?;
        let (x, y) = self.forward.convert((lon, lat))?;
        Ok(PlanarPoint::new(x, y))
    }

    /// Back to `(lon, lat)`; the result must fall inside the domain.
    pub fn unproject(&self, p: PlanarPoint) -> Result<(f64, f64)> {
        let (lon, lat) = self.inverse.convert((p.x, p.y))?;
        self.crs.check_domain(lon, lat)?;
        Ok((lon, lat))
    }
}

/// Project every point of `track` into `crs`, keeping order.
pub fn to_planar(track: &Track, crs: Crs) -> Result<Vec<PlanarPoint>> {
    let projector = Projector::new(crs)?;
    track
        .points
        .iter()
        .map(|p| projector.project(p.lon, p.lat))
        .collect()
}

/// Project planar points back to WGS84. Elevation and time are left
/// empty, callers attach them from the source track.
pub fn to_geographic(points: &[PlanarPoint], crs: Crs) -> Result<Vec<GeoPoint>> {
    let projector = Projector::new(crs)?;
    points
        .iter()
        .map(|p| {
            let (lon, lat) = projector.unproject(*p)?;
            Ok(GeoPoint::new(lon, lat))
        })
        .collect()
}

fn central_meridian(zone: u8) -> f64 {
    zone as f64 * 6.0 - 183.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(coords: &[(f64, f64)]) -> Track {
        Track {
            name: None,
            points: coords.iter().map(|&(lon, lat)| GeoPoint::new(lon, lat)).collect(),
        }
    }

    #[test]
    fn lv03_matches_swisstopo_reference() {
        // swisstopo reference point near Bern
        let lat = 46.0 + 2.0 / 60.0 + 38.87 / 3600.0;
        let lon = 8.0 + 43.0 / 60.0 + 49.79 / 3600.0;
        let p = Crs::SwissLv03.project(lon, lat).unwrap();
        assert!((p.x - 700_000.0).abs() < 1.0, "easting {}", p.x);
        assert!((p.y - 100_000.0).abs() < 1.0, "northing {}", p.y);
    }

    #[test]
    fn lv03_round_trip() {
        for &(lon, lat) in &[(8.6, 47.3), (6.5, 46.4), (9.0, 46.0)] {
            let p = Crs::SwissLv03.project(lon, lat).unwrap();
            let (lon2, lat2) = Crs::SwissLv03.unproject(p).unwrap();
            assert!((lon - lon2).abs() < 1e-7, "lon {lon} -> {lon2}");
            assert!((lat - lat2).abs() < 1e-7, "lat {lat} -> {lat2}");
        }
    }

    #[test]
    fn lv03_rejects_points_outside_switzerland() {
        let err = Crs::SwissLv03.project(2.35, 48.85).unwrap_err();
        assert!(matches!(err, Error::Projection { .. }));
    }

    #[test]
    fn lv03_rejects_non_finite() {
        assert!(Crs::SwissLv03.project(f64::NAN, 46.5).is_err());
    }

    #[test]
    fn utm_central_meridian_on_equator() {
        let crs = Crs::Utm { zone: 31, north: true };
        let p = crs.project(3.0, 0.0).unwrap();
        assert!((p.x - 500_000.0).abs() < 1e-3);
        assert!(p.y.abs() < 1e-3);
    }

    #[test]
    fn utm_known_point() {
        // Paris, zone 31N
        let crs = Crs::utm_for(2.2945, 48.8584);
        assert_eq!(crs, Crs::Utm { zone: 31, north: true });
        let p = crs.project(2.2945, 48.8584).unwrap();
        assert!((p.x - 448_252.0).abs() < 0.5, "easting {}", p.x);
        assert!((p.y - 5_411_954.9).abs() < 0.5, "northing {}", p.y);
    }

    #[test]
    fn utm_round_trip_both_hemispheres() {
        for &(lon, lat) in &[(6.5, 46.4), (-70.6, -33.4), (151.2, -33.85)] {
            let crs = Crs::utm_for(lon, lat);
            let p = crs.project(lon, lat).unwrap();
            let (lon2, lat2) = crs.unproject(p).unwrap();
            assert!((lon - lon2).abs() < 1e-7);
            assert!((lat - lat2).abs() < 1e-7);
        }
    }

    #[test]
    fn utm_zone_selection() {
        assert_eq!(Crs::utm_for(-180.0, 10.0), Crs::Utm { zone: 1, north: true });
        assert_eq!(Crs::utm_for(179.9, -10.0), Crs::Utm { zone: 60, north: false });
        assert_eq!(Crs::Utm { zone: 32, north: true }.epsg(), 32632);
        assert_eq!(Crs::Utm { zone: 19, north: false }.epsg(), 32719);
    }

    #[test]
    fn utm_rejects_far_from_zone() {
        let crs = Crs::Utm { zone: 32, north: true };
        assert!(crs.project(30.0, 46.0).is_err());
        assert!(crs.project(9.0, 85.0).is_err());
    }

    #[test]
    fn to_planar_and_back() {
        let t = track(&[(6.50, 46.40), (6.51, 46.41), (6.52, 46.40)]);
        let crs = Crs::SwissLv03;
        let planar = to_planar(&t, crs).unwrap();
        assert_eq!(planar.len(), 3);
        // ~1.5 km eastward between the first and last point
        let d = planar[0].distance(&planar[2]);
        assert!((d - 1534.0).abs() < 20.0, "distance {d}");

        let geo = to_geographic(&planar, crs).unwrap();
        for (a, b) in t.points.iter().zip(&geo) {
            assert!((a.lon - b.lon).abs() < 1e-7);
            assert!((a.lat - b.lat).abs() < 1e-7);
        }
    }

    #[test]
    fn projector_matches_single_point_calls() {
        let crs = Crs::Utm { zone: 32, north: true };
        let projector = Projector::new(crs).unwrap();
        assert_eq!(projector.crs(), crs);
        for &(lon, lat) in &[(8.5, 47.4), (9.2, 45.5), (7.1, 50.0)] {
            assert_eq!(projector.project(lon, lat).unwrap(), crs.project(lon, lat).unwrap());
        }
    }

    #[test]
    fn unproject_rejects_results_outside_domain() {
        // Far west of Switzerland in LV03 grid terms
        let err = Crs::SwissLv03
            .unproject(PlanarPoint::new(100_000.0, 200_000.0))
            .unwrap_err();
        assert!(matches!(err, Error::Projection { .. }));
    }

    #[test]
    fn to_planar_fails_on_any_bad_point() {
        let t = track(&[(6.5, 46.4), (-3.0, 40.0)]);
        assert!(matches!(
            to_planar(&t, Crs::SwissLv03),
            Err(Error::Projection { .. })
        ));
    }

    #[test]
    fn auto_choice_uses_first_point() {
        let t = track(&[(-122.4, 37.8)]);
        let crs = CrsChoice::UtmAuto.resolve(&t).unwrap();
        assert_eq!(crs, Crs::Utm { zone: 10, north: true });

        let empty = track(&[]);
        assert!(matches!(
            CrsChoice::UtmAuto.resolve(&empty),
            Err(Error::EmptyTrack)
        ));
        assert_eq!(CrsChoice::default().resolve(&empty).unwrap(), Crs::SwissLv03);
    }
}
