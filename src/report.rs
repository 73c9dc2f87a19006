//! Leg table output.
//!
//! One CSV row per leg with a header row and no index column. Points are
//! written as `(x, y)` and timestamps as RFC 3339. The same legs can also
//! be dumped as a JSON array.

use std::io::Write;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::error::Result;
use crate::legs::Leg;

pub const CSV_HEADER: [&str; 9] = [
    "start_point",
    "end_point",
    "start_time",
    "end_time",
    "distance_m",
    "course_deg",
    "duration_s",
    "speed_ms",
    "speed_kts",
];

#[derive(Serialize)]
struct LegRow {
    start_point: String,
    end_point: String,
    start_time: String,
    end_time: String,
    distance_m: f64,
    course_deg: f64,
    duration_s: i64,
    speed_ms: f64,
    speed_kts: f64,
}

impl LegRow {
    fn from_leg(leg: &Leg) -> Result<Self> {
        Ok(LegRow {
            start_point: leg.start_point.to_string(),
            end_point: leg.end_point.to_string(),
            start_time: leg.start_time.format(&Rfc3339)?,
            end_time: leg.end_time.format(&Rfc3339)?,
            distance_m: leg.distance_m,
            course_deg: leg.course_deg,
            duration_s: leg.duration_s,
            speed_ms: leg.speed_ms,
            speed_kts: leg.speed_kts,
        })
    }
}

/// Write the leg table as CSV. The header is written even without legs.
pub fn write_csv<W: Write>(legs: &[Leg], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for leg in legs {
        wtr.serialize(LegRow::from_leg(leg)?)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the legs as a pretty-printed JSON array.
pub fn write_json<W: Write>(legs: &[Leg], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, legs)?;
    Ok(())
}
