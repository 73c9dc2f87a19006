//! `saltpath`: simplify a GPX sailing track and write its tacks.
//!
//! Output goes to `OUTPUT_DIR/DIR_NAME/`, which is recreated on every run:
//! - `simplified_path.gpx`, the simplified track for visual checks
//! - a copy of the raw input file, prefixed with `raw_` if its name
//!   clashes with one of the generated files
//! - `tacks.csv`, one row per leg (and `tacks.json` with `--json`)
//!
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use saltpath::gpx::{parse, write_track};
use saltpath::pipeline::{self, PipelineConfig, DEFAULT_TOLERANCE_M};
use saltpath::projection::{Crs, CrsChoice};
use saltpath::reattach::Reattach;
use saltpath::report::{write_csv, write_json};

const SIMPLIFIED_FILE: &str = "simplified_path.gpx";
const TACKS_CSV: &str = "tacks.csv";
const TACKS_JSON: &str = "tacks.json";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CrsOpt {
    /// Swiss CH1903 / LV03 (EPSG:21781)
    Lv03,
    /// WGS84 / UTM, zone taken from the first point unless --utm-zone is set
    Utm,
}

/// Simplify a track in a GPX file, and output the simplified path and the
/// tacks to an output directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Opts {
    /// Path to the input GPX file
    input_file: PathBuf,
    /// Directory where the output is stored
    output_dir: PathBuf,
    /// Simplification tolerance in meters. Higher values give a track with
    /// fewer points.
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE_M)]
    tolerance: f64,
    /// Name of the output directory for this outing (default: track name)
    #[arg(short, long)]
    dir_name: Option<String>,
    /// Projected coordinate system used for the geometry
    #[arg(long, value_enum, default_value_t = CrsOpt::Lv03)]
    crs: CrsOpt,
    /// Fixed UTM zone, implies --crs utm
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=60))]
    utm_zone: Option<u8>,
    /// The fixed UTM zone is in the southern hemisphere
    #[arg(long, requires = "utm_zone")]
    south: bool,
    /// Match simplified vertices to timestamps by coordinates instead of
    /// by index
    #[arg(long)]
    coordinate_join: bool,
    /// Also write the legs as JSON
    #[arg(long)]
    json: bool,
}

impl Opts {
    fn config(&self) -> PipelineConfig {
        let crs = match (self.utm_zone, self.crs) {
            (Some(zone), _) => CrsChoice::Fixed(Crs::Utm {
                zone,
                north: !self.south,
            }),
            (None, CrsOpt::Utm) => CrsChoice::UtmAuto,
            (None, CrsOpt::Lv03) => CrsChoice::SwissLv03,
        };
        let reattach = if self.coordinate_join {
            Reattach::Coordinates
        } else {
            Reattach::Index
        };

        PipelineConfig {
            tolerance_m: self.tolerance,
            crs,
            reattach,
        }
    }
}

/// Keep a track name from escaping the output directory.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "track".to_string(),
        _ => cleaned,
    }
}

/// File name for the copy of the input, never one of the generated files.
fn raw_copy_name(name: &OsStr) -> OsString {
    if [SIMPLIFIED_FILE, TACKS_CSV, TACKS_JSON]
        .iter()
        .any(|generated| name == OsStr::new(generated))
    {
        let mut renamed = OsString::from("raw_");
        renamed.push(name);
        warn!("input is named {:?}, copying it as {:?}", name, renamed);
        renamed
    } else {
        name.to_owned()
    }
}

fn prepare_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        warn!("removing existing {}", dir.display());
        fs::remove_dir_all(dir).with_context(|| format!("cannot remove {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    env_logger::init();

    if !opts.input_file.is_file() {
        bail!("{}: no such file", opts.input_file.display());
    }

    // Keep the raw bytes, the input may live inside the directory we recreate
    let raw = fs::read(&opts.input_file)
        .with_context(|| format!("cannot read {}", opts.input_file.display()))?;
    let track = parse(raw.as_slice())
        .with_context(|| format!("cannot parse {}", opts.input_file.display()))?;

    let dir_name = match (&opts.dir_name, &track.name) {
        (Some(name), _) => name.clone(),
        (None, Some(name)) => name.clone(),
        (None, None) => {
            let stem = opts
                .input_file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            warn!("track has no name, using {:?}", stem);
            stem
        }
    };

    let config = opts.config();
    let outcome = pipeline::run(&track, &config)?;

    let output_path = opts.output_dir.join(sanitize(&dir_name));
    prepare_dir(&output_path)?;

    info!("writing {}", output_path.display());

    // The input was checked to be a file, so it has a file name
    if let Some(name) = opts.input_file.file_name() {
        fs::write(output_path.join(raw_copy_name(name)), &raw)
            .with_context(|| format!("cannot copy {}", opts.input_file.display()))?;
    }

    let simplified = outcome.simplified_geo()?;
    let file = File::create(output_path.join(SIMPLIFIED_FILE))?;
    write_track(track.name.as_deref(), &simplified, BufWriter::new(file))?;

    let file = File::create(output_path.join(TACKS_CSV))?;
    write_csv(&outcome.legs, BufWriter::new(file))?;

    if opts.json {
        let file = File::create(output_path.join(TACKS_JSON))?;
        write_json(&outcome.legs, BufWriter::new(file))?;
    }

    info!(
        "{} legs written with {} (tolerance {} m)",
        outcome.legs.len(),
        outcome.crs,
        config.tolerance_m
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_names() {
        assert_eq!(sanitize("Morning sail"), "Morning sail");
        assert_eq!(sanitize("a/b\\c"), "a_b_c");
        assert_eq!(sanitize(" .. "), "track");
        assert_eq!(sanitize(""), "track");
    }

    #[test]
    fn raw_copy_never_overwrites_outputs() {
        assert_eq!(raw_copy_name(OsStr::new("lake_run.gpx")), "lake_run.gpx");
        assert_eq!(
            raw_copy_name(OsStr::new("simplified_path.gpx")),
            "raw_simplified_path.gpx"
        );
        assert_eq!(raw_copy_name(OsStr::new("tacks.csv")), "raw_tacks.csv");
        assert_eq!(raw_copy_name(OsStr::new("tacks.json")), "raw_tacks.json");
    }

    #[test]
    fn options_to_config() {
        let opts = Opts::parse_from(["saltpath", "in.gpx", "out"]);
        assert_eq!(opts.config(), PipelineConfig::default());

        let opts = Opts::parse_from(["saltpath", "in.gpx", "out", "-t", "50", "--crs", "utm"]);
        let cfg = opts.config();
        assert_eq!(cfg.tolerance_m, 50.0);
        assert_eq!(cfg.crs, CrsChoice::UtmAuto);

        let opts = Opts::parse_from([
            "saltpath",
            "in.gpx",
            "out",
            "--utm-zone",
            "19",
            "--south",
            "--coordinate-join",
        ]);
        let cfg = opts.config();
        assert_eq!(
            cfg.crs,
            CrsChoice::Fixed(Crs::Utm {
                zone: 19,
                north: false
            })
        );
        assert_eq!(cfg.reattach, Reattach::Coordinates);
    }

    #[test]
    fn utm_zone_out_of_range_rejected() {
        assert!(Opts::try_parse_from(["saltpath", "in.gpx", "out", "--utm-zone", "61"]).is_err());
    }
}
