//! Error type shared by every stage of the pipeline.

use thiserror::Error;

use crate::projection::Crs;

#[derive(Error, Debug)]
pub enum Error {
    #[error("coordinate (lon {lon}, lat {lat}) is outside the valid domain of {crs}")]
    Projection { crs: Crs, lon: f64, lat: f64 },
    #[error("cannot set up transform: {0}")]
    ProjCreate(#[from] proj::ProjCreateError),
    #[error("transform failed: {0}")]
    ProjTransform(#[from] proj::ProjError),
    #[error("tolerance must be strictly positive, got {0}")]
    InvalidTolerance(f64),
    #[error("track contains no points")]
    EmptyTrack,
    #[error("leg {index} has zero duration, speed is undefined")]
    ZeroDuration { index: usize },
    #[error("point {index} has no timestamp")]
    MissingTimestamp { index: usize },
    #[error("GPX error: {0}")]
    Gpx(#[from] ::gpx::errors::GpxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
