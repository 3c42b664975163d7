//! Raster error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coord::CoordError;
use crate::geometry::GeometryError;

/// Errors raised while reading, sampling or warping a raster layer.
#[derive(Debug, Error)]
pub enum RasterError {
    /// File missing or unreadable
    #[error("Failed to open raster {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not a readable single-band TIFF
    #[error("Failed to decode raster {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// No affine transform or CRS could be derived from the GeoTIFF tags
    #[error("Raster {} is not georeferenced: {message}", path.display())]
    MissingGeoreference { path: PathBuf, message: String },

    #[error("Unsupported raster CRS: {0}")]
    UnsupportedCrs(String),

    /// The requested area does not intersect the raster
    #[error("Raster has no data overlapping the requested area")]
    NoDataOverlap,

    #[error("Failed to encode raster image: {0}")]
    Encode(String),

    #[error("Invalid tile: {0}")]
    Tile(#[from] CoordError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl RasterError {
    /// True for failures that only mean "nothing to show here".
    ///
    /// Callers omit the layer or report the value as unavailable instead of
    /// failing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RasterError::NoDataOverlap)
    }
}
