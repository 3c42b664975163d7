//! Geometry type definitions

use std::fmt;

use geo::{Coord, Polygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::CoordError;

/// One `{lng, lat}` pair as received on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for Coord<f64> {
    fn from(value: LngLat) -> Self {
        Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

/// A farm boundary.
///
/// Points keep their center and radius for rendering, together with the
/// circular buffer used for area and overlap computations. Geometries are
/// immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum FarmGeometry {
    /// Polygon in WGS84 degrees, `x` = longitude, `y` = latitude
    Polygon(Polygon<f64>),
    /// Point with a radius in meters
    Point {
        center: Coord<f64>,
        radius_meters: f64,
        buffer: Polygon<f64>,
    },
}

impl FarmGeometry {
    /// The areal footprint: the polygon itself or the point's buffer.
    pub fn footprint(&self) -> &Polygon<f64> {
        match self {
            FarmGeometry::Polygon(polygon) => polygon,
            FarmGeometry::Point { buffer, .. } => buffer,
        }
    }

    /// Geometry type name as used in GeoJSON.
    pub fn kind(&self) -> &'static str {
        match self {
            FarmGeometry::Polygon(_) => "Polygon",
            FarmGeometry::Point { .. } => "Point",
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, FarmGeometry::Point { .. })
    }
}

/// Why a geometry fails planar validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Fewer than three distinct vertices
    TooFewPoints { count: usize },
    /// NaN or infinite coordinate
    NonFiniteCoordinate,
    /// Two non-adjacent edges cross or overlap
    SelfIntersection,
    /// The ring returns to a vertex it already visited
    Spike,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::TooFewPoints { count } => write!(
                f,
                "a polygon needs at least 3 distinct vertices (got {})",
                count
            ),
            InvalidReason::NonFiniteCoordinate => write!(f, "coordinate is not a finite number"),
            InvalidReason::SelfIntersection => write!(f, "ring self-intersection"),
            InvalidReason::Spike => write!(f, "ring revisits a vertex"),
        }
    }
}

/// Errors raised while building or measuring geometries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Unsupported or ambiguous geometry type
    #[error("Unsupported geometry type: {0}")]
    GeometryType(String),

    /// Radius and coordinate count do not fit together
    #[error("Invalid geometry parameters: {0}")]
    ParameterValidation(String),

    /// Ring fails planar validity
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(InvalidReason),

    /// Legacy coordinate text could not be read
    #[error("Failed to parse coordinates: {0}")]
    Parse(String),

    #[error(transparent)]
    Projection(#[from] CoordError),

    /// Strict mode only: projected area disagrees with the local reference
    #[error("Area accuracy check failed: {percent_error:.2}% error at latitude {center_lat:.4}")]
    AreaAccuracy { percent_error: f64, center_lat: f64 },
}
