//! Coordinate type definitions

use std::f64::consts::PI;
use std::fmt;

/// Web Mercator latitude limit applied before any projection math.
pub const MAX_LAT: f64 = 85.0511;
pub const MIN_LAT: f64 = -85.0511;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Protocol zoom range of the static map provider.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 21;

/// Edge length of one Web Mercator tile in pixels.
///
/// The whole world is `TILE_SIZE · 2^zoom` pixels wide at a given zoom.
pub const TILE_SIZE: u32 = 256;

/// WGS84 equatorial radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Equatorial circumference used for the pixels-per-meter scale.
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_000.0;

/// Approximate length of one degree of latitude in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Half the width of the EPSG:3857 world in meters.
pub const WEB_MERCATOR_EXTENT: f64 = PI * EARTH_RADIUS_METERS;

/// Pixel position in global Web Mercator pixel space.
///
/// `(0, 0)` is the north-west corner of the world at the given zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCoord {
    pub x: f64,
    pub y: f64,
}

/// XYZ tile address as used by slippy-map tile servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column, 0 at the antimeridian, increasing eastwards
    pub x: u32,
    /// Row, 0 at the north edge, increasing southwards
    pub y: u32,
    /// Zoom level
    pub zoom: u8,
}

/// Output raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Multiplies both dimensions, used for oversampled rendering.
    pub fn scaled(&self, factor: u32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(500, 500)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Longitude extent in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Midpoint as `(lat, lon)`.
    ///
    /// A box whose `min_lon` exceeds `max_lon` crosses the antimeridian and
    /// its longitude midpoint is taken across the wrap.
    pub fn center(&self) -> (f64, f64) {
        let lat = (self.min_lat + self.max_lat) / 2.0;
        let lon = if self.min_lon > self.max_lon {
            let lon = (self.min_lon + self.max_lon + 360.0) / 2.0;
            if lon > 180.0 {
                lon - 360.0
            } else {
                lon
            }
        } else {
            (self.min_lon + self.max_lon) / 2.0
        };
        (lat, lon)
    }
}

/// Axis-aligned rectangle in EPSG:3857 meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MercatorBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the two rectangles share any area or edge.
    pub fn intersects(&self, other: &MercatorBounds) -> bool {
        !(self.min_x > other.max_x
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.max_y < other.min_y)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Zoom level is outside valid range (0 to 21)
    InvalidZoom(u8),
    /// Tile column or row does not exist at the given zoom
    InvalidTile { x: u32, y: u32, zoom: u8 },
    /// Projection parameters or inputs cannot be projected
    Projection(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::InvalidTile { x, y, zoom } => {
                write!(f, "Tile {}/{}/{} does not exist", zoom, x, y)
            }
            CoordError::Projection(msg) => write!(f, "Projection failed: {}", msg),
        }
    }
}

impl std::error::Error for CoordError {}
