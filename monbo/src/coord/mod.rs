//! Coordinate conversion module
//!
//! Pure numeric helpers shared by the geometry, raster and rendering code:
//!
//! - latitude clamping and longitude normalization for Web Mercator safety
//! - meters ↔ degrees conversion around a latitude
//! - global pixel coordinates at `256·2^zoom` resolution and back
//! - EPSG:3857 meters and XYZ tile bounds
//! - zoom selection and image bounds for a static map viewport ([`zoom`])
//! - Albers equal-area projection for area measurement ([`albers`])

mod albers;
mod types;
mod zoom;

pub use albers::{AlbersParams, AlbersProjection};
pub use types::{
    BoundingBox, CoordError, ImageSize, MercatorBounds, PixelCoord, TileCoord,
    EARTH_CIRCUMFERENCE_METERS, EARTH_RADIUS_METERS, MAX_LAT, MAX_LON, MAX_ZOOM,
    METERS_PER_DEGREE, MIN_LAT, MIN_LON, MIN_ZOOM, TILE_SIZE, WEB_MERCATOR_EXTENT,
};
pub use zoom::{
    calculate_zoom_from_bounds, get_image_bounds, zoom_from_dimensions, ZoomRange, ZOOM_BOOST,
};

use std::f64::consts::PI;

/// Cosine below which longitude scaling is considered degenerate.
const POLAR_COS_EPSILON: f64 = 0.001;

/// Clamps a latitude into the Web Mercator range.
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

/// Wraps a longitude into `[-180, 180)`.
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Clamps latitude and normalizes longitude in one step.
///
/// Returns `(lat, lon)`.
#[inline]
pub fn validate_coordinates(lat: f64, lon: f64) -> (f64, f64) {
    (clamp_latitude(lat), normalize_longitude(lon))
}

/// Clamps a signed zoom value into the protocol range.
#[inline]
pub fn clamp_zoom(zoom: i32) -> u8 {
    zoom.clamp(MIN_ZOOM as i32, MAX_ZOOM as i32) as u8
}

/// Converts a distance in meters to degree deltas around `lat`.
///
/// # Returns
///
/// `(lat_degrees, lon_degrees)`. Close to the poles, where the longitude
/// scale is degenerate, the longitude delta equals the latitude delta.
pub fn meters_to_degrees(meters: f64, lat: f64) -> (f64, f64) {
    let lat_degrees = meters / (2.0 * PI * EARTH_RADIUS_METERS) * 360.0;
    let cos_lat = lat.to_radians().cos();

    let lon_degrees = if cos_lat.abs() > POLAR_COS_EPSILON {
        lat_degrees / cos_lat
    } else {
        lat_degrees
    };

    (lat_degrees, lon_degrees)
}

/// Converts geographic coordinates to global pixel coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees, clamped to ±85.0511
/// * `lon` - Longitude in degrees, normalized to `[-180, 180)`
/// * `zoom` - Zoom level, clamped to 0–21
#[inline]
pub fn lat_lon_to_pixel(lat: f64, lon: f64, zoom: u8) -> PixelCoord {
    let (lat, lon) = validate_coordinates(lat, lon);
    let scale = world_size(zoom);

    let x = (lon + 180.0) / 360.0 * scale;
    let sin_lat = lat.to_radians().sin();
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale;

    PixelCoord { x, y }
}

/// Converts global pixel coordinates back to `(lat, lon)`.
#[inline]
pub fn pixel_to_lat_lon(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let scale = world_size(zoom);

    let lon = x / scale * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y / scale)).sinh().atan();

    validate_coordinates(lat_rad.to_degrees(), lon)
}

/// Screen pixels covering one ground meter at `lat` and `zoom`.
pub fn pixels_per_meter(lat: f64, zoom: u8) -> f64 {
    let lat = clamp_latitude(lat);
    let at_zoom_zero = TILE_SIZE as f64 / EARTH_CIRCUMFERENCE_METERS;
    at_zoom_zero * 2.0_f64.powi(clamped(zoom) as i32) * lat.to_radians().cos().abs()
}

/// Latitude in Web Mercator radian space.
///
/// The result is half the Mercator ordinate, clamped so that the full world
/// spans exactly π. Used to measure vertical extents for zoom selection.
pub fn latitude_to_mercator_radians(lat: f64) -> f64 {
    let sin_lat = clamp_latitude(lat).to_radians().sin();
    let rad_x2 = ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / 2.0;
    rad_x2.clamp(-PI, PI) / 2.0
}

/// Projects WGS84 degrees to EPSG:3857 meters.
#[inline]
pub fn lon_lat_to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = clamp_latitude(lat);
    let x = EARTH_RADIUS_METERS * lon.to_radians();
    let y = EARTH_RADIUS_METERS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Inverse of [`lon_lat_to_web_mercator`], returns `(lon, lat)`.
#[inline]
pub fn web_mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_METERS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_METERS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Projects a geographic bounding box to EPSG:3857.
pub fn bounds_to_web_mercator(bounds: &BoundingBox) -> MercatorBounds {
    let (x1, y1) = lon_lat_to_web_mercator(bounds.min_lon, bounds.min_lat);
    let (x2, y2) = lon_lat_to_web_mercator(bounds.max_lon, bounds.max_lat);
    MercatorBounds {
        min_x: x1.min(x2),
        min_y: y1.min(y2),
        max_x: x1.max(x2),
        max_y: y1.max(y2),
    }
}

/// Returns the EPSG:3857 extent of an XYZ tile.
///
/// # Errors
///
/// Returns an error when the zoom exceeds the protocol maximum or the
/// column/row does not exist at that zoom.
pub fn tile_bounds(tile: &TileCoord) -> Result<MercatorBounds, CoordError> {
    if tile.zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(tile.zoom));
    }
    let tiles = 1u64 << tile.zoom;
    if tile.x as u64 >= tiles || tile.y as u64 >= tiles {
        return Err(CoordError::InvalidTile {
            x: tile.x,
            y: tile.y,
            zoom: tile.zoom,
        });
    }

    let span = 2.0 * WEB_MERCATOR_EXTENT / tiles as f64;
    let min_x = -WEB_MERCATOR_EXTENT + tile.x as f64 * span;
    let max_y = WEB_MERCATOR_EXTENT - tile.y as f64 * span;

    Ok(MercatorBounds {
        min_x,
        min_y: max_y - span,
        max_x: min_x + span,
        max_y,
    })
}

#[inline]
fn clamped(zoom: u8) -> u8 {
    zoom.min(MAX_ZOOM)
}

#[inline]
fn world_size(zoom: u8) -> f64 {
    TILE_SIZE as f64 * 2.0_f64.powi(clamped(zoom) as i32)
}
