//! Zoom selection and viewport bounds for static map images.

use std::f64::consts::PI;

use tracing::debug;

use super::types::{BoundingBox, ImageSize, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use super::{
    clamp_zoom, lat_lon_to_pixel, latitude_to_mercator_radians, normalize_longitude,
    pixel_to_lat_lon, validate_coordinates,
};

/// Multiplier applied to the fitted zoom before clamping.
pub const ZOOM_BOOST: f64 = 1.0;

/// Fractions at or below this are treated as a single point.
const MIN_WORLD_FRACTION: f64 = 1e-10;

/// Inclusive zoom window allowed for generated maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Self {
        let min = min.min(MAX_ZOOM);
        let max = max.clamp(min, MAX_ZOOM);
        Self { min, max }
    }

    pub fn clamp(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// Largest zoom at which `fraction` of the world fits into `map_px` pixels.
///
/// `floor(log2(map_px / world_px / fraction))`, clamped to the protocol
/// range. A vanishing fraction yields the maximum zoom and a fraction of the
/// whole world or more yields zoom 0.
pub fn zoom_from_dimensions(map_px: u32, world_px: u32, fraction: f64) -> u8 {
    if fraction <= MIN_WORLD_FRACTION {
        return MAX_ZOOM;
    }
    if fraction >= 1.0 {
        return MIN_ZOOM;
    }
    let zoom = (map_px as f64 / world_px as f64 / fraction).log2().floor();
    clamp_zoom(zoom as i32)
}

/// Picks the zoom that fits `bounds` (plus padding) into `size`.
///
/// The vertical fit is measured in Mercator radian space so that the
/// projection's stretching towards the poles is accounted for; the
/// horizontal fit is linear in longitude and handles boxes crossing the
/// antimeridian. The smaller of the two wins.
///
/// # Arguments
///
/// * `bounds` - Geometry bounds in degrees
/// * `size` - Output image size in pixels
/// * `padding_ratio` - Extra context added on each side, relative to the span
/// * `range` - Zoom window the result is clamped into
pub fn calculate_zoom_from_bounds(
    bounds: &BoundingBox,
    size: ImageSize,
    padding_ratio: f64,
    range: ZoomRange,
) -> u8 {
    let (mut min_lat, min_lon) = validate_coordinates(bounds.min_lat, bounds.min_lon);
    let (mut max_lat, max_lon) = validate_coordinates(bounds.max_lat, bounds.max_lon);
    if min_lat > max_lat {
        std::mem::swap(&mut min_lat, &mut max_lat);
    }

    let mut min_lat_rad = latitude_to_mercator_radians(min_lat);
    let mut max_lat_rad = latitude_to_mercator_radians(max_lat);
    let padding_rad = (max_lat_rad - min_lat_rad) * padding_ratio;
    min_lat_rad -= padding_rad;
    max_lat_rad += padding_rad;
    let lat_fraction = (max_lat_rad - min_lat_rad) / PI;

    let mut lon_span = max_lon - min_lon;
    if lon_span < 0.0 {
        lon_span += 360.0;
    }
    let lon_padding = lon_span * padding_ratio;
    let padded_min_lon = normalize_longitude(min_lon - lon_padding);
    let padded_max_lon = normalize_longitude(max_lon + lon_padding);
    let mut padded_lon_span = padded_max_lon - padded_min_lon;
    if padded_lon_span < 0.0 {
        padded_lon_span += 360.0;
    }
    let lon_fraction = padded_lon_span / 360.0;

    let lat_zoom = zoom_from_dimensions(size.height, TILE_SIZE, lat_fraction);
    let lon_zoom = zoom_from_dimensions(size.width, TILE_SIZE, lon_fraction);
    let boosted = (lat_zoom.min(lon_zoom) as f64 * ZOOM_BOOST).floor();
    let zoom = range.clamp(clamp_zoom(boosted as i32));

    debug!(
        lat_fraction,
        lon_fraction, lat_zoom, lon_zoom, zoom, "Calculated zoom from bounds"
    );
    zoom
}

/// Geographic bounds of an image of `size` centered on a point.
///
/// The center is projected to global pixels, offset by half the image in
/// each direction and projected back, which is exactly how the static map
/// provider frames its response. Overlays positioned against these bounds
/// line up with the fetched image pixel for pixel.
pub fn get_image_bounds(center_lat: f64, center_lon: f64, zoom: u8, size: ImageSize) -> BoundingBox {
    let center = lat_lon_to_pixel(center_lat, center_lon, zoom);
    let half_width = size.width as f64 / 2.0;
    let half_height = size.height as f64 / 2.0;

    let (north, west) = pixel_to_lat_lon(center.x - half_width, center.y - half_height, zoom);
    let (south, east) = pixel_to_lat_lon(center.x + half_width, center.y + half_height, zoom);

    let bounds = BoundingBox::new(south.min(north), south.max(north), west.min(east), west.max(east));
    debug!(
        center_lat,
        center_lon,
        zoom,
        min_lat = bounds.min_lat,
        max_lat = bounds.max_lat,
        min_lon = bounds.min_lon,
        max_lon = bounds.max_lon,
        "Calculated image bounds"
    );
    bounds
}
