//! Geographic frame of a rendered map image.

use crate::coord::{
    bounds_to_web_mercator, get_image_bounds, lon_lat_to_web_mercator, BoundingBox, ImageSize,
    MercatorBounds,
};

/// Center, zoom and size of a map image, with the bounds it covers.
///
/// Every layer of a composite is placed against the same `MapView`, which
/// is built from the same center and zoom as the satellite request. Pixel
/// positions are linear in Web Mercator meters, like the satellite image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub size: ImageSize,
    /// Geographic bounds of the image
    pub bounds: BoundingBox,
    /// Same bounds in EPSG:3857
    pub mercator: MercatorBounds,
}

impl MapView {
    pub fn new(center_lat: f64, center_lon: f64, zoom: u8, size: ImageSize) -> Self {
        let bounds = get_image_bounds(center_lat, center_lon, zoom, size);
        Self {
            center_lat,
            center_lon,
            zoom,
            size,
            bounds,
            mercator: bounds_to_web_mercator(&bounds),
        }
    }

    /// Fractional image pixel of a WGS84 coordinate, `(0, 0)` at the
    /// north-west corner.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = lon_lat_to_web_mercator(lon, lat);
        let px = (x - self.mercator.min_x) / self.mercator.width() * self.size.width as f64;
        let py = (self.mercator.max_y - y) / self.mercator.height() * self.size.height as f64;
        (px, py)
    }
}
