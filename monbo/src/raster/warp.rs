//! Reprojection of loss layers onto Web Mercator grids.
//!
//! Map images and XYZ tiles are both EPSG:3857 grids. The raster is read
//! once over the part of its extent the grid covers and every output pixel
//! takes the value of the source pixel under its center.

use std::path::Path;

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use super::crs::CrsTransformer;
use super::dataset::RasterHandle;
use super::error::RasterError;
use crate::coord::{
    bounds_to_web_mercator, tile_bounds, web_mercator_to_lon_lat, BoundingBox, ImageSize,
    MercatorBounds, TileCoord, TILE_SIZE,
};
use crate::render::encode_png;

/// Color of deforested pixels in served tiles.
pub const TILE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Deforestation flags on a Web Mercator grid, row-major from the north-west.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGrid {
    pub size: ImageSize,
    pub deforested: Vec<bool>,
}

impl MaskGrid {
    /// Grid with no deforested pixel.
    pub fn empty(size: ImageSize) -> Self {
        Self {
            size,
            deforested: vec![false; size.width as usize * size.height as usize],
        }
    }

    pub fn is_deforested(&self, x: u32, y: u32) -> bool {
        x < self.size.width
            && y < self.size.height
            && self.deforested[y as usize * self.size.width as usize + x as usize]
    }

    /// Number of deforested pixels.
    pub fn count(&self) -> usize {
        self.deforested.iter().filter(|&&d| d).count()
    }

    /// Paints deforested pixels in `color` over a transparent background.
    pub fn to_rgba(&self, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_fn(self.size.width, self.size.height, |x, y| {
            if self.is_deforested(x, y) {
                color
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }
}

/// Samples a raster onto the Web Mercator grid `bounds` × `size`.
///
/// # Errors
///
/// Returns [`RasterError::NoDataOverlap`] when the raster does not reach
/// into `bounds`, and open or decode errors from [`RasterHandle`].
pub fn warp_to_mercator(
    raster_path: &Path,
    bounds: &MercatorBounds,
    size: ImageSize,
) -> Result<MaskGrid, RasterError> {
    let mut handle = RasterHandle::open(raster_path)?;
    let transformer = CrsTransformer::new(handle.crs())?;

    let extent = handle.native_extent();
    let geographic = transformer.native_to_geographic_bounds(
        extent.min().x,
        extent.min().y,
        extent.max().x,
        extent.max().y,
    )?;
    let raster_mercator = bounds_to_web_mercator(&geographic);
    if !raster_mercator.intersects(bounds) {
        return Err(RasterError::NoDataOverlap);
    }

    let (west, south) = web_mercator_to_lon_lat(bounds.min_x, bounds.min_y);
    let (east, north) = web_mercator_to_lon_lat(bounds.max_x, bounds.max_y);
    let request = BoundingBox::new(south, north, west, east);
    let native = transformer.geographic_to_native_rect(&request)?;
    let window = handle
        .window_for(&native)
        .ok_or(RasterError::NoDataOverlap)?;
    let raster = handle.read_window(window)?;
    drop(handle);

    let step_x = bounds.width() / size.width as f64;
    let step_y = bounds.height() / size.height as f64;
    let mut mask = MaskGrid::empty(size);
    for y in 0..size.height {
        let my = bounds.max_y - (y as f64 + 0.5) * step_y;
        for x in 0..size.width {
            let mx = bounds.min_x + (x as f64 + 0.5) * step_x;
            let (lon, lat) = web_mercator_to_lon_lat(mx, my);
            let (nx, ny) = transformer.forward(lon, lat)?;
            let Some((col, row)) = raster.transform.geo_to_pixel(nx, ny) else {
                continue;
            };
            if col < 0.0 || row < 0.0 {
                continue;
            }
            if raster.is_deforested(col.floor() as u32, row.floor() as u32) {
                mask.deforested[y as usize * size.width as usize + x as usize] = true;
            }
        }
    }

    debug!(
        path = %raster_path.display(),
        size = %size,
        deforested = mask.count(),
        "Raster warped to Web Mercator"
    );
    Ok(mask)
}

/// Renders one 256×256 XYZ tile of a loss layer as PNG.
///
/// Deforested pixels are opaque red, everything else transparent. A tile
/// that does not touch the raster is a fully transparent PNG.
///
/// # Errors
///
/// Returns [`RasterError::Tile`] for a non-existent tile address and open,
/// decode or encode errors otherwise.
pub fn render_tile(raster_path: &Path, tile: &TileCoord) -> Result<Vec<u8>, RasterError> {
    let bounds = tile_bounds(tile)?;
    let size = ImageSize::new(TILE_SIZE, TILE_SIZE);

    let mask = match warp_to_mercator(raster_path, &bounds, size) {
        Ok(mask) => mask,
        Err(e) if e.is_recoverable() => {
            debug!(zoom = tile.zoom, x = tile.x, y = tile.y, "Tile outside raster");
            MaskGrid::empty(size)
        }
        Err(e) => {
            warn!(
                zoom = tile.zoom,
                x = tile.x,
                y = tile.y,
                error = %e,
                "Tile rendering failed"
            );
            return Err(e);
        }
    };

    encode_png(&mask.to_rgba(TILE_COLOR)).map_err(|e| RasterError::Encode(e.to_string()))
}
