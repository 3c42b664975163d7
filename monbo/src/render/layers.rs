//! Raster layers and compositing.

use std::io::Cursor;

use image::{ImageFormat, Rgb, Rgba, RgbaImage};

use super::RenderError;
use crate::coord::ImageSize;
use crate::raster::MaskGrid;

/// Deforested pixels in map images.
pub const DEFORESTATION: Rgba<u8> = Rgba([255, 20, 20, 180]);

/// Background when no satellite image is available.
pub const SOLID_BACKGROUND: Rgb<u8> = Rgb([0, 64, 0]);

/// Opaque [`SOLID_BACKGROUND`] image.
pub fn solid_background(size: ImageSize) -> RgbaImage {
    let Rgb([r, g, b]) = SOLID_BACKGROUND;
    RgbaImage::from_pixel(size.width, size.height, Rgba([r, g, b, 255]))
}

/// Deforestation mask painted in [`DEFORESTATION`].
pub fn deforestation_layer(mask: &MaskGrid) -> RgbaImage {
    mask.to_rgba(DEFORESTATION)
}

/// Alpha-composites `layers` over `base`, bottom to top.
///
/// # Errors
///
/// Returns [`RenderError::SizeMismatch`] when a layer differs in size from
/// the base.
pub fn composite(mut base: RgbaImage, layers: &[RgbaImage]) -> Result<RgbaImage, RenderError> {
    for layer in layers {
        if layer.dimensions() != base.dimensions() {
            return Err(RenderError::SizeMismatch {
                expected: base.dimensions(),
                actual: layer.dimensions(),
            });
        }
        image::imageops::overlay(&mut base, layer, 0, 0);
    }
    Ok(base)
}

/// Encodes an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
