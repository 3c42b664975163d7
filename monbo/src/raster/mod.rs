//! Deforestation loss layers.
//!
//! A loss layer is a single-band GeoTIFF in which the value 1 marks a
//! deforested pixel. This module samples such layers under farm polygons
//! ([`sample_deforestation`]) and reprojects them onto Web Mercator grids,
//! either for map overlays ([`warp_to_mercator`]) or as XYZ tiles
//! ([`render_tile`]).
//!
//! Supported native CRS are WGS84 (EPSG:4326), Web Mercator (EPSG:3857) and
//! WGS84 UTM zones (EPSG:326xx/327xx).

mod crs;
mod dataset;
mod error;
mod sample;
mod transform;
mod warp;

#[cfg(test)]
pub(crate) mod test_support;

pub use crs::{CrsTransformer, RasterCrs, EPSG_WEB_MERCATOR, EPSG_WGS84};
pub use dataset::{PixelWindow, RasterHandle, RasterWindow, Samples, DEFORESTED_VALUE};
pub use error::RasterError;
pub use sample::{count_deforested, pixel_area_m2, sample_deforestation, SampleOptions};
pub use transform::GeoTransform;
pub use warp::{render_tile, warp_to_mercator, MaskGrid, TILE_COLOR};
