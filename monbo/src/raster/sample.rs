//! Deforestation ratio of a farm over one loss layer.

use std::path::Path;

use geo::{coord, BoundingRect, Coord, Intersects, MapCoords, Polygon, Rect};
use tracing::debug;

use super::crs::{CrsTransformer, RasterCrs};
use super::dataset::{RasterHandle, RasterWindow};
use super::error::RasterError;
use crate::coord::METERS_PER_DEGREE;
use crate::geometry::{polygon_area, polygon_bounds, AreaOptions};

/// Fraction of a pixel trimmed from each side before the touch test, so
/// that pixels sharing only an edge with the farm are not counted.
const EDGE_INSET: f64 = 1e-6;

/// Sampling options for one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleOptions {
    /// Ground size of one pixel edge in meters, overriding the transform
    pub pixel_size_m: Option<f64>,
    pub area: AreaOptions,
}

/// Fraction of a farm's area flagged as deforested by a raster.
///
/// The polygon is projected into the raster's CRS and every pixel it
/// touches is inspected; pixels equal to 1 count as deforested. The ratio
/// is `deforested pixels × pixel area / farm area`, capped at 1. A farm of
/// zero area scores 0 without opening the raster.
///
/// # Errors
///
/// * [`RasterError::NoDataOverlap`] when the farm lies outside the raster
/// * [`RasterError::Geometry`] when the farm area cannot be measured
/// * open, decode and CRS errors from [`RasterHandle::open`]
pub fn sample_deforestation(
    polygon: &Polygon<f64>,
    raster_path: &Path,
    options: SampleOptions,
) -> Result<f64, RasterError> {
    let farm_area = polygon_area(polygon, options.area)?;
    if farm_area <= 0.0 {
        return Ok(0.0);
    }

    let mut handle = RasterHandle::open(raster_path)?;
    let transformer = CrsTransformer::new(handle.crs())?;

    let native = polygon.try_map_coords(|c| {
        transformer
            .forward(c.x, c.y)
            .map(|(x, y)| Coord { x, y })
    })?;
    let native_rect = native.bounding_rect().ok_or(RasterError::NoDataOverlap)?;
    let window = handle
        .window_for(&native_rect)
        .ok_or(RasterError::NoDataOverlap)?;
    let raster = handle.read_window(window)?;
    drop(handle);

    let deforested = count_deforested(&raster, &native);
    let center_lat = polygon_bounds(polygon).map_or(0.0, |b| b.center().0);
    let pixel_area = pixel_area_m2(&raster, options.pixel_size_m, center_lat);
    let ratio = (deforested as f64 * pixel_area / farm_area).min(1.0);

    debug!(
        path = %raster_path.display(),
        deforested,
        pixel_area,
        farm_area,
        ratio,
        "Sampled deforestation"
    );
    Ok(ratio)
}

/// Deforested pixels of `window` whose interior touches `native`.
pub fn count_deforested(window: &RasterWindow, native: &Polygon<f64>) -> usize {
    let inset_x = window.transform.pixel_width.abs() * EDGE_INSET;
    let inset_y = window.transform.pixel_height.abs() * EDGE_INSET;

    let mut count = 0;
    for row in 0..window.height {
        for col in 0..window.width {
            if !window.is_deforested(col, row) {
                continue;
            }
            let cell = window.transform.cell_rect(col, row);
            let inner = Rect::new(
                coord! { x: cell.min().x + inset_x, y: cell.min().y + inset_y },
                coord! { x: cell.max().x - inset_x, y: cell.max().y - inset_y },
            );
            if inner.intersects(native) {
                count += 1;
            }
        }
    }
    count
}

/// Ground area of one pixel in square meters.
///
/// A declared pixel size wins. Otherwise the transform's pixel area is
/// converted: degrees are scaled by [`METERS_PER_DEGREE`] and the cosine of
/// `center_lat`, Web Mercator meters by the squared cosine, UTM meters are
/// taken as they are.
pub fn pixel_area_m2(window: &RasterWindow, pixel_size_m: Option<f64>, center_lat: f64) -> f64 {
    if let Some(size) = pixel_size_m {
        return size * size;
    }

    let native = window.transform.pixel_area();
    let cos_lat = center_lat.to_radians().cos();
    match window.crs {
        RasterCrs::Wgs84 => native * METERS_PER_DEGREE * METERS_PER_DEGREE * cos_lat,
        RasterCrs::WebMercator => native * cos_lat * cos_lat,
        RasterCrs::Utm { .. } => native,
    }
}
