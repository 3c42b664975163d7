//! Adaptive area measurement.
//!
//! The strategy depends on the polygon's bounding box:
//!
//! | extents            | latitude | strategy                          |
//! |--------------------|----------|-----------------------------------|
//! | both < 0.1°        | any      | scaled planar area ([`AreaStrategy::Small`]) |
//! | either > 1.0°      | any      | local Albers                      |
//! | otherwise          | > 60°    | local Albers                      |
//! | otherwise          | ≤ 60°    | global Albers                     |
//!
//! A global-Albers area is compared with a local-Albers one only when an
//! extent exceeds 1° ([`needs_accuracy_check`]).
//!
//! All areas are square meters rounded to 2 decimals.

use geo::{Area, Coord, MapCoords, Polygon};
use tracing::{debug, warn};

use super::build::round_area;
use super::polygon_bounds;
use super::types::{FarmGeometry, GeometryError};
use super::validity::{validate_polygon, Validity};
use crate::coord::{AlbersParams, AlbersProjection, BoundingBox, METERS_PER_DEGREE};

/// Extent in degrees below which the planar approximation is used.
pub const SMALL_EXTENT_DEGREES: f64 = 0.1;

/// Extent in degrees above which a fitted projection is required.
pub const LARGE_EXTENT_DEGREES: f64 = 1.0;

/// Latitude beyond which the global projection is not trusted.
pub const HIGH_LATITUDE_DEGREES: f64 = 60.0;

/// Relative disagreement tolerated between global and local projections.
pub const ACCURACY_TOLERANCE: f64 = 0.05;

/// Returned by [`calculate_polygon_area`] for invalid polygons.
pub const INVALID_AREA: f64 = -1.0;

/// How an area is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaStrategy {
    /// Planar area with degrees scaled to meters at the center latitude
    Small,
    /// Albers fitted to the polygon's own bounds
    LocalAlbers,
    /// Albers with standard parallels at 30°N and 60°N
    GlobalAlbers,
}

/// Area computation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaOptions {
    /// Fail instead of warning when the accuracy check exceeds tolerance
    pub strict: bool,
}

/// Picks the area strategy for a bounding box.
pub fn select_strategy(bounds: &BoundingBox) -> AreaStrategy {
    let width = bounds.width().abs();
    let height = bounds.height().abs();
    let (center_lat, _) = bounds.center();

    if width < SMALL_EXTENT_DEGREES && height < SMALL_EXTENT_DEGREES {
        AreaStrategy::Small
    } else if center_lat.abs() > HIGH_LATITUDE_DEGREES
        || width > LARGE_EXTENT_DEGREES
        || height > LARGE_EXTENT_DEGREES
    {
        AreaStrategy::LocalAlbers
    } else {
        AreaStrategy::GlobalAlbers
    }
}

/// Measures a polygon in square meters.
///
/// # Returns
///
/// `0.0` for empty or zero-area polygons, otherwise the rounded area.
///
/// # Errors
///
/// * [`GeometryError::InvalidGeometry`] when the ring fails planar validity
/// * [`GeometryError::Projection`] when the polygon cannot be projected
/// * [`GeometryError::AreaAccuracy`] in strict mode when the global
///   projection disagrees with the local one by more than 5%
pub fn polygon_area(polygon: &Polygon<f64>, options: AreaOptions) -> Result<f64, GeometryError> {
    match validate_polygon(polygon) {
        Validity::Valid => {}
        Validity::Empty => return Ok(0.0),
        Validity::Invalid(reason) => return Err(GeometryError::InvalidGeometry(reason)),
    }

    let Some(bounds) = polygon_bounds(polygon) else {
        return Ok(0.0);
    };
    let strategy = select_strategy(&bounds);

    let area = match strategy {
        AreaStrategy::Small => small_area(polygon, &bounds),
        AreaStrategy::LocalAlbers => albers_area(polygon, AlbersParams::local(&bounds))?,
        AreaStrategy::GlobalAlbers => {
            let area = albers_area(polygon, AlbersParams::global())?;
            if needs_accuracy_check(&bounds) {
                let reference = albers_area(polygon, AlbersParams::local(&bounds))?;
                check_accuracy(area, reference, bounds.center().0, options.strict)?;
            }
            area
        }
    };

    debug!(?strategy, area, "Calculated polygon area");
    Ok(round_area(area))
}

/// Measures a polygon, folding failures into sentinels.
///
/// Returns `-1.0` for invalid or unprojectable polygons and `0.0` for empty
/// ones. Use [`polygon_area`] to tell the failure kinds apart.
pub fn calculate_polygon_area(polygon: &Polygon<f64>) -> f64 {
    match polygon_area(polygon, AreaOptions::default()) {
        Ok(area) => area,
        Err(GeometryError::InvalidGeometry(_)) => INVALID_AREA,
        Err(e) => {
            warn!(error = %e, "Polygon area could not be computed");
            INVALID_AREA
        }
    }
}

/// Measures a farm's footprint.
pub fn geometry_area(geometry: &FarmGeometry, options: AreaOptions) -> Result<f64, GeometryError> {
    polygon_area(geometry.footprint(), options)
}

/// True when a global-projection area must be compared with the local one:
/// either extent exceeds [`LARGE_EXTENT_DEGREES`].
pub fn needs_accuracy_check(bounds: &BoundingBox) -> bool {
    bounds.width().abs() > LARGE_EXTENT_DEGREES || bounds.height().abs() > LARGE_EXTENT_DEGREES
}

/// Ring area in a plane where one degree of latitude is [`METERS_PER_DEGREE`]
/// and one degree of longitude that times the cosine of the center latitude.
///
/// An axis-aligned rectangle measures exactly `width_m × height_m`; other
/// shapes measure their own outline, not their bounding box.
fn small_area(polygon: &Polygon<f64>, bounds: &BoundingBox) -> f64 {
    let (center_lat, center_lon) = bounds.center();
    let x_scale = METERS_PER_DEGREE * center_lat.to_radians().cos();

    polygon
        .map_coords(|c| Coord {
            x: (c.x - center_lon) * x_scale,
            y: (c.y - center_lat) * METERS_PER_DEGREE,
        })
        .unsigned_area()
}

fn albers_area(polygon: &Polygon<f64>, params: AlbersParams) -> Result<f64, GeometryError> {
    let projection = AlbersProjection::new(params)?;
    debug!(crs = %params.to_proj_string(), "Projecting polygon for area");

    let projected = polygon.map_coords(|c| {
        let (x, y) = projection.project(c.x, c.y);
        Coord { x, y }
    });
    Ok(projected.unsigned_area())
}

fn check_accuracy(
    area: f64,
    reference: f64,
    center_lat: f64,
    strict: bool,
) -> Result<(), GeometryError> {
    if reference <= 0.0 {
        return Ok(());
    }

    let relative = (area - reference).abs() / reference;
    if relative <= ACCURACY_TOLERANCE {
        return Ok(());
    }

    let percent_error = relative * 100.0;
    if strict {
        return Err(GeometryError::AreaAccuracy {
            percent_error,
            center_lat,
        });
    }
    warn!(
        percent_error,
        center_lat, "Projected area disagrees with the local projection"
    );
    Ok(())
}
