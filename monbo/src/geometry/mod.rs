//! Farm geometry engine
//!
//! Builds farm geometries from wire input (coordinate lists, point plus
//! radius, legacy text, GeoJSON), checks planar validity, measures area with
//! a strategy chosen by size and latitude, and derives bounds and centers
//! used by the overlap detector, the raster sampler and the map compositor.
//!
//! # Example
//!
//! ```
//! use monbo::geometry::{build_geometry, calculate_polygon_area, LngLat};
//!
//! let farm = build_geometry(
//!     &[
//!         LngLat::new(-50.46, 10.12),
//!         LngLat::new(-50.45, 10.12),
//!         LngLat::new(-50.45, 10.13),
//!         LngLat::new(-50.46, 10.13),
//!     ],
//!     None,
//! )
//! .unwrap();
//! assert!(calculate_polygon_area(farm.footprint()) > 0.0);
//! ```

mod area;
mod build;
mod types;
mod validity;

pub use area::{
    calculate_polygon_area, geometry_area, needs_accuracy_check, polygon_area, select_strategy,
    AreaOptions, AreaStrategy, ACCURACY_TOLERANCE, HIGH_LATITUDE_DEGREES, INVALID_AREA,
    LARGE_EXTENT_DEGREES, SMALL_EXTENT_DEGREES,
};
pub use build::{
    buffer_point, build_geometry, geometry_from_geojson, parse_legacy_coordinates, point_area,
    POINT_BUFFER_SEGMENTS,
};
pub use types::{FarmGeometry, GeometryError, InvalidReason, LngLat};
pub use validity::{validate_polygon, Validity, MIN_POLYGON_AREA};

use geo::{BoundingRect, Coord, Polygon};

use crate::coord::{meters_to_degrees, BoundingBox};

/// Bounding box of a polygon, `None` when it has no coordinates.
pub fn polygon_bounds(polygon: &Polygon<f64>) -> Option<BoundingBox> {
    polygon
        .bounding_rect()
        .map(|rect| BoundingBox::new(rect.min().y, rect.max().y, rect.min().x, rect.max().x))
}

/// Bounding box of a farm.
///
/// Points span their radius in every direction, converted to degrees at the
/// point's latitude.
pub fn geometry_bounds(geometry: &FarmGeometry) -> Option<BoundingBox> {
    match geometry {
        FarmGeometry::Polygon(polygon) => polygon_bounds(polygon),
        FarmGeometry::Point {
            center,
            radius_meters,
            ..
        } => {
            let (lat_delta, lon_delta) = meters_to_degrees(*radius_meters, center.y);
            Some(BoundingBox::new(
                center.y - lat_delta,
                center.y + lat_delta,
                center.x - lon_delta,
                center.x + lon_delta,
            ))
        }
    }
}

/// Center of a farm: the bounding box midpoint of a polygon or the point
/// itself. `None` for empty polygons.
pub fn calculate_geometry_center(geometry: &FarmGeometry) -> Option<Coord<f64>> {
    match geometry {
        FarmGeometry::Polygon(polygon) => polygon_bounds(polygon).map(|bounds| {
            let (lat, lon) = bounds.center();
            Coord { x: lon, y: lat }
        }),
        FarmGeometry::Point { center, .. } => Some(*center),
    }
}

/// Validity of a farm's footprint.
pub fn validate_geometry(geometry: &FarmGeometry) -> Validity {
    validate_polygon(geometry.footprint())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_center_is_bbox_midpoint() {
        let farm = build_geometry(
            &[
                LngLat::new(0.0, 0.0),
                LngLat::new(4.0, 0.0),
                LngLat::new(0.0, 2.0),
            ],
            None,
        )
        .unwrap();
        let center = calculate_geometry_center(&farm).unwrap();
        assert_eq!(center, Coord { x: 2.0, y: 1.0 });
    }

    #[test]
    fn test_point_center_is_the_point() {
        let farm = build_geometry(&[LngLat::new(-50.456, 10.123)], Some(100.0)).unwrap();
        assert_eq!(
            calculate_geometry_center(&farm),
            Some(Coord {
                x: -50.456,
                y: 10.123
            })
        );
    }

    #[test]
    fn test_point_bounds_cover_radius() {
        let farm = build_geometry(&[LngLat::new(0.0, 0.0)], Some(1000.0)).unwrap();
        let bounds = geometry_bounds(&farm).unwrap();
        let (lat_delta, _) = meters_to_degrees(1000.0, 0.0);
        assert!((bounds.height() - 2.0 * lat_delta).abs() < 1e-12);
    }

    #[test]
    fn test_empty_polygon_has_no_bounds() {
        let farm = build_geometry(&[], None).unwrap();
        assert!(geometry_bounds(&farm).is_none());
        assert!(calculate_geometry_center(&farm).is_none());
        assert_eq!(validate_geometry(&farm), Validity::Empty);
    }
}
