//! Geometry construction from wire input.

use std::f64::consts::PI;
use std::sync::OnceLock;

use geo::{Coord, LineString, Polygon};
use regex::Regex;
use serde_json::Value;

use super::types::{FarmGeometry, GeometryError, InvalidReason, LngLat};
use crate::coord::meters_to_degrees;

/// Number of vertices in the circular buffer around a point.
pub const POINT_BUFFER_SEGMENTS: usize = 64;

/// Builds a farm geometry from a coordinate list and an optional radius.
///
/// | coordinates | radius  | result                                   |
/// |-------------|---------|------------------------------------------|
/// | 0           | none    | empty polygon                            |
/// | 1           | given   | point with a circular buffer             |
/// | 1           | none    | `ParameterValidation`                    |
/// | 2           | none    | `InvalidGeometry(TooFewPoints)`          |
/// | ≥ 3         | none    | polygon, implicitly closed               |
/// | ≥ 2 or 0    | given   | `ParameterValidation`                    |
///
/// Rings are not checked for planar validity here; that is a data-quality
/// finding reported by the overlap detector.
///
/// # Errors
///
/// Returns [`GeometryError::ParameterValidation`] when radius and coordinate
/// count contradict each other or the radius is not a positive number, and
/// [`GeometryError::InvalidGeometry`] for two-coordinate input.
pub fn build_geometry(
    coords: &[LngLat],
    radius_meters: Option<f64>,
) -> Result<FarmGeometry, GeometryError> {
    match (coords, radius_meters) {
        ([], None) => Ok(FarmGeometry::Polygon(Polygon::new(
            LineString::new(vec![]),
            vec![],
        ))),
        ([center], Some(radius)) => {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(GeometryError::ParameterValidation(format!(
                    "radius must be a positive number of meters, got {}",
                    radius
                )));
            }
            let center: Coord<f64> = (*center).into();
            Ok(FarmGeometry::Point {
                center,
                radius_meters: radius,
                buffer: buffer_point(center, radius, POINT_BUFFER_SEGMENTS),
            })
        }
        ([_], None) => Err(GeometryError::ParameterValidation(
            "a single coordinate requires a radius".to_string(),
        )),
        ([_, _], None) => Err(GeometryError::InvalidGeometry(
            InvalidReason::TooFewPoints { count: 2 },
        )),
        (_, None) => {
            let ring: Vec<Coord<f64>> = coords.iter().map(|&c| c.into()).collect();
            Ok(FarmGeometry::Polygon(Polygon::new(
                LineString::from(ring),
                vec![],
            )))
        }
        (_, Some(_)) => Err(GeometryError::ParameterValidation(format!(
            "a radius is only valid with exactly one coordinate, got {}",
            coords.len()
        ))),
    }
}

/// Approximates a circle of `radius_meters` around `center` with a polygon.
///
/// The radius is converted to degree deltas at the center latitude, so the
/// ring is an ellipse in degree space and a circle on the ground.
pub fn buffer_point(center: Coord<f64>, radius_meters: f64, segments: usize) -> Polygon<f64> {
    let (lat_delta, lon_delta) = meters_to_degrees(radius_meters, center.y);
    let segments = segments.max(16);

    let ring: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / segments as f64;
            Coord {
                x: center.x + lon_delta * theta.cos(),
                y: center.y + lat_delta * theta.sin(),
            }
        })
        .collect();

    Polygon::new(LineString::from(ring), vec![])
}

/// Area of a circle of `radius_meters`, in square meters, rounded to 2
/// decimals.
pub fn point_area(radius_meters: f64) -> f64 {
    round_area(PI * radius_meters * radius_meters)
}

pub(crate) fn round_area(area: f64) -> f64 {
    (area * 100.0).round() / 100.0
}

fn legacy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^,()]+),\s*([^()]+)\)").expect("Valid regex"))
}

/// Parses the legacy `"[(lon, lat), (lon, lat), ...]"` encoding.
///
/// # Errors
///
/// Returns [`GeometryError::Parse`] when no pair is found or a value is not a
/// number.
pub fn parse_legacy_coordinates(text: &str) -> Result<Vec<LngLat>, GeometryError> {
    let mut coords = Vec::new();

    for captures in legacy_pattern().captures_iter(text) {
        let lng = parse_number(&captures[1])?;
        let lat = parse_number(&captures[2])?;
        coords.push(LngLat::new(lng, lat));
    }

    if coords.is_empty() {
        return Err(GeometryError::Parse(format!(
            "no (lon, lat) pairs found in {:?}",
            text
        )));
    }
    Ok(coords)
}

fn parse_number(raw: &str) -> Result<f64, GeometryError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| GeometryError::Parse(format!("{:?} is not a number", trimmed)))
}

/// Builds a farm geometry from a GeoJSON geometry object.
///
/// `Polygon` uses its exterior ring, `Point` requires `radius_meters`.
///
/// # Errors
///
/// Returns [`GeometryError::GeometryType`] for any other type and
/// [`GeometryError::Parse`] for malformed coordinates.
pub fn geometry_from_geojson(
    value: &Value,
    radius_meters: Option<f64>,
) -> Result<FarmGeometry, GeometryError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryError::GeometryType("missing \"type\"".to_string()))?;
    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| GeometryError::Parse("missing \"coordinates\"".to_string()))?;

    match kind {
        "Polygon" => {
            let exterior = coordinates
                .as_array()
                .and_then(|rings| rings.first())
                .ok_or_else(|| GeometryError::Parse("polygon has no rings".to_string()))?;
            let ring = exterior
                .as_array()
                .ok_or_else(|| GeometryError::Parse("ring is not an array".to_string()))?
                .iter()
                .map(position)
                .collect::<Result<Vec<_>, _>>()?;
            build_geometry(&ring, None)
        }
        "Point" => build_geometry(&[position(coordinates)?], radius_meters),
        other => Err(GeometryError::GeometryType(other.to_string())),
    }
}

fn position(value: &Value) -> Result<LngLat, GeometryError> {
    let pair = value
        .as_array()
        .filter(|p| p.len() >= 2)
        .ok_or_else(|| GeometryError::Parse(format!("{} is not a position", value)))?;
    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(lng), Some(lat)) => Ok(LngLat::new(lng, lat)),
        _ => Err(GeometryError::Parse(format!("{} is not a position", value))),
    }
}
