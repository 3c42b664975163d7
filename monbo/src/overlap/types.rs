//! Overlap report types

use geo::{Centroid, Coord, LineString, MultiPolygon, Polygon};
use serde::Serialize;

use crate::geometry::{build_geometry, FarmGeometry, GeometryError, LngLat};

/// Overlap ratio above which an overlap is highly critical.
pub const HIGH_CRITICALITY_RATIO: f64 = 0.8;

/// One farm submitted for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmInput {
    pub id: String,
    pub geometry: FarmGeometry,
}

impl FarmInput {
    pub fn new(id: impl Into<String>, geometry: FarmGeometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    /// Builds a farm from wire coordinates.
    ///
    /// A ring rejected as invalid is kept as given so the consistency report
    /// can flag it; only radius/coordinate contract violations are errors.
    pub fn from_coordinates(
        id: impl Into<String>,
        coords: &[LngLat],
        radius_meters: Option<f64>,
    ) -> Result<Self, GeometryError> {
        let geometry = match build_geometry(coords, radius_meters) {
            Err(GeometryError::InvalidGeometry(_)) => {
                let ring: Vec<Coord<f64>> = coords.iter().map(|&c| c.into()).collect();
                FarmGeometry::Polygon(Polygon::new(LineString::from(ring), vec![]))
            }
            other => other?,
        };
        Ok(Self::new(id, geometry))
    }
}

/// Severity of an overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Criticality {
    High,
    Medium,
}

impl Criticality {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > HIGH_CRITICALITY_RATIO {
            Criticality::High
        } else {
            Criticality::Medium
        }
    }
}

/// Per-farm outcome of the consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FarmStatus {
    Valid,
    NotValid,
}

/// A pair of farms whose footprints intersect.
///
/// Indices refer to the slice handed to the detector; `first < second`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapRecord {
    pub first: usize,
    pub second: usize,
    pub intersection: MultiPolygon<f64>,
    /// Intersection area in square meters
    pub area: f64,
    /// Intersection over union, in `[0, 1]`
    pub ratio: f64,
}

impl OverlapRecord {
    pub fn criticality(&self) -> Criticality {
        Criticality::from_ratio(self.ratio)
    }

    /// Centroid of the intersection.
    pub fn centroid(&self) -> Option<LngLat> {
        self.intersection
            .centroid()
            .map(|point| LngLat::new(point.x(), point.y()))
    }

    /// Every ring of every polygon in the intersection, exterior first.
    pub fn boundary_paths(&self) -> Vec<Vec<LngLat>> {
        self.intersection
            .iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
            .map(|ring| ring.coords().map(|c| LngLat::new(c.x, c.y)).collect())
            .collect()
    }
}

/// A data-quality finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inconsistency {
    #[serde(rename_all = "camelCase")]
    Overlap {
        farm_ids: [String; 2],
        ratio: f64,
        criticality: Criticality,
        /// Square meters
        area: f64,
        center: Option<LngLat>,
        paths: Vec<Vec<LngLat>>,
    },
    #[serde(rename_all = "camelCase")]
    EmptyGeometry { farm_id: String },
    #[serde(rename_all = "camelCase")]
    InvalidGeometry { farm_id: String, reason: String },
}

impl Inconsistency {
    /// Builds the overlap finding for a record.
    pub fn from_overlap(record: &OverlapRecord, farms: &[FarmInput]) -> Self {
        Inconsistency::Overlap {
            farm_ids: [
                farms[record.first].id.clone(),
                farms[record.second].id.clone(),
            ],
            ratio: record.ratio,
            criticality: record.criticality(),
            area: record.area,
            center: record.centroid(),
            paths: record.boundary_paths(),
        }
    }

    /// Farms involved in this finding.
    pub fn farm_ids(&self) -> Vec<&str> {
        match self {
            Inconsistency::Overlap { farm_ids, .. } => farm_ids.iter().map(String::as_str).collect(),
            Inconsistency::EmptyGeometry { farm_id } => vec![farm_id.as_str()],
            Inconsistency::InvalidGeometry { farm_id, .. } => vec![farm_id.as_str()],
        }
    }
}

/// Status of one farm in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarmReport {
    pub id: String,
    pub status: FarmStatus,
}

/// Result of a consistency check over a farm set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InconsistencyReport {
    pub farms: Vec<FarmReport>,
    pub inconsistencies: Vec<Inconsistency>,
}

impl InconsistencyReport {
    pub fn status_of(&self, id: &str) -> Option<FarmStatus> {
        self.farms.iter().find(|f| f.id == id).map(|f| f.status)
    }
}
