//! Batch analysis types

use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::geometry::GeometryError;
use crate::raster::RasterError;

/// A deforestation loss layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    pub id: String,
    pub name: String,
    /// Single-band GeoTIFF
    pub path: PathBuf,
    /// Ground size of one pixel edge in meters, when the layer declares it
    #[serde(default)]
    pub pixel_size_m: Option<f64>,
}

/// Why a farm has no deforestation ratio for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SamplingFailure {
    /// The farm lies outside the raster
    #[error("farm lies outside the raster")]
    NoDataOverlap,

    /// The raster could not be opened or read
    #[error("raster unreadable: {0}")]
    RasterIo(String),

    /// The raster is readable but not usable (CRS, georeferencing)
    #[error("raster unusable: {0}")]
    Raster(String),

    /// The farm geometry cannot be measured
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl From<RasterError> for SamplingFailure {
    fn from(error: RasterError) -> Self {
        match error {
            RasterError::NoDataOverlap => SamplingFailure::NoDataOverlap,
            RasterError::Io { .. } | RasterError::Decode { .. } => {
                SamplingFailure::RasterIo(error.to_string())
            }
            RasterError::Geometry(e) => e.into(),
            other => SamplingFailure::Raster(other.to_string()),
        }
    }
}

impl From<GeometryError> for SamplingFailure {
    fn from(error: GeometryError) -> Self {
        SamplingFailure::InvalidGeometry(error.to_string())
    }
}

/// Deforestation ratio of one farm on one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmSample {
    pub farm_id: String,
    pub ratio: Result<f64, SamplingFailure>,
}

impl Serialize for FarmSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FarmSample", 3)?;
        state.serialize_field("farmId", &self.farm_id)?;
        match &self.ratio {
            Ok(ratio) => {
                state.serialize_field("value", ratio)?;
                state.serialize_field("failure", &Option::<SamplingFailure>::None)?;
            }
            Err(failure) => {
                state.serialize_field("value", &Option::<f64>::None)?;
                state.serialize_field("failure", failure)?;
            }
        }
        state.end()
    }
}

/// All farm ratios for one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAnalysis {
    pub map_id: String,
    pub map_name: String,
    pub farms: Vec<FarmSample>,
}

impl MapAnalysis {
    /// Ratio for a farm, `None` when the farm is unknown.
    pub fn sample(&self, farm_id: &str) -> Option<&FarmSample> {
        self.farms.iter().find(|s| s.farm_id == farm_id)
    }

    /// Number of farms without a ratio.
    pub fn failures(&self) -> usize {
        self.farms.iter().filter(|s| s.ratio.is_err()).count()
    }
}
