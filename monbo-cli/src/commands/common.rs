//! Farm input files shared across commands.
//!
//! A farm file is a JSON array of records:
//!
//! ```json
//! [
//!   {"id": "a", "coordinates": [{"lng": -50.46, "lat": 10.12}, ...]},
//!   {"id": "b", "coordinates": [{"lng": -50.45, "lat": 10.13}], "radius": 100},
//!   {"id": "c", "legacy": "[(-50.4, 10.1), (-50.3, 10.1), (-50.3, 10.2)]"},
//!   {"id": "d", "geometry": {"type": "Point", "coordinates": [-50.4, 10.1]}}
//! ]
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use monbo::geometry::{geometry_from_geojson, parse_legacy_coordinates, GeometryError, LngLat};
use monbo::overlap::FarmInput;

use crate::error::CliError;

/// One farm as read from the input file.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmRecord {
    pub id: String,
    #[serde(default)]
    pub coordinates: Option<Vec<LngLat>>,
    #[serde(default)]
    pub legacy: Option<String>,
    #[serde(default)]
    pub geometry: Option<Value>,
    /// Radius in meters for point farms
    #[serde(default)]
    pub radius: Option<f64>,
}

impl FarmRecord {
    /// Builds the farm, giving points without a radius `default_radius`.
    pub fn to_farm(&self, default_radius: f64) -> Result<FarmInput, GeometryError> {
        if let Some(geometry) = &self.geometry {
            let is_point = geometry.get("type").and_then(Value::as_str) == Some("Point");
            let radius = if is_point {
                Some(self.radius.unwrap_or(default_radius))
            } else {
                self.radius
            };
            return Ok(FarmInput::new(
                self.id.clone(),
                geometry_from_geojson(geometry, radius)?,
            ));
        }

        let coords = match (&self.legacy, &self.coordinates) {
            (Some(text), _) => parse_legacy_coordinates(text)?,
            (None, Some(coords)) => coords.clone(),
            (None, None) => Vec::new(),
        };
        let radius = match coords.len() {
            1 => Some(self.radius.unwrap_or(default_radius)),
            _ => self.radius,
        };
        FarmInput::from_coordinates(self.id.clone(), &coords, radius)
    }
}

/// Reads a JSON file into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let input_error = |message: String| CliError::Input {
        path: path.display().to_string(),
        message,
    };
    let text = std::fs::read_to_string(path).map_err(|e| input_error(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| input_error(e.to_string()))
}

/// Reads and builds every farm of a farm file.
///
/// A record violating the coordinate/radius contract fails the whole command.
pub fn load_farms(path: &Path, default_radius: f64) -> Result<Vec<FarmInput>, CliError> {
    let records: Vec<FarmRecord> = read_json(path)?;
    records
        .iter()
        .map(|record| {
            record.to_farm(default_radius).map_err(|error| CliError::Farm {
                id: record.id.clone(),
                error,
            })
        })
        .collect()
}
