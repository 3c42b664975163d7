//! Deforestation analysis over many farms and layers.
//!
//! Every farm is sampled on every layer. A failure only affects its own
//! farm/layer pair and is recorded as a [`SamplingFailure`] in place of the
//! ratio; the rest of the batch still completes.

mod types;

pub use types::{FarmSample, MapAnalysis, MapLayer, SamplingFailure};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::geometry::{validate_geometry, AreaOptions, Validity};
use crate::overlap::FarmInput;
use crate::raster::{sample_deforestation, SampleOptions};

/// Samples every farm on every layer.
///
/// Farms of one layer are sampled in parallel; results keep the farm order
/// and layers are sorted by id.
///
/// # Arguments
///
/// * `maps` - Loss layers
/// * `farms` - Farms to sample
/// * `area` - Area measurement options
pub fn analyze_deforestation(
    maps: &[MapLayer],
    farms: &[FarmInput],
    area: AreaOptions,
) -> Vec<MapAnalysis> {
    let mut maps: Vec<&MapLayer> = maps.iter().collect();
    maps.sort_by(|a, b| a.id.cmp(&b.id));

    maps.into_iter()
        .map(|map| {
            let options = SampleOptions {
                pixel_size_m: map.pixel_size_m,
                area,
            };
            let samples: Vec<FarmSample> = farms
                .par_iter()
                .map(|farm| FarmSample {
                    farm_id: farm.id.clone(),
                    ratio: sample_farm(map, farm, options),
                })
                .collect();

            let analysis = MapAnalysis {
                map_id: map.id.clone(),
                map_name: map.name.clone(),
                farms: samples,
            };
            info!(
                map = %map.id,
                farms = analysis.farms.len(),
                failures = analysis.failures(),
                "Map analysed"
            );
            analysis
        })
        .collect()
}

fn sample_farm(
    map: &MapLayer,
    farm: &FarmInput,
    options: SampleOptions,
) -> Result<f64, SamplingFailure> {
    if let Validity::Invalid(reason) = validate_geometry(&farm.geometry) {
        warn!(map = %map.id, farm = %farm.id, reason = %reason, "Skipping invalid farm");
        return Err(SamplingFailure::InvalidGeometry(reason.to_string()));
    }

    sample_deforestation(farm.geometry.footprint(), &map.path, options).map_err(|e| {
        let failure = SamplingFailure::from(e);
        match failure {
            SamplingFailure::NoDataOverlap => {}
            _ => warn!(map = %map.id, farm = %farm.id, error = %failure, "Sampling failed"),
        }
        failure
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{build_geometry, FarmGeometry, LngLat};
    use crate::raster::test_support::write_geotiff;
    use geo::{LineString, Polygon};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn square(min_lon: f64, min_lat: f64, size: f64) -> FarmGeometry {
        build_geometry(
            &[
                LngLat::new(min_lon, min_lat),
                LngLat::new(min_lon + size, min_lat),
                LngLat::new(min_lon + size, min_lat + size),
                LngLat::new(min_lon, min_lat + size),
            ],
            None,
        )
        .unwrap()
    }

    fn layer(id: &str, path: &Path) -> MapLayer {
        MapLayer {
            id: id.to_string(),
            name: format!("Layer {}", id),
            path: path.to_path_buf(),
            pixel_size_m: None,
        }
    }

    #[test]
    fn test_failures_are_isolated_per_farm() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loss.tif");
        write_geotiff(&path, 10, 10, &[1; 100], (-50.0, 10.01), 0.001, 4326, None);

        let bow_tie = FarmGeometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]),
            vec![],
        ));
        let farms = vec![
            FarmInput::new("inside", square(-50.0, 10.0, 0.01)),
            FarmInput::new("outside", square(20.0, 20.0, 0.01)),
            FarmInput::new("broken", bow_tie),
        ];

        let results = analyze_deforestation(&[layer("m1", &path)], &farms, AreaOptions::default());
        assert_eq!(results.len(), 1);
        let analysis = &results[0];
        assert_eq!(analysis.farms.len(), 3);
        assert_eq!(analysis.failures(), 2);

        let inside = analysis.sample("inside").unwrap().ratio.clone().unwrap();
        assert!((inside - 1.0).abs() < 1e-6);
        assert_eq!(
            analysis.sample("outside").unwrap().ratio,
            Err(SamplingFailure::NoDataOverlap)
        );
        assert!(matches!(
            analysis.sample("broken").unwrap().ratio,
            Err(SamplingFailure::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_missing_raster_fails_only_that_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loss.tif");
        write_geotiff(&path, 10, 10, &[0; 100], (-50.0, 10.01), 0.001, 4326, None);

        let farms = vec![FarmInput::new("a", square(-50.0, 10.0, 0.01))];
        let maps = vec![
            layer("z-missing", &PathBuf::from("/nonexistent/loss.tif")),
            layer("a-present", &path),
        ];

        let results = analyze_deforestation(&maps, &farms, AreaOptions::default());
        assert_eq!(results[0].map_id, "a-present");
        assert_eq!(results[0].farms[0].ratio, Ok(0.0));
        assert!(matches!(
            results[1].farms[0].ratio,
            Err(SamplingFailure::RasterIo(_))
        ));
    }

    #[test]
    fn test_empty_farm_scores_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loss.tif");
        write_geotiff(&path, 10, 10, &[1; 100], (-50.0, 10.01), 0.001, 4326, None);

        let farms = vec![FarmInput::new("empty", build_geometry(&[], None).unwrap())];
        let results = analyze_deforestation(&[layer("m", &path)], &farms, AreaOptions::default());
        assert_eq!(results[0].farms[0].ratio, Ok(0.0));
    }

    #[test]
    fn test_sample_serialization() {
        let ok = FarmSample {
            farm_id: "f1".to_string(),
            ratio: Ok(0.25),
        };
        let failed = FarmSample {
            farm_id: "f2".to_string(),
            ratio: Err(SamplingFailure::NoDataOverlap),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"farmId": "f1", "value": 0.25, "failure": null})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"farmId": "f2", "value": null, "failure": {"kind": "no_data_overlap"}})
        );
    }

    #[test]
    fn test_raster_error_mapping() {
        assert_eq!(
            SamplingFailure::from(crate::raster::RasterError::NoDataOverlap),
            SamplingFailure::NoDataOverlap
        );
        assert!(matches!(
            SamplingFailure::from(crate::raster::RasterError::UnsupportedCrs("EPSG:2154".into())),
            SamplingFailure::Raster(_)
        ));
    }
}
