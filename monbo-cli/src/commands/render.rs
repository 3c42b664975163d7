//! Render command - farm map image.

use std::path::PathBuf;

use tracing::info;

use monbo::compositor::{Background, MapRequest};
use monbo::overlap::FarmInput;

use super::common::load_farms;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the render command.
pub struct RenderArgs {
    pub farms: PathBuf,
    /// Farm to draw, the first one when unset
    pub farm_id: Option<String>,
    /// Loss raster drawn under the farm outline
    pub raster: Option<PathBuf>,
    pub output: PathBuf,
}

/// Run the render command.
pub fn run(global: &GlobalOptions, args: RenderArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("render");

    let farms = load_farms(&args.farms, runner.config().map.default_point_radius)?;
    let farm = select_farm(farms, args.farm_id.as_deref())?;

    let mut request = MapRequest::new(farm.geometry);
    if let Some(raster) = args.raster {
        request = request.with_raster(raster);
    }

    let compositor = runner.create_compositor()?;
    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    let map = runtime.block_on(compositor.generate(&request))?;

    if map.background == Background::Fallback {
        eprintln!("Satellite imagery unavailable, drawn on the solid background");
    }
    runner.write_file(&args.output, &map.to_png()?)?;

    info!(
        farm = %farm.id,
        zoom = map.zoom(),
        raster_layer = map.raster_layer,
        "Map rendered"
    );
    println!(
        "Saved {} ({}x{}, zoom {})",
        args.output.display(),
        map.image.width(),
        map.image.height(),
        map.zoom()
    );
    Ok(())
}

fn select_farm(farms: Vec<FarmInput>, id: Option<&str>) -> Result<FarmInput, CliError> {
    match id {
        Some(id) => farms
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| CliError::FarmNotFound(id.to_string())),
        None => farms
            .into_iter()
            .next()
            .ok_or_else(|| CliError::FarmNotFound("(first)".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monbo::geometry::{build_geometry, LngLat};

    fn farms() -> Vec<FarmInput> {
        ["a", "b"]
            .iter()
            .map(|id| {
                FarmInput::new(
                    *id,
                    build_geometry(&[LngLat::new(0.0, 0.0)], Some(50.0)).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_select_farm() {
        assert_eq!(select_farm(farms(), None).unwrap().id, "a");
        assert_eq!(select_farm(farms(), Some("b")).unwrap().id, "b");
        assert!(matches!(
            select_farm(farms(), Some("z")),
            Err(CliError::FarmNotFound(_))
        ));
        assert!(select_farm(Vec::new(), None).is_err());
    }
}
