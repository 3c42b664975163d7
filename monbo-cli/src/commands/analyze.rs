//! Analyze command - deforestation ratio of every farm on every layer.

use std::path::PathBuf;

use monbo::analysis::{analyze_deforestation, MapLayer};

use super::common::{load_farms, read_json};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the analyze command.
pub struct AnalyzeArgs {
    pub farms: PathBuf,
    /// JSON array of `{"id", "name", "path", "pixelSizeM"?}`
    pub maps: PathBuf,
    pub output: Option<PathBuf>,
}

/// Run the analyze command.
pub fn run(global: &GlobalOptions, args: AnalyzeArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("analyze");
    let config = runner.config();

    let farms = load_farms(&args.farms, config.map.default_point_radius)?;
    let mut maps: Vec<MapLayer> = read_json(&args.maps)?;

    // Relative raster paths are resolved against the map file's directory
    if let Some(base) = args.maps.parent() {
        for map in &mut maps {
            if map.path.is_relative() {
                map.path = base.join(&map.path);
            }
        }
    }

    let results = analyze_deforestation(&maps, &farms, config.area_options());
    runner.emit_json(&results, args.output.as_deref())
}
