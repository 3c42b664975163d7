//! Area command - ground area of each farm.

use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use monbo::geometry::{geometry_area, AreaOptions, INVALID_AREA};
use monbo::overlap::FarmInput;

use super::common::load_farms;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the area command.
pub struct AreaArgs {
    pub farms: PathBuf,
    pub output: Option<PathBuf>,
}

/// Area of one farm.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmArea {
    pub id: String,
    pub kind: &'static str,
    /// Square meters; -1 for an invalid ring
    pub area: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the area command.
pub fn run(global: &GlobalOptions, args: AreaArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("area");
    let config = runner.config();

    let farms = load_farms(&args.farms, config.map.default_point_radius)?;
    let areas = measure(&farms, config.area_options());

    runner.emit_json(&areas, args.output.as_deref())
}

fn measure(farms: &[FarmInput], options: AreaOptions) -> Vec<FarmArea> {
    farms
        .iter()
        .map(|farm| {
            let (area, error) = match geometry_area(&farm.geometry, options) {
                Ok(area) => (area, None),
                Err(e) => {
                    warn!(farm = %farm.id, error = %e, "Area unavailable");
                    (INVALID_AREA, Some(e.to_string()))
                }
            };
            FarmArea {
                id: farm.id.clone(),
                kind: farm.geometry.kind(),
                area,
                error,
            }
        })
        .collect()
}
