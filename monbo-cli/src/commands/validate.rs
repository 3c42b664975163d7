//! Validate command - overlap and geometry consistency report.

use std::path::PathBuf;

use tracing::info;

use monbo::overlap::{FarmStatus, OverlapDetector};

use super::common::load_farms;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the validate command.
pub struct ValidateArgs {
    pub farms: PathBuf,
    /// Overrides the configured threshold percentage
    pub threshold: Option<f64>,
    pub output: Option<PathBuf>,
}

/// Run the validate command.
pub fn run(global: &GlobalOptions, args: ValidateArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("validate");
    let config = runner.config();

    let threshold = match args.threshold {
        Some(t) if !(0.0..=100.0).contains(&t) => {
            return Err(CliError::Config(format!(
                "threshold must be between 0 and 100, got {}",
                t
            )));
        }
        Some(t) => t,
        None => config.overlap.threshold_percentage,
    };

    let farms = load_farms(&args.farms, config.map.default_point_radius)?;
    let report = OverlapDetector::new(threshold)
        .with_area_options(config.area_options())
        .analyze(&farms);

    let not_valid = report
        .farms
        .iter()
        .filter(|f| f.status == FarmStatus::NotValid)
        .count();
    info!(
        farms = farms.len(),
        threshold,
        inconsistencies = report.inconsistencies.len(),
        not_valid,
        "Validation complete"
    );

    runner.emit_json(&report, args.output.as_deref())
}
