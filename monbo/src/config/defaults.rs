//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, the clamping helpers used by the
//! parser and the `ConfigFile::default()` implementation.

use super::file::config_directory;
use super::settings::*;
use crate::compositor::{DEFAULT_PADDING_RATIO, MAX_PADDING_RATIO};
use crate::provider::DEFAULT_TIMEOUT_SECS;

/// Default overlap threshold: any overlap is reported.
pub const DEFAULT_THRESHOLD_PERCENTAGE: f64 = 0.0;

pub const DEFAULT_OUTPUT_WIDTH: u32 = 500;
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 500;

/// Default radius in meters for point farms sent without one.
pub const DEFAULT_POINT_RADIUS: f64 = 50.0;

pub const DEFAULT_MIN_ZOOM: u8 = 1;
pub const DEFAULT_MAX_ZOOM: u8 = 20;

/// Largest zoom accepted in config.ini.
pub const MAX_CONFIG_ZOOM: u8 = 21;

/// Default log file name under the config directory.
pub const DEFAULT_LOG_FILE: &str = "monbo.log";

/// Clamps the padding ratio and logs a warning if clamped.
pub(super) fn clamp_padding_ratio(value: f64) -> f64 {
    if value < 0.0 {
        tracing::warn!(
            requested = value,
            min = 0.0,
            max = MAX_PADDING_RATIO,
            "padding_ratio below minimum, clamping to 0.0"
        );
        0.0
    } else if value > MAX_PADDING_RATIO {
        tracing::warn!(
            requested = value,
            min = 0.0,
            max = MAX_PADDING_RATIO,
            "padding_ratio above maximum, clamping to {}",
            MAX_PADDING_RATIO
        );
        MAX_PADDING_RATIO
    } else {
        value
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            overlap: OverlapSettings {
                threshold_percentage: DEFAULT_THRESHOLD_PERCENTAGE,
            },
            map: MapSettings {
                output_width: DEFAULT_OUTPUT_WIDTH,
                output_height: DEFAULT_OUTPUT_HEIGHT,
                padding_ratio: DEFAULT_PADDING_RATIO,
                default_point_radius: DEFAULT_POINT_RADIUS,
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: DEFAULT_MAX_ZOOM,
            },
            area: AreaSettings {
                strict_accuracy: false,
            },
            provider: ProviderSettings {
                api_key: None,
                signature_secret: None,
                timeout: DEFAULT_TIMEOUT_SECS,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE),
            },
        }
    }
}
