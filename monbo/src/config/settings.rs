//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::compositor::MapOptions;
use crate::coord::{ImageSize, ZoomRange};
use crate::geometry::AreaOptions;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Overlap detection settings
    pub overlap: OverlapSettings,
    /// Map image settings
    pub map: MapSettings,
    /// Area measurement settings
    pub area: AreaSettings,
    /// Satellite provider settings
    pub provider: ProviderSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Overlap detection configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapSettings {
    /// Pairs are reported when their overlap percentage exceeds this (0-100)
    pub threshold_percentage: f64,
}

/// Map image configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub output_width: u32,
    pub output_height: u32,
    /// Padding added on each side of the farm bounds (0.0-0.3)
    pub padding_ratio: f64,
    /// Radius in meters used for point farms sent without one
    pub default_point_radius: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

/// Area measurement configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSettings {
    /// Fail instead of warning when the area accuracy check is exceeded
    pub strict_accuracy: bool,
}

/// Satellite imagery provider configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Maps Platform API key
    pub api_key: Option<String>,
    /// URL signing secret (URL-safe base64)
    pub signature_secret: Option<String>,
    /// HTTP timeout in seconds
    pub timeout: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Map options for the compositor.
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            size: ImageSize::new(self.map.output_width, self.map.output_height),
            padding_ratio: self.map.padding_ratio,
            zoom_range: ZoomRange::new(self.map.min_zoom, self.map.max_zoom),
        }
    }

    pub fn area_options(&self) -> AreaOptions {
        AreaOptions {
            strict: self.area.strict_accuracy,
        }
    }
}

impl ProviderSettings {
    /// True when both the API key and the signing secret are set.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.signature_secret.is_some()
    }
}
