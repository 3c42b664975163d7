//! User configuration.
//!
//! `~/.monbo/config.ini` holds the overlap threshold, map output settings,
//! area options, satellite provider credentials and the log file location.
//! Environment variables override the file:
//!
//! - `OVERLAP_THRESHOLD_PERCENTAGE`
//! - `GCP_MAPS_PLATFORM_API_KEY`
//! - `GCP_MAPS_PLATFORM_SIGNATURE_SECRET`
//!
//! # Example
//!
//! ```no_run
//! use monbo::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let options = config.map_options();
//! # Ok::<(), monbo::config::ConfigFileError>(())
//! ```

mod defaults;
mod env;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    DEFAULT_LOG_FILE, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_OUTPUT_HEIGHT,
    DEFAULT_OUTPUT_WIDTH, DEFAULT_POINT_RADIUS, DEFAULT_THRESHOLD_PERCENTAGE, MAX_CONFIG_ZOOM,
};
pub use env::{ENV_API_KEY, ENV_SIGNATURE_SECRET, ENV_THRESHOLD};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AreaSettings, ConfigFile, LoggingSettings, MapSettings, OverlapSettings, ProviderSettings,
};
