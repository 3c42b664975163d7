//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use monbo::compositor::MapGenerationError;
use monbo::config::ConfigFileError;
use monbo::geometry::GeometryError;
use monbo::provider::ProviderError;
use monbo::raster::RasterError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Input file missing or malformed
    Input { path: String, message: String },
    /// A farm could not be built from its input
    Farm { id: String, error: GeometryError },
    /// No farm with the requested id
    FarmNotFound(String),
    /// Satellite provider could not be created
    Provider(ProviderError),
    /// Map rendering failed
    Map(MapGenerationError),
    /// Tile rendering failed
    Tile(RasterError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Provider(ProviderError::InvalidSecret(_))
            | CliError::Provider(ProviderError::MissingCredentials(_)) => {
                eprintln!();
                eprintln!("Satellite imagery needs both credentials:");
                eprintln!("  GCP_MAPS_PLATFORM_API_KEY or [provider] api_key");
                eprintln!("  GCP_MAPS_PLATFORM_SIGNATURE_SECRET or [provider] signature_secret");
                eprintln!("Without them maps are drawn on a solid background.");
            }
            CliError::Farm { .. } => {
                eprintln!();
                eprintln!("A farm needs one of:");
                eprintln!("  \"coordinates\": three or more {{\"lng\", \"lat\"}} points");
                eprintln!("  \"coordinates\": one point plus \"radius\" in meters");
                eprintln!("  \"legacy\": \"[(lon, lat), ...]\"");
                eprintln!("  \"geometry\": a GeoJSON Polygon or Point");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Input { path, message } => {
                write!(f, "Failed to read input '{}': {}", path, message)
            }
            CliError::Farm { id, error } => write!(f, "Farm '{}': {}", id, error),
            CliError::FarmNotFound(id) => write!(f, "No farm with id '{}' in the input", id),
            CliError::Provider(e) => write!(f, "Failed to create satellite provider: {}", e),
            CliError::Map(e) => write!(f, "Failed to generate map: {}", e),
            CliError::Tile(e) => write!(f, "Failed to render tile: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Farm { error, .. } => Some(error),
            CliError::Provider(e) => Some(e),
            CliError::Map(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<MapGenerationError> for CliError {
    fn from(e: MapGenerationError) -> Self {
        CliError::Map(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CliError::FarmNotFound("f1".to_string()).to_string(),
            "No farm with id 'f1' in the input"
        );
        let err = CliError::Input {
            path: "farms.json".to_string(),
            message: "expected array".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to read input 'farms.json': expected array");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err = CliError::Farm {
            id: "f1".to_string(),
            error: GeometryError::Parse("bad".to_string()),
        };
        assert!(err.source().is_some());
        assert!(CliError::Config("x".to_string()).source().is_none());
    }
}
