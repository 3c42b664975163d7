//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, compositor creation
//! and output handling shared by the command handlers.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use monbo::compositor::{MapCompositor, StaticMapCompositor};
use monbo::config::{config_file_path, ConfigFile};
use monbo::logging::{init_logging, split_log_path, LoggingGuard};
use monbo::provider::{AsyncReqwestClient, StaticMapProvider};

use crate::error::CliError;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file, `~/.monbo/config.ini` when unset
    pub config: Option<PathBuf>,
    /// Debug-level logging
    pub debug: bool,
    /// Mirror log events to stderr
    pub verbose: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Loads the config (file plus environment) and initializes logging.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let path = options.config.clone().unwrap_or_else(config_file_path);
        let config = ConfigFile::load_effective(&path)?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(&log_dir, &log_file, options.verbose, options.debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("monbo v{}", monbo::VERSION);
        info!("monbo CLI: {} command", command);
    }

    /// Creates the map compositor.
    ///
    /// Without both provider credentials the compositor draws every map on
    /// the solid fallback background.
    pub fn create_compositor(&self) -> Result<StaticMapCompositor, CliError> {
        let settings = &self.config.provider;
        let provider = match (&settings.api_key, &settings.signature_secret) {
            (Some(key), Some(secret)) => {
                let client = AsyncReqwestClient::with_timeout(settings.timeout)?;
                let provider = StaticMapProvider::new(client, key.clone(), secret)?;
                info!(timeout_secs = settings.timeout, "Satellite provider configured");
                Some(provider)
            }
            _ => {
                warn!("Provider credentials not configured, maps use the solid background");
                None
            }
        };
        Ok(MapCompositor::new(provider, self.config.map_options()))
    }

    /// Writes binary output to a file.
    pub fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), CliError> {
        std::fs::write(path, data).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })?;
        info!(path = %path.display(), bytes = data.len(), "Output written");
        Ok(())
    }

    /// Prints a value as pretty JSON on stdout, or writes it to `output`.
    pub fn emit_json<T: Serialize>(&self, value: &T, output: Option<&Path>) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| CliError::Config(format!("Failed to serialize output: {}", e)))?;
        match output {
            Some(path) => self.write_file(path, json.as_bytes()),
            None => {
                println!("{}", json);
                Ok(())
            }
        }
    }
}
