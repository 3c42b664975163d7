//! Loading, validating and writing `~/.monbo/config.ini`.
//!
//! [`ConfigFile::load_effective`] is the entry point commands use: it reads
//! the file (defaults when it is missing), applies the environment overrides
//! and then checks the settings that only make sense together, such as the
//! two halves of the provider credentials.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::env::{ENV_API_KEY, ENV_SIGNATURE_SECRET};
use super::settings::ConfigFile;
use crate::provider::decode_secret;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not readable INI
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// Writing the file or creating its directory failed
    #[error("Cannot write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single value failed to parse or is out of range
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Only one of the two provider credentials is set
    #[error("Provider credentials are incomplete: {missing} is not set (config or {env})")]
    IncompleteCredentials {
        missing: &'static str,
        env: &'static str,
    },

    /// The URL signing secret is not base64url
    #[error("Invalid configuration: provider.signature_secret does not decode as base64url")]
    InvalidSecret,

    /// The log file setting cannot name a file
    #[error("Invalid configuration: logging.file = '{path}' - {reason}")]
    InvalidLogFile { path: PathBuf, reason: &'static str },
}

impl ConfigFile {
    /// Loads `~/.monbo/config.ini` with environment overrides applied.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_effective(&config_file_path())
    }

    /// Loads `path`, applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Any [`ConfigFileError`]; credentials are checked after the
    /// environment is applied, so a key in the file and a secret in the
    /// environment form a valid pair.
    pub fn load_effective(path: &Path) -> Result<Self, ConfigFileError> {
        let config = Self::load_from(path)?.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses `path` without environment overrides or cross-field checks.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        super::parser::parse_ini(&ini)
    }

    /// Checks settings that depend on each other.
    ///
    /// Both provider credentials must be set or both absent, the secret must
    /// decode, and the log file must not point at a directory.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        match (&self.provider.api_key, &self.provider.signature_secret) {
            (Some(_), None) => {
                return Err(ConfigFileError::IncompleteCredentials {
                    missing: "provider.signature_secret",
                    env: ENV_SIGNATURE_SECRET,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigFileError::IncompleteCredentials {
                    missing: "provider.api_key",
                    env: ENV_API_KEY,
                })
            }
            (Some(_), Some(secret)) => {
                decode_secret(secret).map_err(|_| ConfigFileError::InvalidSecret)?;
            }
            (None, None) => {}
        }

        let log = &self.logging.file;
        if log.file_name().is_none() {
            return Err(ConfigFileError::InvalidLogFile {
                path: log.clone(),
                reason: "must end in a file name",
            });
        }
        if log.is_dir() {
            return Err(ConfigFileError::InvalidLogFile {
                path: log.clone(),
                reason: "is a directory",
            });
        }

        Ok(())
    }

    /// Writes the commented config file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_error = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, super::writer::to_config_string(self)).map_err(write_error)
    }
}

/// Get the path to the config directory (~/.monbo).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".monbo")
}

/// Get the path to the config file (~/.monbo/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SECRET: &str = "c2VjcmV0";

    fn with_credentials(key: Option<&str>, secret: Option<&str>) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.provider.api_key = key.map(str::to_string);
        config.provider.signature_secret = secret.map(str::to_string);
        config
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = with_credentials(Some("key"), Some(SECRET));
        config.map.padding_ratio = 0.25;
        config.overlap.threshold_percentage = 12.5;
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_read_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[overlap\nthreshold_percentage = 5\n").unwrap();

        let err = ConfigFile::load_from(&config_path).unwrap_err();
        assert!(matches!(err, ConfigFileError::Read { .. }));
        assert!(err.to_string().contains("config.ini"));
    }

    #[test]
    fn test_write_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = ConfigFile::default()
            .save_to(&blocker.join("config.ini"))
            .unwrap_err();
        assert!(matches!(err, ConfigFileError::Write { .. }));
    }

    #[test]
    fn test_half_credentials_are_rejected() {
        let err = with_credentials(Some("key"), None).validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::IncompleteCredentials {
                env: ENV_SIGNATURE_SECRET,
                ..
            }
        ));

        let err = with_credentials(None, Some(SECRET)).validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::IncompleteCredentials {
                env: ENV_API_KEY,
                ..
            }
        ));
    }

    #[test]
    fn test_environment_completes_file_credentials() {
        let config = with_credentials(Some("key"), None)
            .with_overrides(|name| (name == ENV_SIGNATURE_SECRET).then(|| SECRET.to_string()))
            .unwrap();
        assert!(config.validate().is_ok());
        assert!(config.provider.has_credentials());
    }

    #[test]
    fn test_undecodable_secret_is_rejected() {
        let err = with_credentials(Some("key"), Some("not base64!"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidSecret));
    }

    #[test]
    fn test_log_file_must_not_be_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = ConfigFile::default();
        config.logging.file = temp_dir.path().to_path_buf();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidLogFile { .. }));

        config.logging.file = temp_dir.path().join("monbo.log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_effective_validates_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(
            &config_path,
            format!(
                "[provider]\nsignature_secret = {}\n[logging]\nfile = {}\n",
                SECRET,
                temp_dir.path().join("monbo.log").display()
            ),
        )
        .unwrap();

        // Skipped when the environment supplies the key
        if std::env::var(ENV_API_KEY).map_or(true, |v| v.trim().is_empty()) {
            assert!(matches!(
                ConfigFile::load_effective(&config_path),
                Err(ConfigFileError::IncompleteCredentials { .. })
            ));
        }
    }

    #[test]
    fn test_config_paths() {
        assert!(config_directory().ends_with(".monbo"));
        assert!(config_file_path().ends_with(".monbo/config.ini"));
    }
}
