//! Environment variable overrides applied on top of config.ini.

use super::file::ConfigFileError;
use super::parser::{invalid, parse_threshold};
use super::settings::ConfigFile;

pub const ENV_THRESHOLD: &str = "OVERLAP_THRESHOLD_PERCENTAGE";
pub const ENV_API_KEY: &str = "GCP_MAPS_PLATFORM_API_KEY";
pub const ENV_SIGNATURE_SECRET: &str = "GCP_MAPS_PLATFORM_SIGNATURE_SECRET";

impl ConfigFile {
    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::InvalidValue`] when the threshold variable is
    /// not a number between 0 and 100.
    pub fn with_env_overrides(self) -> Result<Self, ConfigFileError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigFileError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_THRESHOLD) {
            self.overlap.threshold_percentage =
                parse_threshold(&v).map_err(|reason| invalid("env", ENV_THRESHOLD, &v, reason))?;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.provider.api_key = Some(v.trim().to_string());
        }
        if let Some(v) = get(ENV_SIGNATURE_SECRET) {
            self.provider.signature_secret = Some(v.trim().to_string());
        }

        Ok(self)
    }
}
