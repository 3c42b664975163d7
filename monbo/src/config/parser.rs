//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{clamp_padding_ratio, MAX_CONFIG_ZOOM};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [overlap] section
    if let Some(section) = ini.section(Some("overlap")) {
        if let Some(v) = section.get("threshold_percentage") {
            config.overlap.threshold_percentage = parse_threshold(v)
                .map_err(|reason| invalid("overlap", "threshold_percentage", v, reason))?;
        }
    }

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("output_width") {
            config.map.output_width = parse_dimension(v, "map", "output_width")?;
        }
        if let Some(v) = section.get("output_height") {
            config.map.output_height = parse_dimension(v, "map", "output_height")?;
        }
        if let Some(v) = section.get("padding_ratio") {
            let parsed: f64 = parse_value(v, "map", "padding_ratio", "must be a number")?;
            config.map.padding_ratio = clamp_padding_ratio(parsed);
        }
        if let Some(v) = section.get("default_point_radius") {
            let radius: f64 =
                parse_value(v, "map", "default_point_radius", "must be a number of meters")?;
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid("map", "default_point_radius", v, "must be positive"));
            }
            config.map.default_point_radius = radius;
        }
        if let Some(v) = section.get("min_zoom") {
            config.map.min_zoom = parse_zoom(v, "min_zoom")?;
        }
        if let Some(v) = section.get("max_zoom") {
            config.map.max_zoom = parse_zoom(v, "max_zoom")?;
        }
        if config.map.min_zoom > config.map.max_zoom {
            return Err(invalid(
                "map",
                "min_zoom",
                &config.map.min_zoom.to_string(),
                "must not exceed max_zoom",
            ));
        }
    }

    // [area] section
    if let Some(section) = ini.section(Some("area")) {
        if let Some(v) = section.get("strict_accuracy") {
            config.area.strict_accuracy = parse_bool(v)
                .ok_or_else(|| invalid("area", "strict_accuracy", v, "must be true or false"))?;
        }
    }

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("api_key") {
            config.provider.api_key = non_empty(v);
        }
        if let Some(v) = section.get("signature_secret") {
            config.provider.signature_secret = non_empty(v);
        }
        if let Some(v) = section.get("timeout") {
            let timeout: u64 =
                parse_value(v, "provider", "timeout", "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(invalid("provider", "timeout", v, "must be a positive integer (seconds)"));
            }
            config.provider.timeout = timeout;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parses an overlap threshold percentage.
pub(super) fn parse_threshold(value: &str) -> Result<f64, &'static str> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| "must be a number between 0 and 100")?;
    if !(0.0..=100.0).contains(&parsed) {
        return Err("must be between 0 and 100");
    }
    Ok(parsed)
}

fn parse_value<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_dimension(value: &str, section: &str, key: &str) -> Result<u32, ConfigFileError> {
    let parsed: u32 = parse_value(value, section, key, "must be a positive integer (pixels)")?;
    if parsed == 0 {
        return Err(invalid(section, key, value, "must be a positive integer (pixels)"));
    }
    Ok(parsed)
}

fn parse_zoom(value: &str, key: &str) -> Result<u8, ConfigFileError> {
    let parsed: u8 = parse_value(value, "map", key, "must be an integer between 0 and 21")?;
    if parsed > MAX_CONFIG_ZOOM {
        return Err(invalid("map", key, value, "must be an integer between 0 and 21"));
    }
    Ok(parsed)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub(super) fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand ~ to home directory.
fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
