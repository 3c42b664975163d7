//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let api_key = config.provider.api_key.as_deref().unwrap_or("");
    let signature_secret = config.provider.signature_secret.as_deref().unwrap_or("");

    format!(
        r#"[overlap]
; Report a pair of farms when their overlap (intersection over union)
; exceeds this percentage, 0-100 (default: 0, any overlap)
; Overridden by OVERLAP_THRESHOLD_PERCENTAGE
threshold_percentage = {}

[map]
; Output image size in pixels (default: 500x500)
output_width = {}
output_height = {}
; Padding added on each side of the farm bounds (default: 0.1, clamped to 0.0-0.3)
padding_ratio = {}
; Radius in meters for point farms sent without one (default: 50)
default_point_radius = {}
; Zoom window for generated maps (default: 1-20)
min_zoom = {}
max_zoom = {}

[area]
; Fail instead of warning when two area computations differ by more than 5%
strict_accuracy = {}

[provider]
; Maps Platform Static Maps credentials. Without both, maps use a solid background.
; Overridden by GCP_MAPS_PLATFORM_API_KEY and GCP_MAPS_PLATFORM_SIGNATURE_SECRET
api_key = {}
; URL signing secret (URL-safe base64)
signature_secret = {}
; Timeout in seconds for satellite image requests (default: 10)
timeout = {}

[logging]
; Log file, cleared on each run (default: ~/.monbo/monbo.log)
file = {}
"#,
        config.overlap.threshold_percentage,
        config.map.output_width,
        config.map.output_height,
        config.map.padding_ratio,
        config.map.default_point_radius,
        config.map.min_zoom,
        config.map.max_zoom,
        config.area.strict_accuracy,
        api_key,
        signature_secret,
        config.provider.timeout,
        config.logging.file.to_string_lossy(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ini::Ini;

    #[test]
    fn test_written_config_parses_back() {
        let mut config = ConfigFile::default();
        config.overlap.threshold_percentage = 7.5;
        config.map.output_width = 800;
        config.area.strict_accuracy = true;
        config.provider.api_key = Some("key".to_string());

        let text = to_config_string(&config);
        let parsed = super::super::parser::parse_ini(&Ini::load_from_str(&text).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_template_is_commented() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("; Overridden by OVERLAP_THRESHOLD_PERCENTAGE"));
        assert!(text.contains("api_key = \n"));
    }
}
