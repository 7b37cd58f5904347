use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_UTM_TEMPLATE: &str =
    "{{ zone_number }} {{ zone_letter }} {{ easting | int }} {{ northing | int }}";

pub const DEFAULT_MAX_REJECTION_ATTEMPTS: u64 = 1_000_000;

/// Process-wide defaults handed to every supplier at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub geo_lat_first: bool,
    pub geo_utm_template: String,
    pub max_rejection_attempts: u64,
    pub data_dir: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geo_lat_first: false,
            geo_utm_template: DEFAULT_UTM_TEMPLATE.to_string(),
            max_rejection_attempts: DEFAULT_MAX_REJECTION_ATTEMPTS,
            data_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            geo_lat_first: env_var_bool("GEO_LAT_FIRST", defaults.geo_lat_first),
            geo_utm_template: env_var("GEO_UTM_TEMPLATE", defaults.geo_utm_template),
            max_rejection_attempts: env_var_u64(
                "GEO_MAX_REJECTION_ATTEMPTS",
                defaults.max_rejection_attempts,
            ),
            data_dir: env_var("GEO_DATA_DIR", defaults.data_dir),
            log_level: env_var("GEO_LOG_LEVEL", defaults.log_level),
        }
    }
}

/// Interprets the loose truthy spellings accepted in field configs and env vars.
pub fn parse_affirmative(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" => Some(true),
        "0" | "false" | "no" | "off" | "n" => Some(false),
        _ => None,
    }
}

fn env_var(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_var_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| parse_affirmative(&value))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_long_first_with_jinja_template() {
        let settings = Settings::default();
        assert!(!settings.geo_lat_first);
        assert_eq!(settings.geo_utm_template, DEFAULT_UTM_TEMPLATE);
        assert_eq!(settings.max_rejection_attempts, 1_000_000);
    }

    #[test]
    fn affirmative_spellings() {
        assert_eq!(parse_affirmative("Yes"), Some(true));
        assert_eq!(parse_affirmative(" on "), Some(true));
        assert_eq!(parse_affirmative("0"), Some(false));
        assert_eq!(parse_affirmative("maybe"), None);
    }

    #[test]
    fn partial_settings_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"geo_lat_first": true}"#).unwrap();
        assert!(settings.geo_lat_first);
        assert_eq!(settings.max_rejection_attempts, DEFAULT_MAX_REJECTION_ATTEMPTS);
    }
}
