// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as recognized log levels and positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::DowntimeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DowntimeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.plant.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "plant.name must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.plant.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "plant.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.plant.log_level
            ),
        });
    }

    if config.monitor.interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "monitor.interval_secs must be at least 1".to_string(),
        });
    }

    // Only constrain the cache path when the cache will actually open it.
    if config.cache.enabled && config.cache.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.database_path must not be empty".to_string(),
        });
    }

    if config.planner.interval_days == 0 {
        errors.push(ConfigError::Validation {
            message: "planner.interval_days must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = DowntimeConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_plant_name_fails_validation() {
        let mut config = DowntimeConfig::default();
        config.plant.name = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("plant.name")))
        );
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = DowntimeConfig::default();
        config.plant.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level")))
        );
    }

    #[test]
    fn zero_monitor_interval_fails_validation() {
        let mut config = DowntimeConfig::default();
        config.monitor.interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("interval_secs")))
        );
    }

    #[test]
    fn empty_database_path_only_matters_when_cache_enabled() {
        let mut config = DowntimeConfig::default();
        config.cache.database_path = "".to_string();
        config.cache.enabled = false;
        assert!(validate_config(&config).is_ok());

        config.cache.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path")))
        );
    }

    #[test]
    fn all_problems_are_reported_together() {
        let mut config = DowntimeConfig::default();
        config.plant.name = "".to_string();
        config.plant.log_level = "loud".to_string();
        config.monitor.interval_secs = 0;
        config.planner.interval_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn sections_deserialize_directly_from_toml() {
        let toml_str = r#"
[plant]
name = "press-hall"

[planner]
interval_days = 7
"#;
        let config: DowntimeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.plant.name, "press-hall");
        assert_eq!(config.planner.interval_days, 7);
        assert!(config.monitor.enabled, "untouched sections keep defaults");
    }

    #[test]
    fn unknown_planner_field_is_rejected() {
        let toml_str = r#"
[planner]
interval_weeks = 2
"#;
        assert!(toml::from_str::<DowntimeConfig>(toml_str).is_err());
    }
}
