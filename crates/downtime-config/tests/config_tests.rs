// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Downtime configuration system.

use downtime_config::diagnostic::{ConfigError, suggest_key};
use downtime_config::model::DowntimeConfig;
use downtime_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_downtime_config() {
    let toml = r#"
[plant]
name = "stamping-north"
log_level = "debug"

[monitor]
enabled = false
interval_secs = 15

[cache]
enabled = true
database_path = "/tmp/test.db"
wal_mode = false

[planner]
interval_days = 14
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.plant.name, "stamping-north");
    assert_eq!(config.plant.log_level, "debug");
    assert!(!config.monitor.enabled);
    assert_eq!(config.monitor.interval_secs, 15);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.database_path, "/tmp/test.db");
    assert!(!config.cache.wal_mode);
    assert_eq!(config.planner.interval_days, 14);
}

/// Unknown field in [plant] section produces an UnknownField error.
#[test]
fn unknown_field_in_plant_produces_error() {
    let toml = r#"
[plant]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.plant.name, "plant-1");
    assert_eq!(config.plant.log_level, "info");
    assert!(config.monitor.enabled);
    assert_eq!(config.monitor.interval_secs, 60);
    assert!(config.cache.enabled);
    assert!(config.cache.wal_mode);
    assert_eq!(config.planner.interval_days, 30);
}

/// Environment variable DOWNTIME_PLANT_NAME overrides plant.name in TOML.
#[test]
fn env_var_overrides_plant_name() {
    // We test this via the Figment builder directly to control env vars in test
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[plant]
name = "from-toml"
"#;

    // Simulate DOWNTIME_PLANT_NAME env var by building figment with test env
    let config: DowntimeConfig = Figment::new()
        .merge(Serialized::defaults(DowntimeConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("plant.name", "envtest"))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.plant.name, "envtest");
}

/// DOWNTIME_CACHE_DATABASE_PATH maps to cache.database_path
/// (NOT cache.database.path).
#[test]
fn env_var_overrides_cache_database_path() {
    use figment::{Figment, providers::Serialized};

    let config: DowntimeConfig = Figment::new()
        .merge(Serialized::defaults(DowntimeConfig::default()))
        .merge(("cache.database_path", "/var/lib/downtime/from-env.db"))
        .extract()
        .expect("should set database_path via dot notation");

    assert_eq!(config.cache.database_path, "/var/lib/downtime/from-env.db");
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: DowntimeConfig = Figment::new()
        .merge(Serialized::defaults(DowntimeConfig::default()))
        .merge(Toml::file("/nonexistent/path/downtime.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    // Should just get defaults
    assert_eq!(config.plant.name, "plant-1");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[notifications]
channel = "email"
"#;

    let err =
        load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("notifications"),
        "error should mention unknown field, got: {err_str}"
    );
}

// ============================================================================
// Diagnostic tests
// ============================================================================

/// Unknown key "intervall_secs" in [monitor] suggests "interval_secs".
#[test]
fn diagnostic_intervall_secs_suggests_interval_secs() {
    let valid_keys = &["enabled", "interval_secs"];
    let suggestion = suggest_key("intervall_secs", valid_keys);
    assert_eq!(suggestion, Some("interval_secs".to_string()));
}

/// Unknown key "zzzzzz" with no close match does NOT produce a suggestion.
#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["name", "log_level"];
    let suggestion = suggest_key("zzzzzz", valid_keys);
    assert!(suggestion.is_none(), "should not suggest for distant typo");
}

/// Error output from load_and_validate_str includes the unknown key name.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[plant]
naem = "test"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(!errors.is_empty(), "should have at least one error");

    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "naem"
                && suggestion.as_deref() == Some("name")
                && valid_keys.contains("name")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'naem' with suggestion 'name', got: {errors:?}"
    );
}

/// Error output includes the list of valid keys for the section.
#[test]
fn diagnostic_error_includes_valid_keys() {
    let toml = r#"
[cache]
database_pth = "/tmp/x.db"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_valid_keys = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { valid_keys, .. } if {
            valid_keys.contains("database_path")
                && valid_keys.contains("wal_mode")
                && valid_keys.contains("enabled")
        })
    });
    assert!(
        has_valid_keys,
        "error should list valid keys for [cache] section"
    );
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[monitor]
interval_secs = "soon"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("interval_secs"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic (can be rendered).
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    // Verify it implements Diagnostic
    let code = error.code();
    assert!(code.is_some(), "should have diagnostic code");

    let help = error.help();
    assert!(help.is_some(), "should have help text");
    let help_str = help.unwrap().to_string();
    assert!(
        help_str.contains("did you mean `name`"),
        "help should contain suggestion, got: {help_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(!buf.is_empty(), "rendered report should not be empty");
    assert!(buf.contains("naem"), "rendered report should mention the key");
}

/// load_and_validate_str with valid TOML returns Ok config.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[plant]
name = "assembly-two"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.plant.name, "assembly-two");
}

/// Validation catches a zero sweep interval.
#[test]
fn validation_catches_zero_interval() {
    let toml = r#"
[monitor]
interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero interval should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("interval_secs"))
    });
    assert!(
        has_validation_error,
        "should have validation error for zero interval"
    );
}

/// Validation catches an unknown log level.
#[test]
fn validation_catches_unknown_log_level() {
    let toml = r#"
[plant]
log_level = "shout"
"#;

    let errors = load_and_validate_str(toml).expect_err("bad log level should fail");
    let has_validation_error = errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level")));
    assert!(
        has_validation_error,
        "should have validation error for unknown log level"
    );
}
