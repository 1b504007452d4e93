// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./downtime.toml` > `~/.config/downtime/downtime.toml`
//! > `/etc/downtime/downtime.toml` with environment variable overrides via the
//! `DOWNTIME_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DowntimeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/downtime/downtime.toml` (system-wide)
/// 3. `~/.config/downtime/downtime.toml` (user XDG config)
/// 4. `./downtime.toml` (local directory)
/// 5. `DOWNTIME_*` environment variables
pub fn load_config() -> Result<DowntimeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DowntimeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DowntimeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DowntimeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DowntimeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DowntimeConfig::default()))
        .merge(Toml::file("/etc/downtime/downtime.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("downtime/downtime.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("downtime.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. `DOWNTIME_CACHE_DATABASE_PATH` must map to
/// `cache.database_path`, not `cache.database.path`.
fn env_provider() -> Env {
    Env::prefixed("DOWNTIME_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: DOWNTIME_CACHE_DATABASE_PATH -> "cache_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("plant_", "plant.", 1)
            .replacen("monitor_", "monitor.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("planner_", "planner.", 1);
        mapped.into()
    })
}
