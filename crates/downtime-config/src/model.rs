// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Downtime service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Downtime configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DowntimeConfig {
    /// Plant identity and logging settings.
    #[serde(default)]
    pub plant: PlantConfig,

    /// Expiration monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Offline ticket cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Follow-up maintenance planner settings.
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Plant identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlantConfig {
    /// Display name of the plant, used in logs.
    #[serde(default = "default_plant_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            name: default_plant_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_plant_name() -> String {
    "plant-1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Expiration monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Enable the background expiration sweep.
    #[serde(default = "default_monitor_enabled")]
    pub enabled: bool,

    /// Seconds between expiration sweeps.
    #[serde(default = "default_monitor_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_monitor_enabled(),
            interval_secs: default_monitor_interval_secs(),
        }
    }
}

fn default_monitor_enabled() -> bool {
    true
}

fn default_monitor_interval_secs() -> u64 {
    60
}

/// Offline ticket cache configuration.
///
/// The cache keeps a local SQLite mirror of tickets plus a queue of writes
/// made while the primary store is unreachable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Enable the offline cache. When false, reads and writes go straight to
    /// the primary store and connectivity loss surfaces immediately.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("downtime").join("downtime.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("downtime.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Follow-up maintenance planner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Days until the next preventive maintenance after a verified repair.
    #[serde(default = "default_planner_interval_days")]
    pub interval_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            interval_days: default_planner_interval_days(),
        }
    }
}

fn default_planner_interval_days() -> u32 {
    30
}
