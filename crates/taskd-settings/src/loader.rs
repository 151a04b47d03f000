//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TaskdSettings::default()`]
//! 2. If a settings file exists, deep-merge its values over defaults
//! 3. Apply `TASKD_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{LogFormat, TaskdSettings};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "TASKD_CONFIG";

/// Settings plus what happened while loading them.
///
/// Loading runs before the log subscriber exists, so anything worth a log
/// line is kept here and emitted by [`LoadedSettings::report`] once logging
/// is up.
#[derive(Debug)]
pub struct LoadedSettings {
    /// Effective settings.
    pub settings: TaskdSettings,
    /// Settings file consulted.
    pub path: PathBuf,
    /// Whether that file existed and was merged.
    pub from_file: bool,
    /// Environment overrides that were ignored, each an
    /// [`SettingsError::InvalidValue`] naming the variable.
    pub rejected: Vec<SettingsError>,
}

impl LoadedSettings {
    /// Log the settings source and every rejected override.
    pub fn report(&self) {
        if self.from_file {
            debug!(path = %self.path.display(), "settings loaded from file");
        } else {
            debug!(path = %self.path.display(), "settings file not found, using defaults");
        }
        for err in &self.rejected {
            warn!(key = err.key().unwrap_or("unknown"), error = %err, "ignoring invalid env override");
        }
    }
}

/// Resolve the settings file path: `TASKD_CONFIG` if set, else
/// `./taskd.json`.
pub fn settings_path() -> PathBuf {
    read_env_string(CONFIG_ENV).map_or_else(|| PathBuf::from("taskd.json"), PathBuf::from)
}

/// Load settings from `path` (or the default location) with env overrides.
pub fn load_settings(path: Option<&Path>) -> Result<LoadedSettings> {
    match path {
        Some(p) => load_settings_from_path(p),
        None => load_settings_from_path(&settings_path()),
    }
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LoadedSettings> {
    load_with_env(path, |name| std::env::var(name).ok())
}

fn load_with_env<F>(path: &Path, lookup: F) -> Result<LoadedSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let from_file = path.exists();
    let mut settings = load_file_layer(path)?;
    let rejected = apply_env_overrides(&mut settings, lookup);
    validate(&settings)?;
    Ok(LoadedSettings {
        settings,
        path: path.to_owned(),
        from_file,
        rejected,
    })
}

/// Defaults merged with the file at `path`, without env overrides.
fn load_file_layer(path: &Path) -> Result<TaskdSettings> {
    let parse_err = |source| SettingsError::Parse {
        path: path.to_owned(),
        source,
    };
    let defaults = serde_json::to_value(TaskdSettings::default()).map_err(parse_err)?;

    let merged = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_owned(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(parse_err)?;
        deep_merge(defaults, user)
    } else {
        defaults
    };

    serde_json::from_value(merged).map_err(parse_err)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

fn rejected(key: &'static str, value: &str, expected: &str) -> SettingsError {
    SettingsError::InvalidValue {
        key,
        reason: format!("{value:?} is not {expected}"),
    }
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Invalid values leave the file/default value in place and are returned,
/// one [`SettingsError::InvalidValue`] per variable.
pub fn apply_env_overrides<F>(settings: &mut TaskdSettings, lookup: F) -> Vec<SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let mut errors = Vec::new();

    if let Some(v) = get("TASKD_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = get("TASKD_PORT") {
        match parse_u16_range(&v, 0, u16::MAX) {
            Some(port) => settings.server.port = port,
            None => errors.push(rejected("TASKD_PORT", &v, "a port number")),
        }
    }
    if let Some(v) = get("TASKD_REQUEST_TIMEOUT_SECS") {
        match parse_u64_range(&v, 1, 3_600) {
            Some(secs) => settings.server.request_timeout_secs = secs,
            None => errors.push(rejected("TASKD_REQUEST_TIMEOUT_SECS", &v, "in 1..=3600")),
        }
    }
    if let Some(v) = get("TASKD_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = get("TASKD_POOL_SIZE") {
        match parse_u32_range(&v, 1, 256) {
            Some(size) => settings.database.pool_size = size,
            None => errors.push(rejected("TASKD_POOL_SIZE", &v, "in 1..=256")),
        }
    }
    if let Some(v) = get("TASKD_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = get("TASKD_LOG_FORMAT") {
        match v.parse::<LogFormat>() {
            Ok(format) => settings.logging.format = format,
            Err(_) => errors.push(rejected("TASKD_LOG_FORMAT", &v, "pretty or json")),
        }
    }

    errors
}

/// Reject settings that cannot produce a working service.
pub fn validate(settings: &TaskdSettings) -> Result<()> {
    if settings.database.pool_size == 0 {
        return Err(SettingsError::InvalidValue {
            key: "database.pool_size",
            reason: "must be at least 1".into(),
        });
    }
    if settings.database.path.trim().is_empty() {
        return Err(SettingsError::InvalidValue {
            key: "database.path",
            reason: "must not be empty".into(),
        });
    }
    if settings.server.request_timeout_secs == 0 {
        return Err(SettingsError::InvalidValue {
            key: "server.request_timeout_secs",
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
