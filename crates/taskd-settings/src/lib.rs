//! # taskd-settings
//!
//! Configuration for the taskd service.
//!
//! Sources, lowest to highest priority: compiled defaults, an optional JSON
//! file, then `TASKD_*` environment variables. Command-line flags are
//! applied by the binary on top of the result.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, LoadedSettings};
pub use types::{DatabaseSettings, LogFormat, LoggingSettings, ServerSettings, TaskdSettings};
