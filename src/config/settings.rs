//! User settings for the asset register
//!
//! Controls logging, the bound on stamping writes, audit and cascade policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::RegisterPaths;
use crate::error::RegisterError;

/// Settings persisted in `config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound for the follow-up write that stamps a derived code
    #[serde(default = "default_stamp_timeout_ms")]
    pub stamp_timeout_ms: u64,

    /// Whether mutations append audit entries
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,

    /// Delete a batch's items together with the batch
    #[serde(default)]
    pub cascade_item_deletes: bool,

    /// Rows shown by list commands when no limit is given
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_stamp_timeout_ms() -> u64 {
    2000
}

fn default_audit_enabled() -> bool {
    true
}

fn default_page_size() -> usize {
    25
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            log_level: default_log_level(),
            stamp_timeout_ms: default_stamp_timeout_ms(),
            audit_enabled: default_audit_enabled(),
            cascade_item_deletes: false,
            default_page_size: default_page_size(),
        }
    }
}

impl Settings {
    /// Stamping timeout as a `Duration`
    pub fn stamp_timeout(&self) -> Duration {
        Duration::from_millis(self.stamp_timeout_ms)
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &RegisterPaths) -> Result<Self, RegisterError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                RegisterError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                RegisterError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &RegisterPaths) -> Result<(), RegisterError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            RegisterError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents).map_err(|e| {
            RegisterError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
