//! Path management for the asset register
//!
//! ## Path Resolution Order
//!
//! 1. `ASSET_REGISTER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/asset-register` on Linux, `%APPDATA%\asset-register` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::RegisterError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "ASSET_REGISTER_DATA_DIR";

/// Manages all paths used by the asset register
#[derive(Debug, Clone)]
pub struct RegisterPaths {
    /// Base directory for all register data
    base_dir: PathBuf,
}

impl RegisterPaths {
    /// Create a new RegisterPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, RegisterError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create RegisterPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory holding one JSON file per resource
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the persisted login session
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    /// Get the path to the queue of stamping writes awaiting retry
    pub fn pending_stamps_file(&self) -> PathBuf {
        self.base_dir.join("pending-stamps.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), RegisterError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| RegisterError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| RegisterError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the register has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, RegisterError> {
    ProjectDirs::from("", "", "asset-register")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| RegisterError::Config("Could not determine a config directory".into()))
}
