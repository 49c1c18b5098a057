//! Configuration module for the asset register
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - Settings persistence

pub mod paths;
pub mod settings;

pub use paths::RegisterPaths;
pub use settings::Settings;
