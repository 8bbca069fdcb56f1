//! Configuration file locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/test-inspector/`
//! - macOS: `~/Library/Application Support/test-inspector/`
//! - Windows: `%APPDATA%\test-inspector\`

use std::path::PathBuf;

const APP_NAME: &str = "test-inspector";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the default configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
