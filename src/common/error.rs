//! Error types for test-inspector
//!
//! Messages are meant to be read in a CI log, so they name the flag or
//! config key that fixes the problem where there is one.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for test-inspector
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Unsupported report type '{0}'. Supported types: allure, junit")]
    UnsupportedFormat(String),

    // === Report Parsing Errors ===
    #[error("Failed to read results from '{path}': {error}")]
    ResultsRead { path: String, error: String },

    #[error("Failed to parse report '{path}': {message}")]
    ReportParse { path: String, message: String },

    #[error("Malformed step payload for '{test}': {message}")]
    StepPayload { test: String, message: String },

    // === Backend Errors ===
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Version with ID '{0}' was not found")]
    VersionNotFound(i64),

    #[error("Launch with that name already exists, id={0}")]
    LaunchExists(i64),

    #[error("No reference test results found for version {0}")]
    NoReferenceResults(i64),

    #[error("No features found in the reference run")]
    NoFeatures,

    #[error("Result '{0}' was not inserted")]
    NotInserted(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a results read error for a path
    pub fn results_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::ResultsRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a report parse error for a path
    pub fn report_parse(path: &std::path::Path, message: impl std::fmt::Display) -> Self {
        Self::ReportParse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a backend error from a status code and response body
    pub fn backend(status: u16, message: &str) -> Self {
        Self::Backend {
            status,
            message: message.to_string(),
        }
    }

    /// Create a config error for a missing required setting
    pub fn missing(setting: &str, flag: &str) -> Self {
        Self::Config(format!("{} is required (use {} or the config file)", setting, flag))
    }
}
