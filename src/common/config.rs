//! Configuration file handling
//!
//! Settings come from, in order of precedence: command-line flags (which
//! clap also fills from `TEST_INSPECTOR_*` environment variables), the TOML
//! config file, and built-in defaults. The resolved values are handed to the
//! inspect/print/upload entry points as explicit config structs.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};
use crate::formats::ReportFormat;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// User credentials for signing in
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Local report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Backend connection settings
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend project
    #[serde(default = "default_host")]
    pub host: String,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_key: None,
        }
    }
}

fn default_host() -> String {
    "https://gryakvuryfsrgjohzhbq.supabase.co".to_string()
}

/// User credentials
#[derive(Debug, Deserialize, Default)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Local report settings
#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    /// Path to the directory (or JUnit file) with results
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Report format of the results
    #[serde(default)]
    pub format: ReportFormat,

    /// Version ID in the backend
    #[serde(default)]
    pub version_id: Option<i64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            format: ReportFormat::default(),
            version_id: None,
        }
    }
}

fn default_results_path() -> PathBuf {
    PathBuf::from("./allure-results")
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub results_path: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub version_id: Option<i64>,
}

/// Signed-in user credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Resolved backend connection
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub host: String,
    pub api_key: String,
    /// Sign in as this user; otherwise the API key is used as the token
    pub credentials: Option<Credentials>,
}

/// Everything `inspect` needs
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub backend: BackendSettings,
    pub version_id: i64,
    pub results_path: PathBuf,
    pub format: ReportFormat,
}

/// Everything `print` needs
#[derive(Debug, Clone)]
pub struct PrintConfig {
    pub backend: BackendSettings,
    pub version_id: i64,
}

/// Everything `upload` needs
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub backend: BackendSettings,
    pub version_id: i64,
    pub results_path: PathBuf,
    pub format: ReportFormat,
    /// Launch name; a random one is generated when empty
    pub launch: String,
    /// Mark the launch as the new reference run
    pub is_reference: bool,
}

impl Config {
    /// Load configuration from `path`, or from the default config file
    ///
    /// An explicit path must exist. The default file is optional and
    /// defaults are returned when it is missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        tracing::debug!("Using config file: {}", path.display());
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply command-line values on top of the file values
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.backend.host = host;
        }
        if overrides.api_key.is_some() {
            self.backend.api_key = overrides.api_key;
        }
        if overrides.user.is_some() {
            self.credentials.user = overrides.user;
        }
        if overrides.password.is_some() {
            self.credentials.password = overrides.password;
        }
        if let Some(path) = overrides.results_path {
            self.report.results_path = path;
        }
        if let Some(format) = overrides.format {
            self.report.format = format;
        }
        if overrides.version_id.is_some() {
            self.report.version_id = overrides.version_id;
        }
    }

    /// Resolve settings for `inspect`
    ///
    /// Credentials are optional; without a user the API key is the token.
    pub fn inspect_config(&self) -> Result<InspectConfig> {
        let version_id = self.version_id()?;
        let credentials = match (non_empty(&self.credentials.user), non_empty(&self.credentials.password)) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.to_string(),
                password: password.to_string(),
            }),
            (Some(_), None) => return Err(Error::missing("user password", "--password")),
            _ => None,
        };

        Ok(InspectConfig {
            backend: self.backend(credentials)?,
            version_id,
            results_path: self.report.results_path.clone(),
            format: self.report.format,
        })
    }

    /// Resolve settings for `print` (anonymous access)
    pub fn print_config(&self) -> Result<PrintConfig> {
        Ok(PrintConfig {
            version_id: self.version_id()?,
            backend: self.backend(None)?,
        })
    }

    /// Resolve settings for `upload`, which always signs in
    pub fn upload_config(&self, launch: Option<String>, is_reference: bool) -> Result<UploadConfig> {
        let email = non_empty(&self.credentials.user).ok_or_else(|| Error::missing("user email", "--user"))?;
        let password =
            non_empty(&self.credentials.password).ok_or_else(|| Error::missing("user password", "--password"))?;
        let version_id = self.version_id()?;

        Ok(UploadConfig {
            backend: self.backend(Some(Credentials {
                email: email.to_string(),
                password: password.to_string(),
            }))?,
            version_id,
            results_path: self.report.results_path.clone(),
            format: self.report.format,
            launch: launch.unwrap_or_default(),
            is_reference,
        })
    }

    fn version_id(&self) -> Result<i64> {
        match self.report.version_id {
            Some(id) if id != 0 => Ok(id),
            _ => Err(Error::missing("versionID", "--version-id")),
        }
    }

    fn backend(&self, credentials: Option<Credentials>) -> Result<BackendSettings> {
        let api_key = non_empty(&self.backend.api_key).ok_or_else(|| Error::missing("API key", "--api-key"))?;
        Ok(BackendSettings {
            host: self.backend.host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            credentials,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
