//! CLI command definitions
//!
//! Defines the clap arguments and subcommands for test-inspector.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::common::config::Overrides;
use crate::formats::ReportFormat;

/// Settings shared by every subcommand
///
/// Each flag overrides its environment variable, which overrides the
/// config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: the user config directory)
    #[arg(long, global = true, env = "TEST_INSPECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend host
    #[arg(short = 'H', long, global = true, env = "TEST_INSPECTOR_HOST")]
    pub host: Option<String>,

    /// User email
    #[arg(short, long, global = true, env = "TEST_INSPECTOR_USER")]
    pub user: Option<String>,

    /// User password
    #[arg(short = 'w', long, global = true, env = "TEST_INSPECTOR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Backend API key
    #[arg(long, global = true, env = "TEST_INSPECTOR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to the test results (default: ./allure-results)
    #[arg(short = 'f', long, global = true, env = "TEST_INSPECTOR_RESULTS_PATH")]
    pub results_path: Option<PathBuf>,

    /// Version ID in the backend
    #[arg(short, long, global = true, env = "TEST_INSPECTOR_VERSION_ID")]
    pub version_id: Option<i64>,

    /// Report type of the results
    #[arg(short = 't', long = "type", global = true, value_enum, env = "TEST_INSPECTOR_TYPE")]
    pub format: Option<ReportFormat>,
}

impl GlobalArgs {
    /// Values to apply on top of the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            results_path: self.results_path.clone(),
            format: self.format,
            version_id: self.version_id,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compare local results with the reference run of a version
    Inspect,

    /// Print the reference run grouped by feature
    Print,

    /// Upload local results as a new launch
    Upload {
        /// Launch name (default: a random UUID)
        #[arg(short, long)]
        launch: Option<String>,

        /// Make this launch the reference run of its version
        #[arg(short = 'r', long)]
        is_reference: bool,
    },
}
