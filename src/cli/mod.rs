//! CLI command handling
//!
//! Resolves configuration for each command, runs it against the backend
//! and prints the result to stdout.

mod output;

pub use output::{render_reference, render_report, render_upload};

use std::sync::Arc;

use crate::commands::{Commands, GlobalArgs};
use crate::common::config::Config;
use crate::common::Result;
use crate::reconcile;
use crate::store::{self, Store, SupabaseClient};

/// Dispatch a CLI command and return the process exit code
pub async fn dispatch(global: GlobalArgs, command: Commands) -> Result<i32> {
    let mut config = Config::load(global.config.as_deref())?;
    config.apply(global.overrides());

    match command {
        Commands::Inspect => {
            let config = config.inspect_config()?;
            let client = SupabaseClient::connect(&config.backend).await?;

            let report = reconcile::inspect(&config, &client).await?;
            print!("{}", render_report(&report, &config.results_path));
            Ok(report.exit_code())
        }

        Commands::Print => {
            let config = config.print_config()?;
            let client = SupabaseClient::connect(&config.backend).await?;

            client.get_version(config.version_id).await?;
            let reference = client.get_template(config.version_id).await?;
            let features = client.get_features().await?;
            print!("{}", render_reference(&features, &reference));
            Ok(0)
        }

        Commands::Upload { launch, is_reference } => {
            let config = config.upload_config(launch, is_reference)?;
            let client: Arc<dyn Store> = Arc::new(SupabaseClient::connect(&config.backend).await?);

            let summary = store::upload(&config, client).await?;
            print!("{}", render_upload(&summary));
            Ok(if summary.failed > 0 { 1 } else { 0 })
        }
    }
}
