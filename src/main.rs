//! test-inspector - compare test runs against a stored reference run
//!
//! Parses Allure or JUnit results, reconciles them with the reference run
//! of a version stored in the backend, and uploads new launches.

use clap::Parser;
use test_inspector::commands::{Commands, GlobalArgs};
use test_inspector::{cli, common::logging};

#[derive(Parser)]
#[command(name = "test-inspector", about = "Compare test results against a reference run")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    match cli::dispatch(cli.global, cli.command).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
