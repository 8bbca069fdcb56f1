//! Reconciliation of a local run against the stored reference run
//!
//! Every reference result is paired with its counterpart in the current run
//! (by normalized name plus some shared suite label), and passed pairs get
//! their step trees compared structurally.

mod differ;
mod engine;
mod matcher;
mod normalize;
mod report;

pub use differ::{diff_steps, StepDivergence};
pub use engine::{check_entry, reconcile};
pub use matcher::find_match;
pub use normalize::{normalize, strip_bracketed};
pub use report::{Finding, Report, Severity, Side};

use crate::common::config::InspectConfig;
use crate::common::{Error, Result};
use crate::formats;
use crate::store::Store;

/// Fetch the reference run, parse the local run and reconcile them
pub async fn inspect(config: &InspectConfig, store: &dyn Store) -> Result<Report> {
    store.get_version(config.version_id).await?;

    let current = formats::read_results(&config.results_path, config.format).await?;
    tracing::info!(
        "{} test results found in local run ({})",
        current.len(),
        config.results_path.display()
    );

    let reference = store.get_template(config.version_id).await?;
    if reference.is_empty() {
        return Err(Error::NoReferenceResults(config.version_id));
    }

    Ok(reconcile(reference, current).await)
}
