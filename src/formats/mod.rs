//! On-disk test report formats
//!
//! Each format is converted into [`CanonicalResult`]s keyed by identifier.

pub mod allure;
pub mod junit;

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::common::Result;
use crate::model::CurrentRun;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Directory of Allure `*-result.json` files
    #[default]
    Allure,
    /// JUnit XML file or directory of XML files
    Junit,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Allure => f.write_str("allure"),
            ReportFormat::Junit => f.write_str("junit"),
        }
    }
}

/// Read all results at `path` in the given format
pub async fn read_results(path: &Path, format: ReportFormat) -> Result<CurrentRun> {
    let results = match format {
        ReportFormat::Allure => allure::read_results(path).await?,
        ReportFormat::Junit => {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || junit::read_results(&path))
                .await
                .map_err(|e| crate::common::Error::Internal(format!("JUnit reader failed: {}", e)))??
        }
    };
    tracing::debug!("Parsed {} {} results from {}", results.len(), format, path.display());
    Ok(results)
}

/// Value of the first label with the given name
pub(crate) fn find_label<'a, I>(labels: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    labels.into_iter().find(|(key, _)| *key == name).map(|(_, value)| value)
}
