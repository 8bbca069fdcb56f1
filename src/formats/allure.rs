//! Allure results directory reader
//!
//! Allure writes one `<uuid>-result.json` per test into a flat directory,
//! next to `*-container.json` and `*-attachment.*` files which are not
//! needed here.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::common::{Error, Result};
use crate::model::{encode_steps, null_as_default, CanonicalResult, CurrentRun, Status, StepNode};

use super::find_label;

/// Status given to steps that did not record one
const UNDEFINED_STATUS: &str = "undefined";

/// Kind of file found in an Allure results directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Attachment,
    Container,
    Result,
    Other,
}

impl FileKind {
    fn of(file_name: &str) -> Self {
        if file_name.contains("attachment") {
            FileKind::Attachment
        } else if file_name.contains("container") {
            FileKind::Container
        } else if file_name.contains("result") {
            FileKind::Result
        } else {
            FileKind::Other
        }
    }
}

/// A test result as written by Allure
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureResult {
    pub uuid: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub stop: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<AllureStep>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,
}

/// A (possibly nested) step as written by Allure
#[derive(Debug, Deserialize)]
pub struct AllureStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<AllureStep>,
}

#[derive(Debug, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl AllureResult {
    fn label(&self, name: &str) -> &str {
        find_label(self.labels.iter().map(|l| (l.name.as_str(), l.value.as_str())), name).unwrap_or_default()
    }

    /// Convert into a canonical result with an encoded step tree
    pub fn into_canonical(self) -> serde_json::Result<CanonicalResult> {
        let steps = encode_steps(&convert_steps(&self.steps))?;
        let status = if self.status.is_empty() {
            Status::Unknown
        } else {
            Status::from(self.status.as_str())
        };

        Ok(CanonicalResult {
            identifier: self.uuid,
            suite: self.label("suite").to_string(),
            parent_suite: self.label("parentSuite").to_string(),
            sub_suite: self.label("subSuite").to_string(),
            feature: self.label("feature").to_string(),
            full_name: self.full_name.clone().unwrap_or_default(),
            description: self.description.clone(),
            duration: self.stop - self.start,
            launch_id: 0,
            status,
            steps,
            name: self.name,
        })
    }
}

/// Number steps by position among siblings, recursively
fn convert_steps(steps: &[AllureStep]) -> Vec<StepNode> {
    steps
        .iter()
        .enumerate()
        .map(|(position, step)| StepNode {
            children: convert_steps(&step.steps),
            name: step.name.clone(),
            status: step.status.clone().unwrap_or_else(|| UNDEFINED_STATUS.to_string()),
            position: position as u32,
        })
        .collect()
}

/// Parse a single `*-result.json` file
pub async fn parse_result_file(path: &Path) -> Result<CanonicalResult> {
    let content = tokio::fs::read(path).await.map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let result: AllureResult = serde_json::from_slice(&content).map_err(|e| Error::report_parse(path, e))?;
    result.into_canonical().map_err(|e| Error::report_parse(path, e))
}

/// Read every result file in an Allure results directory
///
/// Files are parsed concurrently. A file that fails to parse is logged and
/// skipped.
pub async fn read_results(dir: &Path) -> Result<CurrentRun> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| Error::results_read(dir, e))?;

    let mut parsers = JoinSet::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::results_read(dir, e))? {
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if FileKind::of(&name) != FileKind::Result {
            tracing::trace!("Skipping {}", name);
            continue;
        }

        let path: PathBuf = entry.path();
        parsers.spawn(async move { parse_result_file(&path).await });
    }

    let mut results = CurrentRun::new();
    while let Some(joined) = parsers.join_next().await {
        match joined {
            Ok(Ok(result)) => {
                results.insert(result.identifier, result);
            }
            Ok(Err(e)) => tracing::warn!("Skipping result: {}", e),
            Err(e) => tracing::error!("Result parser failed: {}", e),
        }
    }

    Ok(results)
}
