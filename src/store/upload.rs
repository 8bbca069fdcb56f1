//! Upload of a local run as a new launch

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::common::config::UploadConfig;
use crate::common::Result;
use crate::formats;
use crate::model::CurrentRun;

use super::{Insertion, Launch, Store};

/// Counts of an upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub launch_id: i64,
    pub inserted: usize,
    /// Results that were already stored for this launch
    pub skipped: usize,
    pub failed: usize,
}

/// Create the launch and upload every local result into it
pub async fn upload(config: &UploadConfig, store: Arc<dyn Store>) -> Result<UploadSummary> {
    let version_id = store.get_version(config.version_id).await?;

    let results = formats::read_results(&config.results_path, config.format).await?;
    tracing::info!(
        "{} test results found in local run ({})",
        results.len(),
        config.results_path.display()
    );

    let launch_id = store
        .create_launch(Launch {
            name: config.launch.clone(),
            is_template: config.is_reference,
            version_id,
            ..Default::default()
        })
        .await?;
    tracing::info!("Created launch {} (reference: {})", launch_id, config.is_reference);

    Ok(upload_results(store, launch_id, results).await)
}

/// Write results into an existing launch, one task per result
///
/// A failed write is logged and counted; the remaining results are still
/// written.
pub async fn upload_results(store: Arc<dyn Store>, launch_id: i64, results: CurrentRun) -> UploadSummary {
    let mut summary = UploadSummary {
        launch_id,
        ..Default::default()
    };

    let mut tasks = JoinSet::new();
    for (_, mut result) in results {
        result.launch_id = launch_id;
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            let outcome = store.create_result(&result).await;
            (result.name, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(Insertion::Inserted(id)))) => {
                tracing::debug!("Inserted result {}", id);
                summary.inserted += 1;
            }
            Ok((_, Ok(Insertion::AlreadyExists(_)))) => summary.skipped += 1,
            Ok((name, Err(e))) => {
                tracing::error!("Failed to upload '{}': {}", name, e);
                summary.failed += 1;
            }
            Err(e) => {
                tracing::error!("Upload task failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        failed = summary.failed,
        "Upload complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::model::{CanonicalResult, Status};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records writes; rejects results named "reject" and reports "dup" as stored
    #[derive(Default)]
    struct RecordingStore {
        written: Mutex<Vec<CanonicalResult>>,
    }

    #[async_trait]
    impl Store for RecordingStore {
        async fn get_version(&self, id: i64) -> Result<i64> {
            Ok(id)
        }

        async fn create_launch(&self, _launch: Launch) -> Result<i64> {
            Ok(11)
        }

        async fn create_result(&self, result: &CanonicalResult) -> Result<Insertion> {
            match result.name.as_str() {
                "reject" => Err(Error::backend(409, "conflict")),
                "dup" => Ok(Insertion::AlreadyExists(Uuid::new_v4())),
                _ => {
                    self.written.lock().unwrap().push(result.clone());
                    Ok(Insertion::Inserted(result.identifier))
                }
            }
        }

        async fn get_template(&self, version_id: i64) -> Result<Vec<CanonicalResult>> {
            Err(Error::NoReferenceResults(version_id))
        }

        async fn get_features(&self) -> Result<Vec<String>> {
            Err(Error::NoFeatures)
        }
    }

    fn run(names: &[&str]) -> CurrentRun {
        names
            .iter()
            .map(|name| {
                let result = CanonicalResult::new(*name, Status::Passed);
                (result.identifier, result)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_upload_results_counts_outcomes() {
        let store = Arc::new(RecordingStore::default());
        let summary = upload_results(store.clone(), 5, run(&["a", "b", "dup", "reject"])).await;

        assert_eq!(
            summary,
            UploadSummary {
                launch_id: 5,
                inserted: 2,
                skipped: 1,
                failed: 1,
            }
        );
        let written = store.written.lock().unwrap();
        assert!(written.iter().all(|r| r.launch_id == 5));
    }

    #[tokio::test]
    async fn test_upload_reads_local_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("1-result.json"),
            r#"{"uuid":"8c2f7d56-0d0e-4c7c-9a55-3b1f6f0e2a11","name":"login","status":"passed","labels":[{"name":"suite","value":"Auth"}]}"#,
        )
        .unwrap();

        let config = UploadConfig {
            backend: crate::common::config::BackendSettings {
                host: "http://localhost".to_string(),
                api_key: "anon".to_string(),
                credentials: None,
            },
            version_id: 3,
            results_path: dir.path().to_path_buf(),
            format: formats::ReportFormat::Allure,
            launch: "nightly".to_string(),
            is_reference: true,
        };

        let store = Arc::new(RecordingStore::default());
        let summary = upload(&config, store.clone()).await.unwrap();
        assert_eq!(summary.launch_id, 11);
        assert_eq!(summary.inserted, 1);
        assert_eq!(store.written.lock().unwrap()[0].suite, "Auth");
    }
}
