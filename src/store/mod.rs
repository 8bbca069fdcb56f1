//! Remote storage of launches, results and reference runs
//!
//! [`Store`] is the seam between the commands and the backend, so the
//! inspect and upload flows can run against any implementation.

mod auth;
mod supabase;
mod tables;
mod upload;

pub use auth::{AuthenticatedDetails, User};
pub use supabase::SupabaseClient;
pub use tables::{LaunchColumn, ResultColumn, Table, VersionColumn};
pub use upload::{upload, upload_results, UploadSummary};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Result;
use crate::model::CanonicalResult;

/// A single uploaded run of a version's test suite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Whether this launch is the reference run for its version
    pub is_template: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    pub name: String,
    pub version_id: i64,
}

/// Outcome of an idempotent result write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new row was written
    Inserted(Uuid),
    /// A row with the same name, suites, feature and launch already exists
    AlreadyExists(Uuid),
}

/// Backend operations used by the commands
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that a version exists; returns its id
    async fn get_version(&self, id: i64) -> Result<i64>;

    /// Create a launch and return its id
    ///
    /// A reference launch replaces the previous reference.
    async fn create_launch(&self, launch: Launch) -> Result<i64>;

    /// Write a result unless one with the same natural key exists
    async fn create_result(&self, result: &CanonicalResult) -> Result<Insertion>;

    /// Reference results for the given version
    async fn get_template(&self, version_id: i64) -> Result<Vec<CanonicalResult>>;

    /// All features of the latest reference run
    async fn get_features(&self) -> Result<Vec<String>>;
}
