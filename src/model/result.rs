//! Canonical test result
//!
//! The serialized form is the backend's `results` row, so the same type is
//! used for parsed local results and for reference results fetched back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::null_as_default;
use super::step::{decode_steps, StepNode};

/// Current-run results keyed by identifier
///
/// Ordered by identifier so that matching iterates deterministically.
pub type CurrentRun = BTreeMap<Uuid, CanonicalResult>;

/// Outcome of a test or step
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Passed,
    Failed,
    Broken,
    Skipped,
    #[default]
    Unknown,
    /// Any other value a source reported, kept verbatim
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Broken => "broken",
            Status::Skipped => "skipped",
            Status::Unknown => "unknown",
            Status::Other(s) => s,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Status::Passed)
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "passed" => Status::Passed,
            "failed" => Status::Failed,
            "broken" => Status::Broken,
            "skipped" => Status::Skipped,
            "unknown" => Status::Unknown,
            _ => Status::Other(s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Status::from(s.to_string())
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        match s {
            Status::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executed test case, independent of the report format it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    /// Unique per test execution
    #[serde(rename = "id")]
    pub identifier: Uuid,
    pub name: String,
    #[serde(rename = "fullname", default)]
    pub full_name: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub parent_suite: String,
    #[serde(default)]
    pub sub_suite: String,
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Launch this result belongs to; 0 until uploaded
    #[serde(default)]
    pub launch_id: i64,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: i64,
    /// Raw step payload (JSON); empty when no steps were captured
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: String,
}

impl CanonicalResult {
    /// Create a result with only a name and status set
    pub fn new(name: impl Into<String>, status: Status) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            name: name.into(),
            full_name: String::new(),
            suite: String::new(),
            parent_suite: String::new(),
            sub_suite: String::new(),
            feature: String::new(),
            status,
            description: None,
            launch_id: 0,
            duration: 0,
            steps: String::new(),
        }
    }

    /// Whether a step payload was recorded
    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Decode the raw step payload; an empty payload is an empty tree
    pub fn step_tree(&self) -> serde_json::Result<Vec<StepNode>> {
        if self.steps.is_empty() {
            return Ok(Vec::new());
        }
        decode_steps(&self.steps)
    }

    /// The three suite slots, in `suite`, `parent_suite`, `sub_suite` order
    pub fn suite_slots(&self) -> [&str; 3] {
        [&self.suite, &self.parent_suite, &self.sub_suite]
    }

    /// Whether `label` is this result's feature or any of its suites
    pub fn belongs_to(&self, label: &str) -> bool {
        self.feature == label || self.suite_slots().contains(&label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrips_unknown_values() {
        let status: Status = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, Status::Other("error".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"error\"");
        assert!(Status::from("passed").is_passed());
    }

    #[test]
    fn test_deserialize_backend_row() {
        let row = r#"{
            "id": "7f1e3a52-5b0c-4a55-8a3e-4d1c2d3e4f50",
            "name": "Signup Test",
            "fullname": "auth.SignupTest",
            "suite": "Auth",
            "parent_suite": "",
            "sub_suite": "",
            "feature": "Accounts",
            "status": "passed",
            "launch_id": 12,
            "duration": 340,
            "steps": null,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let result: CanonicalResult = serde_json::from_str(row).unwrap();
        assert_eq!(result.name, "Signup Test");
        assert_eq!(result.status, Status::Passed);
        assert_eq!(result.launch_id, 12);
        assert!(!result.has_steps());
        assert!(result.step_tree().unwrap().is_empty());
    }

    #[test]
    fn test_serialize_uses_backend_columns() {
        let mut result = CanonicalResult::new("Login", Status::Failed);
        result.parent_suite = "web".to_string();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["parent_suite"], "web");
        assert_eq!(value["status"], "failed");
        assert!(value.get("id").is_some());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_belongs_to_any_slot() {
        let mut result = CanonicalResult::new("Login", Status::Passed);
        result.sub_suite = "Auth".to_string();
        assert!(result.belongs_to("Auth"));
        assert!(!result.belongs_to("auth"));
    }
}
