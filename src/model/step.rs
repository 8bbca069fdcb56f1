//! Recorded step trees
//!
//! Steps are stored as a JSON string on each result:
//! ```text
//! [{"steps":[...],"name":"Open {url=a}","status":"passed","position":0}]
//! ```
//! Field order matches what the backend already holds, so payloads written by
//! this crate compare byte-equal with existing ones for identical trees.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// One recorded execution step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepNode {
    /// Nested steps, in execution order
    #[serde(
        rename = "steps",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<StepNode>,
    /// Step label; may carry a `{...}` runtime parameter suffix
    pub name: String,
    /// Outcome of the step
    #[serde(default)]
    pub status: String,
    /// Zero-based position among siblings
    #[serde(default)]
    pub position: u32,
}

impl StepNode {
    /// Create a leaf step
    pub fn leaf(name: impl Into<String>, status: impl Into<String>, position: u32) -> Self {
        Self {
            children: Vec::new(),
            name: name.into(),
            status: status.into(),
            position,
        }
    }

    /// Attach children, builder style
    pub fn with_children(mut self, children: Vec<StepNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether this step has nested steps
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Decode a raw step payload
pub fn decode_steps(raw: &str) -> serde_json::Result<Vec<StepNode>> {
    serde_json::from_str(raw)
}

/// Encode a step tree as a raw payload; an empty tree encodes as ""
pub fn encode_steps(steps: &[StepNode]) -> serde_json::Result<String> {
    if steps.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(steps)
}
