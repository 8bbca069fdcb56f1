//! test-inspector - compare test runs against a stored reference run
//!
//! This library parses test reports into a canonical model, reconciles a
//! local run against the reference run stored in the backend, and uploads
//! runs as new launches.

pub mod cli;
pub mod commands;
pub mod common;
pub mod formats;
pub mod model;
pub mod reconcile;
pub mod store;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use model::{CanonicalResult, CurrentRun, Status, StepNode};
pub use reconcile::{Finding, Report};
