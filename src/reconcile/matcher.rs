//! Suite-aware matching of reference results against the current run
//!
//! Frameworks put the same logical suite name into different hierarchy
//! slots (a JUnit package vs. an Allure parentSuite), so any non-empty
//! reference slot may match any candidate slot. Some suite agreement is
//! still required, otherwise generic names like "Login" would pair up
//! across unrelated suites.

use crate::model::{CanonicalResult, CurrentRun};

use super::normalize::normalize;

/// Find the current-run counterpart of a reference result
///
/// Candidates are visited in identifier order and the first one that
/// qualifies wins.
pub fn find_match<'a>(reference: &CanonicalResult, current: &'a CurrentRun) -> Option<&'a CanonicalResult> {
    let name = normalize(&reference.name);
    let keys = suite_keys(reference);
    if keys.is_empty() {
        return None;
    }

    current
        .values()
        .find(|candidate| normalize(&candidate.name) == name && shares_suite(&keys, candidate))
}

/// Normalized non-empty suite slots of the reference
fn suite_keys(reference: &CanonicalResult) -> Vec<String> {
    reference
        .suite_slots()
        .iter()
        .filter(|slot| !slot.is_empty())
        .map(|slot| normalize(slot))
        .collect()
}

fn shares_suite(keys: &[String], candidate: &CanonicalResult) -> bool {
    candidate
        .suite_slots()
        .iter()
        .map(|slot| normalize(slot))
        .any(|slot| keys.contains(&slot))
}
