//! Concurrent reconciliation of a reference set against a current run
//!
//! One task per reference result. Tasks only read the shared inputs and
//! send typed findings over a channel; the calling task is the single
//! aggregator and owns the report.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::model::{CanonicalResult, CurrentRun};

use super::differ::diff_steps;
use super::matcher::find_match;
use super::report::{Finding, Report, Side};

/// Reconcile every reference result against the current run
///
/// Waits for all workers before returning. A worker that panics is logged
/// and contributes no finding.
pub async fn reconcile(reference: Vec<CanonicalResult>, current: CurrentRun) -> Report {
    let mut report = Report::new(reference.len(), current.len());
    let current = Arc::new(current);
    let (tx, mut rx) = mpsc::unbounded_channel::<Finding>();

    let mut workers = JoinSet::new();
    for entry in reference {
        let current = Arc::clone(&current);
        let tx = tx.clone();
        workers.spawn(async move {
            if let Some(finding) = check_entry(&entry, &current) {
                // The receiver lives until every sender is gone
                let _ = tx.send(finding);
            }
        });
    }
    drop(tx);

    while let Some(finding) = rx.recv().await {
        tracing::debug!(?finding, "Finding received");
        report.record(finding);
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Reconciliation worker failed: {}", e);
        }
    }

    tracing::info!(
        errors = report.error_count,
        warnings = report.warning_count,
        inconclusive = report.inconclusive_count,
        "Reconciliation complete"
    );
    report
}

/// Match one reference result and compare steps when both sides passed
pub fn check_entry(reference: &CanonicalResult, current: &CurrentRun) -> Option<Finding> {
    let Some(matched) = find_match(reference, current) else {
        return Some(Finding::Unmatched {
            name: reference.name.clone(),
            parent_suite: reference.parent_suite.clone(),
        });
    };

    if !(reference.status.is_passed() && matched.status.is_passed()) {
        return None;
    }
    if !reference.has_steps() || !matched.has_steps() || reference.steps == matched.steps {
        return None;
    }

    let reference_steps = match reference.step_tree() {
        Ok(steps) => steps,
        Err(e) => return Some(inconclusive(reference, Side::Reference, e)),
    };
    let current_steps = match matched.step_tree() {
        Ok(steps) => steps,
        Err(e) => return Some(inconclusive(reference, Side::Current, e)),
    };

    diff_steps(&reference_steps, &current_steps, &reference.name, &reference.name).map(Finding::StepMismatch)
}

fn inconclusive(reference: &CanonicalResult, side: Side, error: serde_json::Error) -> Finding {
    tracing::warn!("Skipping step comparison for '{}': malformed {} steps: {}", reference.name, side, error);
    Finding::Inconclusive {
        name: reference.name.clone(),
        side,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{encode_steps, Status, StepNode};
    use crate::reconcile::differ::StepDivergence;

    fn passed(name: &str, suite: &str, steps: &[StepNode]) -> CanonicalResult {
        let mut r = CanonicalResult::new(name, Status::Passed);
        r.suite = suite.to_string();
        r.steps = encode_steps(steps).unwrap();
        r
    }

    fn run(results: Vec<CanonicalResult>) -> CurrentRun {
        results.into_iter().map(|r| (r.identifier, r)).collect()
    }

    #[tokio::test]
    async fn test_bracketed_step_names_match() {
        let reference = vec![
            passed("Signup Test", "Auth", &[StepNode::leaf("Fill {user}", "passed", 0)]),
            passed("Login", "Auth", &[]),
        ];
        let current = run(vec![passed("Signup", "auth", &[StepNode::leaf("Fill {other}", "passed", 0)])]);

        let report = reconcile(reference, current).await;
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 0);
        assert_eq!(report.reference_total, 2);
        assert_eq!(report.current_total, 1);
        assert_eq!(
            report.findings,
            vec![Finding::Unmatched {
                name: "Login".to_string(),
                parent_suite: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_extra_step_is_a_warning() {
        let reference = vec![
            passed("Signup Test", "Auth", &[StepNode::leaf("Fill {user}", "passed", 0)]),
            passed("Login", "Auth", &[]),
        ];
        let current = run(vec![passed(
            "Signup",
            "auth",
            &[StepNode::leaf("Fill {other}", "passed", 0), StepNode::leaf("Submit", "passed", 1)],
        )]);

        let report = reconcile(reference, current).await;
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        let warning = report
            .findings
            .iter()
            .find_map(|f| match f {
                Finding::StepMismatch(d) => Some(d.clone()),
                _ => None,
            })
            .unwrap();
        assert!(matches!(warning, StepDivergence::CountMismatch { reference_len: 1, current_len: 2, .. }));
        assert_eq!(warning.test(), "Signup Test");
    }

    #[tokio::test]
    async fn test_failed_results_skip_step_comparison() {
        let mut reference = passed("Login", "Auth", &[StepNode::leaf("A", "passed", 0)]);
        reference.status = Status::Failed;
        let current = run(vec![passed("Login", "Auth", &[StepNode::leaf("B", "passed", 0)])]);

        let report = reconcile(vec![reference], current).await;
        assert!(report.is_clean());
        assert!(report.findings.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_inconclusive() {
        let reference = passed("Login", "Auth", &[StepNode::leaf("A", "passed", 0)]);
        let mut current = passed("Login", "Auth", &[]);
        current.steps = "Running login...\nOK".to_string();

        let report = reconcile(vec![reference], run(vec![current])).await;
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 0);
        assert_eq!(report.inconclusive_count, 1);
        assert!(matches!(
            report.findings[0],
            Finding::Inconclusive { side: Side::Current, .. }
        ));
    }

    #[tokio::test]
    async fn test_equal_payloads_are_not_decoded() {
        // identical raw payloads short-circuit, even if they are not JSON
        let mut reference = passed("Login", "Auth", &[]);
        reference.steps = "not json".to_string();
        let mut current = passed("Login", "Auth", &[]);
        current.steps = "not json".to_string();

        let report = reconcile(vec![reference], run(vec![current])).await;
        assert_eq!(report, Report::new(1, 1));
    }

    #[tokio::test]
    async fn test_counts_are_deterministic_under_fan_out() {
        let mut reference = Vec::new();
        let mut current = Vec::new();
        for i in 0..200 {
            reference.push(passed(&format!("case {}", i), "Suite", &[StepNode::leaf("A {y}", "passed", 0)]));
            if i % 4 != 0 {
                let steps = if i % 5 == 0 {
                    vec![StepNode::leaf("B", "passed", 0)]
                } else {
                    vec![StepNode::leaf("A {x}", "passed", 0)]
                };
                current.push(passed(&format!("Case_{}", i), "suite", &steps));
            }
        }

        let report = reconcile(reference, run(current)).await;
        assert_eq!(report.error_count, 50);
        // i % 5 == 0 and i % 4 != 0 over 0..200
        assert_eq!(report.warning_count, 30);
        assert_eq!(report.findings.len(), 80);
    }
}
