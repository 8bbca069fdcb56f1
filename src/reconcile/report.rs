//! Findings and the aggregated reconciliation report

use std::fmt;

use super::differ::StepDivergence;

/// Which side of a comparison a step payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reference,
    Current,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reference => f.write_str("reference"),
            Side::Current => f.write_str("current"),
        }
    }
}

/// Severity class of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Counts toward the exit status
    Error,
    /// Visible, but does not fail the run
    Warning,
    /// Comparison could not be made
    Inconclusive,
}

/// One outcome reported by a reconciliation worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// No current-run result matches this reference result
    Unmatched { name: String, parent_suite: String },
    /// Matched, but the step trees differ
    StepMismatch(StepDivergence),
    /// Matched, but a step payload could not be decoded
    Inconclusive { name: String, side: Side, message: String },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Finding::Unmatched { .. } => Severity::Error,
            Finding::StepMismatch(_) => Severity::Warning,
            Finding::Inconclusive { .. } => Severity::Inconclusive,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Unmatched { name, parent_suite } => {
                write!(f, "no test result found for reference: {} - {}", name, parent_suite)
            }
            Finding::StepMismatch(divergence) => divergence.fmt(f),
            Finding::Inconclusive { name, side, message } => {
                write!(f, "could not compare steps for '{}': {} steps are malformed: {}", name, side, message)
            }
        }
    }
}

/// Result of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Reference results with no match in the current run
    pub error_count: usize,
    /// Matched results whose step trees differ
    pub warning_count: usize,
    /// Matched results whose step payloads could not be decoded
    pub inconclusive_count: usize,
    /// Findings in arrival order; only the counts are deterministic
    pub findings: Vec<Finding>,
    /// Size of the reference set
    pub reference_total: usize,
    /// Size of the current-run set
    pub current_total: usize,
}

impl Report {
    /// Start an empty report for inputs of the given sizes
    pub fn new(reference_total: usize, current_total: usize) -> Self {
        Self {
            reference_total,
            current_total,
            ..Default::default()
        }
    }

    /// Tally a finding
    pub fn record(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Inconclusive => self.inconclusive_count += 1,
        }
        self.findings.push(finding);
    }

    /// No errors and no warnings
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Process exit code: the error count, saturated so it never wraps to 0
    pub fn exit_code(&self) -> i32 {
        self.error_count.min(u8::MAX as usize) as i32
    }
}
