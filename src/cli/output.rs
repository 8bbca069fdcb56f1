//! Human-readable rendering of command results

use colored::Colorize;
use std::fmt::Write;
use std::path::Path;

use crate::model::{CanonicalResult, StepNode};
use crate::reconcile::{Finding, Report, Severity};
use crate::store::UploadSummary;

/// Render the reconciliation report
pub fn render_report(report: &Report, results_path: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Test Results comparison report:".blue());
    let _ = writeln!(
        out,
        "\n{} test results found in local run ({})",
        report.current_total.to_string().blue(),
        results_path.display()
    );
    let _ = writeln!(
        out,
        "{} test results found in reference run",
        report.reference_total.to_string().green()
    );

    if report.current_total < report.reference_total {
        let _ = writeln!(
            out,
            "\n{}: number of test results in local run ({}) is less than number of test results in reference run ({})",
            "WARNING".yellow(),
            report.current_total,
            report.reference_total
        );
    } else if report.current_total > report.reference_total {
        let _ = writeln!(
            out,
            "\n{}: number of test results in local run ({}) differs from number of test results in reference run ({})",
            "WARNING".yellow(),
            report.current_total,
            report.reference_total
        );
    }
    out.push('\n');

    for finding in &report.findings {
        let _ = writeln!(out, "{}: {}", tag(finding), finding);
    }

    let _ = write!(
        out,
        "\n{} and {} found",
        format!("{} errors", report.error_count).red(),
        format!("{} warnings", report.warning_count).yellow()
    );
    if report.inconclusive_count > 0 {
        let _ = write!(out, " ({} comparisons skipped)", report.inconclusive_count);
    }
    out.push('\n');

    if report.is_clean() {
        let _ = writeln!(out, "{}", "All checks passed!".green());
    }
    out
}

fn tag(finding: &Finding) -> colored::ColoredString {
    match finding.severity() {
        Severity::Error => "[ERROR]".red(),
        Severity::Warning => "[WARN]".yellow(),
        Severity::Inconclusive => "[SKIP]".dimmed(),
    }
}

/// Render the reference run grouped by feature
///
/// Results whose step payload does not decode are listed without steps.
pub fn render_reference(features: &[String], reference: &[CanonicalResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n", "Reference Test Results:".blue());
    let _ = writeln!(
        out,
        "{} test results found in reference run\n\n",
        reference.len().to_string().green()
    );

    for feature in features {
        let _ = writeln!(out, "{}\n", feature.blue());
        for (number, result) in reference.iter().filter(|r| r.belongs_to(feature)).enumerate() {
            let _ = writeln!(out, "\t{}. {}", number + 1, result.name.green());
            if let Ok(steps) = result.step_tree() {
                render_steps(&mut out, &steps, 2);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn render_steps(out: &mut String, steps: &[StepNode], depth: usize) {
    let indent = "\t".repeat(depth);
    for step in steps {
        let _ = writeln!(out, "{}{}. {}", indent, step.position + 1, step.name.yellow());
        render_steps(out, &step.children, depth + 1);
    }
}

/// Render the outcome of an upload
pub fn render_upload(summary: &UploadSummary) -> String {
    let mut out = format!(
        "Launch {}: {} uploaded, {} already present",
        summary.launch_id,
        summary.inserted.to_string().green(),
        summary.skipped
    );
    if summary.failed > 0 {
        let _ = write!(out, ", {}", format!("{} failed", summary.failed).red());
    }
    out.push('\n');
    out
}
