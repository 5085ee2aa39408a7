use std::fmt::Write;

use crate::extractor::{ErrorReport, FailedAction};
use crate::status::StatusReport;

use super::styling::{heading, indicator};

pub const NO_EXECUTION_DATA: &str = "No execution data found.";
pub const NO_EXECUTIONS: &str = "No executions found.";
pub const NO_FAILED_ACTIONS: &str = "No failed actions found.";
pub const NO_ACTIONS: &str = "No actions in this execution.";

/// Renders the categorized error summary.
///
/// Categories come out alphabetically with their pre-deduplication count,
/// followed by every failed action so nothing goes unaccounted for.
pub fn render_error_report(report: &ErrorReport, colored: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{}", heading("ERROR SUMMARY", colored));
    let _ = writeln!(output, "{}", "=".repeat(40));

    for summary in &report.categories {
        let plural = if summary.occurrences > 1 { "s" } else { "" };
        let _ = writeln!(
            output,
            "\n{} ({} occurrence{plural}):",
            summary.category, summary.occurrences
        );
        for finding in &summary.findings {
            let _ = writeln!(output, "  [{}] {}", finding.action, finding.detail);
        }
    }

    output.push('\n');
    push_failed_actions(&mut output, &report.failed_actions, colored);
    output
}

/// Renders the execution header block.
pub fn render_status_header(report: &StatusReport, colored: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{}", heading(&format!("Execution #{}", report.id), colored));
    let _ = writeln!(
        output,
        "  Status:   {} {}",
        indicator(&report.status, colored),
        report.status
    );
    let _ = writeln!(output, "  Branch:   {}", report.branch);
    let _ = writeln!(output, "  Revision: {}", report.revision);
    let _ = writeln!(output, "  Creator:  {}", report.creator);
    let _ = writeln!(output, "  Duration: {}", report.duration);
    output.push('\n');

    output
}

/// Renders the full status report, including the per-action breakdown.
pub fn render_status_report(report: &StatusReport, colored: bool) -> String {
    let mut output = render_status_header(report, colored);

    if !report.has_actions() {
        let _ = writeln!(output, "{NO_ACTIONS}");
        return output;
    }

    let _ = writeln!(output, "Actions: {}/{} passed", report.passed, report.total);
    output.push('\n');

    for action in &report.actions {
        let _ = write!(
            output,
            "  {} {}",
            indicator(&action.status, colored),
            action.name
        );
        if let Some(duration) = &action.duration {
            let _ = write!(output, " ({duration})");
        }
        output.push('\n');
    }

    if !report.failed_actions.is_empty() {
        output.push('\n');
        push_failed_actions(&mut output, &report.failed_actions, colored);
    }

    output
}

pub(super) fn push_failed_actions(output: &mut String, failed: &[FailedAction], colored: bool) {
    let _ = writeln!(output, "{}", heading("FAILED ACTIONS:", colored));
    for action in failed {
        let _ = writeln!(output, "  - {} ({})", action.name, action.action_type);
    }
}
