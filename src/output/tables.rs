use std::fmt::Write;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::execution::Status;
use crate::extractor::ErrorReport;
use crate::status::StatusReport;

use super::text::{push_failed_actions, render_status_header, NO_ACTIONS};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn color_coded_status_cell(status: &Status) -> Cell {
    let text = format!("{} {}", status.indicator(), status);
    match status {
        Status::Successful => Cell::new(text).fg(TableColor::Green),
        Status::Failed => Cell::new(text).fg(TableColor::Red),
        Status::InProgress | Status::Enqueued => Cell::new(text).fg(TableColor::Yellow),
        Status::Skipped | Status::Terminated | Status::Unknown(_) => Cell::new(text),
    }
}

/// Error report as a Category / Occurrences / Action / Detail table, followed
/// by a table of the failed actions.
pub fn render_error_table(report: &ErrorReport) -> String {
    let mut table = create_table();
    table.set_header(create_cyan_header(&["Category", "Occurrences", "Action", "Detail"]));

    for summary in &report.categories {
        for finding in &summary.findings {
            table.add_row(vec![
                Cell::new(&summary.category),
                Cell::new(summary.occurrences),
                Cell::new(&finding.action),
                Cell::new(&finding.detail),
            ]);
        }
    }

    let mut failed = create_table();
    failed.set_header(create_cyan_header(&["Failed Action", "Type"]));
    for action in &report.failed_actions {
        failed.add_row(vec![
            Cell::new(&action.name).fg(TableColor::Red),
            Cell::new(&action.action_type),
        ]);
    }

    format!("{table}\n{failed}\n")
}

/// Status report as the header block, an actions table and the failed-action list.
pub fn render_status_table(report: &StatusReport) -> String {
    let mut output = render_status_header(report, false);

    if !report.has_actions() {
        let _ = writeln!(output, "{NO_ACTIONS}");
        return output;
    }

    let _ = writeln!(output, "Actions: {}/{} passed", report.passed, report.total);

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Status", "Action", "Type", "Duration"]));
    for action in &report.actions {
        table.add_row(vec![
            color_coded_status_cell(&action.status),
            Cell::new(&action.name),
            Cell::new(&action.action_type),
            Cell::new(action.duration.as_deref().unwrap_or("-")),
        ]);
    }

    let _ = writeln!(output, "{table}");

    if !report.failed_actions.is_empty() {
        output.push('\n');
        push_failed_actions(&mut output, &report.failed_actions, false);
    }

    output
}
