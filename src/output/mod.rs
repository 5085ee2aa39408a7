mod exports;
mod styling;
mod tables;
mod text;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::extractor::ErrorReport;
use crate::status::StatusReport;

pub use styling::error_line;
pub use text::{NO_EXECUTIONS, NO_EXECUTION_DATA, NO_FAILED_ACTIONS};

/// Renders an error report in the requested format.
pub fn render_error_report(
    report: &ErrorReport,
    format: OutputFormat,
    pretty: bool,
    colored: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_error_report(report, colored)),
        OutputFormat::Table => Ok(tables::render_error_table(report)),
        OutputFormat::Json => exports::export_json(report, pretty),
        OutputFormat::Yaml => exports::export_yaml(report),
    }
}

/// Renders a status report in the requested format.
pub fn render_status_report(
    report: &StatusReport,
    format: OutputFormat,
    pretty: bool,
    colored: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_status_report(report, colored)),
        OutputFormat::Table => Ok(tables::render_status_table(report)),
        OutputFormat::Json => exports::export_json(report, pretty),
        OutputFormat::Yaml => exports::export_yaml(report),
    }
}
