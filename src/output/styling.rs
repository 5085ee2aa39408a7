use console::style;

use crate::execution::Status;

/// Styling helpers for terminal output
pub fn bright_yellow(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn bright_green(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn bright_red(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright()
}

/// Indicator glyph for a status, coloured when `colored` is set.
pub fn indicator(status: &Status, colored: bool) -> String {
    let glyph = status.indicator();
    if !colored {
        return glyph.to_string();
    }
    match status {
        Status::Successful => bright_green(glyph).to_string(),
        Status::Failed => bright_red(glyph).to_string(),
        Status::InProgress | Status::Enqueued => bright_yellow(glyph).to_string(),
        Status::Skipped | Status::Terminated | Status::Unknown(_) => dim(glyph).to_string(),
    }
}

/// Section heading such as `ERROR SUMMARY` or `FAILED ACTIONS:`.
pub fn heading(text: &str, colored: bool) -> String {
    if colored {
        bright(text).bold().to_string()
    } else {
        text.to_string()
    }
}

/// Diagnostic line for stderr.
pub fn error_line(message: impl std::fmt::Display) -> console::StyledObject<String> {
    style(format!("ERROR: {message}")).red().for_stderr()
}
