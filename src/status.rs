use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::execution::{ActionExecution, Execution, Status};
use crate::extractor::FailedAction;

const REVISION_PREFIX_CHARS: usize = 8;
const PLACEHOLDER: &str = "-";

const OFFSET_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp. A trailing `Z` is UTC, offsets may be
/// written `+00:00` or `+0000`, and timestamps without an offset (including
/// bare dates, read as midnight) are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = OFFSET_LAYOUTS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Whole seconds between two timestamps, or `None` if either is unusable.
pub fn duration_seconds(start: Option<&str>, end: Option<&str>) -> Option<i64> {
    let start = parse_timestamp(start?)?;
    let end = parse_timestamp(end?)?;
    Some((end - start).num_seconds())
}

/// Renders seconds as `45s` or `3m 20s`. Hours are folded into minutes.
pub fn format_seconds(total_seconds: i64) -> String {
    if total_seconds < 60 {
        return format!("{total_seconds}s");
    }
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

/// Duration between two timestamps, `-` when unavailable.
pub fn format_duration(start: Option<&str>, end: Option<&str>) -> String {
    duration_seconds(start, end).map_or_else(|| PLACEHOLDER.to_string(), format_seconds)
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionLine {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub status: Status,
    pub indicator: &'static str,
    /// `None` when the action has no usable timestamps.
    pub duration: Option<String>,
}

impl From<&ActionExecution> for ActionLine {
    fn from(action: &ActionExecution) -> Self {
        let duration = duration_seconds(action.start_date.as_deref(), action.finish_date.as_deref())
            .map(format_seconds);

        Self {
            name: action.name().to_string(),
            action_type: action.action_type().to_string(),
            status: action.status.clone(),
            indicator: action.status.indicator(),
            duration,
        }
    }
}

/// Status overview of a single execution.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub id: String,
    pub status: Status,
    pub indicator: &'static str,
    pub branch: String,
    pub revision: String,
    pub creator: String,
    pub duration: String,
    pub passed: usize,
    pub total: usize,
    pub actions: Vec<ActionLine>,
    pub failed_actions: Vec<FailedAction>,
}

impl StatusReport {
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

pub fn build_status_report(execution: &Execution) -> StatusReport {
    let actions: Vec<ActionLine> = execution
        .action_executions
        .iter()
        .map(ActionLine::from)
        .collect();

    let passed = execution
        .action_executions
        .iter()
        .filter(|action| action.status.is_successful())
        .count();

    let revision = execution
        .to_revision
        .revision
        .as_deref()
        .unwrap_or(PLACEHOLDER)
        .chars()
        .take(REVISION_PREFIX_CHARS)
        .collect();

    StatusReport {
        id: execution.id.clone().unwrap_or_else(|| "Unknown".to_string()),
        status: execution.status.clone(),
        indicator: execution.status.indicator(),
        branch: text_or_placeholder(execution.branch.name.as_deref()),
        revision,
        creator: text_or_placeholder(execution.creator.name.as_deref()),
        duration: format_duration(
            execution.start_date.as_deref(),
            execution.finish_date.as_deref(),
        ),
        passed,
        total: actions.len(),
        actions,
        failed_actions: execution.failed_actions().map(FailedAction::from).collect(),
    }
}

fn text_or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionDocument;

    #[test]
    fn test_format_duration_under_a_minute() {
        assert_eq!(
            format_duration(Some("2024-01-15T10:00:00Z"), Some("2024-01-15T10:00:45Z")),
            "45s"
        );
    }

    #[test]
    fn test_format_duration_exactly_a_minute() {
        assert_eq!(
            format_duration(Some("2024-01-15T10:00:00Z"), Some("2024-01-15T10:01:00Z")),
            "1m 0s"
        );
    }

    #[test]
    fn test_format_duration_over_an_hour_stays_in_minutes() {
        assert_eq!(
            format_duration(Some("2024-01-15T10:00:00Z"), Some("2024-01-15T11:02:03Z")),
            "62m 3s"
        );
    }

    #[test]
    fn test_format_duration_missing_or_invalid() {
        assert_eq!(format_duration(None, Some("2024-01-15T10:00:00Z")), "-");
        assert_eq!(format_duration(Some("2024-01-15T10:00:00Z"), None), "-");
        assert_eq!(format_duration(Some("yesterday"), Some("2024-01-15T10:00:00Z")), "-");
        assert_eq!(format_duration(Some(""), Some("")), "-");
    }

    #[test]
    fn test_format_duration_handles_offsets_and_fractions() {
        assert_eq!(
            format_duration(Some("2024-01-15T12:00:00+02:00"), Some("2024-01-15T10:00:30.750Z")),
            "30s"
        );
        assert_eq!(
            format_duration(Some("2024-01-15T10:00:00"), Some("2024-01-15T10:00:05Z")),
            "5s"
        );
    }

    #[test]
    fn test_format_duration_accepts_other_iso_layouts() {
        assert_eq!(
            format_duration(Some("2024-01-15T10:00Z"), Some("2024-01-15T10:01Z")),
            "1m 0s"
        );
        assert_eq!(
            format_duration(Some("2024-01-15T10:00:00+0000"), Some("2024-01-15T10:00:30+0000")),
            "30s"
        );
        assert_eq!(
            format_duration(Some("2024-01-15 10:00:00+02:00"), Some("2024-01-15T08:00:10Z")),
            "10s"
        );
        assert_eq!(
            format_duration(Some("2024-01-15T10:00"), Some("2024-01-15T10:00:20")),
            "20s"
        );
        assert_eq!(format_duration(Some("2024-01-15"), Some("2024-01-16")), "1440m 0s");
    }

    #[test]
    fn test_negative_duration_truncates_toward_zero() {
        assert_eq!(
            format_duration(Some("2024-01-15T10:00:10Z"), Some("2024-01-15T10:00:00.500Z")),
            "-9s"
        );
    }

    #[test]
    fn test_build_status_report() {
        let execution = ExecutionDocument::parse(
            r#"{
                "id": 17,
                "status": "FAILED",
                "branch": {"name": "main"},
                "to_revision": {"revision": "abcdef0123456789"},
                "creator": {"name": "Jane"},
                "start_date": "2024-01-15T10:00:00Z",
                "finish_date": "2024-01-15T10:03:20Z",
                "action_executions": [
                    {"action": {"name": "build", "type": "BUILD"}, "status": "SUCCESSFUL",
                     "start_date": "2024-01-15T10:00:00Z", "finish_date": "2024-01-15T10:00:30Z"},
                    {"action": {"name": "test", "type": "TEST"}, "status": "FAILED"}
                ]
            }"#,
        )
        .unwrap()
        .into_first()
        .unwrap();

        let report = build_status_report(&execution);

        assert_eq!(report.id, "17");
        assert_eq!(report.indicator, "✗");
        assert_eq!(report.revision, "abcdef01");
        assert_eq!(report.duration, "3m 20s");
        assert_eq!(report.passed, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.actions[0].duration.as_deref(), Some("30s"));
        assert!(report.actions[1].duration.is_none());
        assert_eq!(report.failed_actions.len(), 1);
        assert_eq!(report.failed_actions[0].name, "test");
    }

    #[test]
    fn test_build_status_report_placeholders() {
        let execution = ExecutionDocument::parse("{}").unwrap().into_first().unwrap();
        let report = build_status_report(&execution);

        assert_eq!(report.id, "Unknown");
        assert_eq!(report.status.as_str(), "UNKNOWN");
        assert_eq!(report.indicator, "?");
        assert_eq!(report.branch, "-");
        assert_eq!(report.revision, "-");
        assert_eq!(report.creator, "-");
        assert_eq!(report.duration, "-");
        assert!(!report.has_actions());
    }
}
