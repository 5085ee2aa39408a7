use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExecLensError, Result};

/// Status of an execution or of a single action within it.
///
/// Anything outside the known set is kept verbatim in `Unknown` so it can
/// still be printed; a missing status reads as `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Successful,
    Failed,
    InProgress,
    Enqueued,
    Skipped,
    Terminated,
    Unknown(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::InProgress => "INPROGRESS",
            Self::Enqueued => "ENQUEUED",
            Self::Skipped => "SKIPPED",
            Self::Terminated => "TERMINATED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Single-character indicator shown next to the status.
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Successful => "✓",
            Self::Failed => "✗",
            Self::InProgress => "→",
            Self::Enqueued => "○",
            Self::Skipped => "⊘",
            Self::Terminated => "□",
            Self::Unknown(_) => "?",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Unknown("UNKNOWN".to_string())
    }
}

impl From<&str> for Status {
    fn from(raw: &str) -> Self {
        match raw {
            "SUCCESSFUL" => Self::Successful,
            "FAILED" => Self::Failed,
            "INPROGRESS" => Self::InProgress,
            "ENQUEUED" => Self::Enqueued,
            "SKIPPED" => Self::Skipped,
            "TERMINATED" => Self::Terminated,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::text(deserializer)?;
        Ok(raw.map_or_else(Self::default, |raw| Self::from(raw.as_str())))
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A pipeline run as returned by the executions API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Execution {
    #[serde(deserialize_with = "lenient::text")]
    pub id: Option<String>,
    pub status: Status,
    #[serde(deserialize_with = "lenient::value")]
    pub branch: Named,
    #[serde(deserialize_with = "lenient::value")]
    pub to_revision: Revision,
    #[serde(deserialize_with = "lenient::value")]
    pub creator: Named,
    #[serde(deserialize_with = "lenient::text")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub finish_date: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub action_executions: Vec<ActionExecution>,
}

/// One step of an execution, including its log output when requested.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionExecution {
    #[serde(deserialize_with = "lenient::value")]
    pub action: Action,
    pub status: Status,
    #[serde(deserialize_with = "lenient::text")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub finish_date: Option<String>,
    #[serde(deserialize_with = "lenient::lines")]
    pub log: Vec<String>,
}

impl ActionExecution {
    pub fn name(&self) -> &str {
        self.action.name.as_deref().unwrap_or("Unknown")
    }

    pub fn action_type(&self) -> &str {
        self.action.action_type.as_deref().unwrap_or("-")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Action {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub action_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Named {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Revision {
    #[serde(deserialize_with = "lenient::text")]
    pub revision: Option<String>,
}

impl Execution {
    pub fn failed_actions(&self) -> impl Iterator<Item = &ActionExecution> {
        self.action_executions
            .iter()
            .filter(|action| action.status.is_failed())
    }

    fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Top-level shape of the document on stdin.
///
/// The API hands back either one execution or a list of them; only the
/// first entry of a list is ever reported on.
#[derive(Debug)]
pub enum ExecutionDocument {
    Single(Execution),
    Batch(Vec<Execution>),
}

impl ExecutionDocument {
    /// Parses raw input. Invalid JSON is the only failure.
    ///
    /// # Errors
    ///
    /// Returns [`ExecLensError::InvalidInput`] when `input` is not valid JSON.
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(input.as_ref()).map_err(ExecLensError::InvalidInput)?;

        Ok(match value {
            Value::Array(items) => {
                Self::Batch(items.into_iter().map(Execution::from_value).collect())
            }
            other => Self::Single(Execution::from_value(other)),
        })
    }

    /// The execution to report on, or `None` for an empty list.
    pub fn into_first(self) -> Option<Execution> {
        match self {
            Self::Single(execution) => Some(execution),
            Self::Batch(executions) => executions.into_iter().next(),
        }
    }
}

/// Field deserializers that never fail: a value of the wrong shape reads as absent.
mod lenient {
    use super::{DeserializeOwned, Deserializer, Value};
    use serde::Deserialize;

    pub fn value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
            Value::String(s) => s.lines().map(str::to_string).collect(),
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_execution() {
        let input = r#"{
            "id": 42,
            "status": "FAILED",
            "branch": {"name": "main"},
            "to_revision": {"revision": "0123456789abcdef"},
            "creator": {"name": "Jane"},
            "start_date": "2024-01-15T10:00:00Z",
            "finish_date": "2024-01-15T10:01:00Z",
            "action_executions": [
                {"action": {"name": "build", "type": "BUILD"}, "status": "FAILED", "log": ["a", "b"]}
            ]
        }"#;

        let execution = ExecutionDocument::parse(input).unwrap().into_first().unwrap();

        assert_eq!(execution.id.as_deref(), Some("42"));
        assert_eq!(execution.status, Status::Failed);
        assert_eq!(execution.branch.name.as_deref(), Some("main"));
        assert_eq!(execution.to_revision.revision.as_deref(), Some("0123456789abcdef"));
        assert_eq!(execution.creator.name.as_deref(), Some("Jane"));
        assert_eq!(execution.action_executions.len(), 1);
        assert_eq!(execution.action_executions[0].name(), "build");
        assert_eq!(execution.action_executions[0].action_type(), "BUILD");
        assert_eq!(execution.action_executions[0].log, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_array_uses_first_element() {
        let input = r#"[{"id": "first"}, {"id": "second"}]"#;

        let document = ExecutionDocument::parse(input).unwrap();
        assert!(matches!(document, ExecutionDocument::Batch(ref items) if items.len() == 2));

        let execution = document.into_first().unwrap();
        assert_eq!(execution.id.as_deref(), Some("first"));
    }

    #[test]
    fn test_parse_empty_array_has_no_execution() {
        let document = ExecutionDocument::parse("[]").unwrap();
        assert!(document.into_first().is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = ExecutionDocument::parse("not json").unwrap_err();
        assert!(matches!(err, ExecLensError::InvalidInput(_)));
        assert!(err.to_string().starts_with("Invalid JSON input: "));
    }

    #[test]
    fn test_parse_invalid_utf8_is_invalid_input() {
        let err = ExecutionDocument::parse([b'"', 0xff, b'"']).unwrap_err();
        assert!(matches!(err, ExecLensError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_fields_default_to_placeholders() {
        let execution = ExecutionDocument::parse("{}").unwrap().into_first().unwrap();

        assert!(execution.id.is_none());
        assert_eq!(execution.status.as_str(), "UNKNOWN");
        assert!(execution.branch.name.is_none());
        assert!(execution.action_executions.is_empty());
    }

    #[test]
    fn test_wrongly_typed_fields_are_tolerated() {
        let input = r#"{
            "branch": "main",
            "status": 7,
            "action_executions": [
                {"action": null, "status": "SKIPPED", "log": "line one\nline two"},
                "garbage"
            ]
        }"#;

        let execution = ExecutionDocument::parse(input).unwrap().into_first().unwrap();

        assert!(execution.branch.name.is_none());
        assert_eq!(execution.status, Status::Unknown("7".to_string()));
        assert_eq!(execution.action_executions.len(), 2);
        assert_eq!(execution.action_executions[0].name(), "Unknown");
        assert_eq!(execution.action_executions[0].action_type(), "-");
        assert_eq!(execution.action_executions[0].log, vec!["line one", "line two"]);
        assert_eq!(execution.action_executions[1].status.as_str(), "UNKNOWN");
    }

    #[test]
    fn test_non_object_document_reads_as_empty_execution() {
        let execution = ExecutionDocument::parse("42").unwrap().into_first().unwrap();
        assert!(execution.id.is_none());
        assert!(execution.action_executions.is_empty());
    }

    #[test]
    fn test_status_indicators() {
        assert_eq!(Status::from("SUCCESSFUL").indicator(), "✓");
        assert_eq!(Status::from("FAILED").indicator(), "✗");
        assert_eq!(Status::from("INPROGRESS").indicator(), "→");
        assert_eq!(Status::from("ENQUEUED").indicator(), "○");
        assert_eq!(Status::from("SKIPPED").indicator(), "⊘");
        assert_eq!(Status::from("TERMINATED").indicator(), "□");
        assert_eq!(Status::from("WAITING_FOR_APPLY").indicator(), "?");
        assert_eq!(Status::from("WAITING_FOR_APPLY").as_str(), "WAITING_FOR_APPLY");
    }

    #[test]
    fn test_failed_actions_filter() {
        let input = r#"{"action_executions": [
            {"action": {"name": "a"}, "status": "SUCCESSFUL"},
            {"action": {"name": "b"}, "status": "FAILED"},
            {"action": {"name": "c"}, "status": "failed"}
        ]}"#;

        let execution = ExecutionDocument::parse(input).unwrap().into_first().unwrap();
        let failed: Vec<&str> = execution.failed_actions().map(ActionExecution::name).collect();

        assert_eq!(failed, vec!["b"]);
    }
}
