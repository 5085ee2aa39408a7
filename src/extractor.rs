use std::collections::BTreeMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::execution::{ActionExecution, Execution};

const MAX_DETAIL_CHARS: usize = 200;
const MAX_LINE_CHARS: usize = 300;
const DEDUP_PREFIX_CHARS: usize = 50;
const CONTEXT_LINES: usize = 5;

pub const NO_LOGS_CATEGORY: &str = "No Logs";
pub const NO_LOGS_DETAIL: &str = "Action failed but no logs available";
pub const UNIDENTIFIED_CATEGORY: &str = "Unidentified";

/// A log categorization rule. Rules are tried in declaration order and the
/// first one that matches a line claims it.
struct Rule {
    category: &'static str,
    pattern: Regex,
}

const RULE_SOURCES: &[(&str, &str)] = &[
    // General errors
    (r"(?i)\b(error|fatal|exception):\s*(.+)", "Error"),
    (r"(?i)^\s*Error:\s*(.+)", "Error"),
    // Exit codes
    (r"exit(?:ed)?\s+(?:with\s+)?(?:code\s+)?(\d+)", "Exit Code"),
    (r"return(?:ed)?\s+(?:code\s+)?(\d+)", "Return Code"),
    // Build failures
    (r"(?i)build\s+failed", "Build Failed"),
    (r"(?i)compilation\s+(?:error|failed)", "Compilation Error"),
    // Test failures
    (r"(?i)(\d+)\s+(?:tests?\s+)?failed", "Test Failures"),
    (r"(?i)FAIL[ED]?\s+(.+)", "Test Failed"),
    // Package managers, ahead of the generic dependency rule
    (r"(?i)npm\s+ERR!\s*(.+)", "NPM Error"),
    (r"(?i)composer\s+(?:error|failed)", "Composer Error"),
    // Dependency issues
    (
        r"(?i)(?:could\s+not\s+(?:find|resolve)|missing)\s+(?:dependency|package|module)\s*:?\s*(.+)",
        "Missing Dependency",
    ),
    // Permission/access issues
    (r"(?i)permission\s+denied", "Permission Denied"),
    (r"(?i)access\s+denied", "Access Denied"),
    (r"(?i)authentication\s+(?:failed|error|required)", "Auth Error"),
    // Network issues
    (r"(?i)connection\s+(?:refused|timed?\s*out|failed)", "Connection Error"),
    (r"(?i)timeout\s+(?:exceeded|error)", "Timeout"),
    // Resource issues
    (r"(?i)out\s+of\s+memory", "Out of Memory"),
    (r"(?i)disk\s+(?:full|space)", "Disk Space"),
];

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_SOURCES
        .iter()
        .filter_map(|&(pattern, category)| match Regex::new(pattern) {
            Ok(pattern) => Some(Rule { category, pattern }),
            Err(err) => {
                log::error!("Skipping invalid rule for {category}: {err}");
                None
            }
        })
        .collect()
});

/// A single categorized error pulled out of a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: String,
    pub action: String,
    pub detail: String,
    /// Trimmed source line; kept for structured output, not printed in text reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: String,
    /// Findings seen for this category before deduplication.
    pub occurrences: usize,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedAction {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: String,
}

impl From<&ActionExecution> for FailedAction {
    fn from(action: &ActionExecution) -> Self {
        Self {
            name: action.name().to_string(),
            action_type: action.action_type().to_string(),
        }
    }
}

/// Categorized errors for every failed action of one execution.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub categories: Vec<CategorySummary>,
    pub failed_actions: Vec<FailedAction>,
}

/// Matches a single line against the rule table.
///
/// Returns the category and detail of the first matching rule. The detail is
/// the first capture group when the rule has one, otherwise the trimmed line.
pub fn classify_line(line: &str) -> Option<(&'static str, String)> {
    RULES.iter().find_map(|rule| {
        rule.pattern.captures(line).map(|caps| {
            let detail = caps
                .get(1)
                .map_or_else(|| line.trim(), |group| group.as_str());
            (rule.category, truncate_chars(detail, MAX_DETAIL_CHARS))
        })
    })
}

/// Scans a log and returns one finding per matching line.
pub fn extract_from_log(action: &str, log: &[String]) -> Vec<Finding> {
    log.iter()
        .filter_map(|line| {
            classify_line(line).map(|(category, detail)| Finding {
                category: category.to_string(),
                action: action.to_string(),
                detail,
                line: Some(truncate_chars(line.trim(), MAX_LINE_CHARS)),
            })
        })
        .collect()
}

fn findings_for_action(action: &ActionExecution) -> Vec<Finding> {
    let name = action.name();

    if action.log.is_empty() {
        return vec![Finding {
            category: NO_LOGS_CATEGORY.to_string(),
            action: name.to_string(),
            detail: NO_LOGS_DETAIL.to_string(),
            line: None,
        }];
    }

    let findings = extract_from_log(name, &action.log);
    debug!("Action '{}': {} matching lines", name, findings.len());

    if findings.is_empty() {
        let tail_start = action.log.len().saturating_sub(CONTEXT_LINES);
        return vec![Finding {
            category: UNIDENTIFIED_CATEGORY.to_string(),
            action: name.to_string(),
            detail: action.log[tail_start..].join("\n"),
            line: None,
        }];
    }

    findings
}

/// Builds the error report for an execution.
///
/// Returns `None` when no action failed.
pub fn build_error_report(execution: &Execution) -> Option<ErrorReport> {
    let failed: Vec<&ActionExecution> = execution.failed_actions().collect();
    if failed.is_empty() {
        return None;
    }

    let mut by_category: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
    for action in &failed {
        for finding in findings_for_action(action) {
            by_category
                .entry(finding.category.clone())
                .or_default()
                .push(finding);
        }
    }

    let categories = by_category
        .into_iter()
        .map(|(category, findings)| CategorySummary {
            category,
            occurrences: findings.len(),
            findings: dedup_findings(findings),
        })
        .collect();

    Some(ErrorReport {
        categories,
        failed_actions: failed.into_iter().map(FailedAction::from).collect(),
    })
}

/// Drops findings whose action and detail prefix were already seen, keeping
/// the first occurrence in order.
fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut unique: IndexMap<(String, String), Finding> = IndexMap::new();
    for finding in findings {
        let key = (
            finding.action.clone(),
            truncate_chars(&finding.detail, DEDUP_PREFIX_CHARS),
        );
        unique.entry(key).or_insert(finding);
    }
    unique.into_values().collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
