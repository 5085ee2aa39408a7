use serde::Serialize;

use crate::error::{ExecLensError, Result};

/// Serializes a report as JSON, pretty-printed on request.
pub fn export_json<T: Serialize>(report: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .map_err(|err| ExecLensError::Serialization(err.to_string()))?;

    Ok(format!("{json}\n"))
}

/// Serializes a report as YAML.
pub fn export_yaml<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_yaml::to_string(report)?)
}
