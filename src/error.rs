use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecLensError {
    // The cause is rendered inline and not exposed as `source()`, so `{:#}`
    // prints it once.
    #[error("Invalid JSON input: {0}")]
    InvalidInput(serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for ExecLensError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExecLensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_the_parse_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ExecLensError::InvalidInput(parse_err);

        let message = err.to_string();
        assert!(message.starts_with("Invalid JSON input: "));
        assert!(message.contains("line 1"));
    }

    #[test]
    fn test_invalid_input_has_no_separate_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = anyhow::Error::from(ExecLensError::InvalidInput(parse_err));

        assert_eq!(format!("{err:#}"), format!("{err}"));
    }
}
