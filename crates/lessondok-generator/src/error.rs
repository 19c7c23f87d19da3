//! Error types for content generation

use thiserror::Error;

/// Errors that can occur while generating lesson content
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Endpoint answered without any message content
    #[error("Response contained no message content")]
    EmptyResponse,

    /// Model output is not a JSON object after fence stripping
    #[error("Generated content is not valid JSON: {message}")]
    ParseFailure { message: String, raw: String },

    /// No API key in the prompt settings or the environment
    #[error("No API key: set the apiKey column or the {0} environment variable")]
    MissingApiKey(String),

    /// A prompt setting is blank
    #[error("Prompt setting '{0}' is empty")]
    MissingSetting(String),

    /// Request or response (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeneratorError {
    /// Create a parse failure carrying the raw model output
    pub fn parse_failure(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ParseFailure {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Whether the call reached the model but its output was unusable
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure { .. })
    }

    /// Raw model output, for parse failures
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::ParseFailure { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type for generation
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_keeps_payload() {
        let err = GeneratorError::parse_failure("expected value", "not json");
        assert!(err.is_parse_failure());
        assert_eq!(err.raw_payload(), Some("not json"));
        assert_eq!(
            err.to_string(),
            "Generated content is not valid JSON: expected value"
        );
    }

    #[test]
    fn test_other_errors_have_no_payload() {
        let err = GeneratorError::ServerError {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(!err.is_parse_failure());
        assert_eq!(err.raw_payload(), None);
        assert_eq!(err.to_string(), "Server error (429): slow down");
    }
}
