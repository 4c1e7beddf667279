//! Error types for Routr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Routr
#[derive(Debug, Error)]
pub enum RoutrError {
    /// Language model call failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool collaborator failed
    #[error("Tool error: {0}")]
    Tool(String),

    /// Configuration is missing or invalid
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoutrError {
    /// Whether the router may recover from this error locally
    pub fn is_tool_error(&self) -> bool {
        matches!(self, RoutrError::Tool(_))
    }
}

/// Result type alias for Routr operations
pub type Result<T> = std::result::Result<T, RoutrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error() {
        let err = RoutrError::Llm("rate limited".to_string());
        assert_eq!(err.to_string(), "LLM error: rate limited");
    }

    #[test]
    fn test_tool_error() {
        let err = RoutrError::Tool("timeout".to_string());
        assert_eq!(err.to_string(), "Tool error: timeout");
        assert!(err.is_tool_error());
    }

    #[test]
    fn test_config_error() {
        let err = RoutrError::Config("TAVILY_API_KEY not set".to_string());
        assert_eq!(err.to_string(), "Config error: TAVILY_API_KEY not set");
        assert!(!err.is_tool_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoutrError = io_err.into();
        assert!(matches!(err, RoutrError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: RoutrError = json_err.into();
        assert!(matches!(err, RoutrError::Json(_)));
    }
}
