//! Error taxonomy for tool planning
//!
//! Configuration problems are fatal and surface at construction time. Backend,
//! parse and registry failures are recoverable: the reasoning entry point folds
//! them into an error-shaped [`Plan`](crate::planner::Plan) instead of returning
//! them.

use thiserror::Error;

/// Missing or incompatible configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration must be a YAML mapping")]
    NotAMapping,

    #[error("Missing required config section: {0}")]
    MissingSection(String),

    #[error("Config version {version} not supported (max {supported}.x)")]
    UnsupportedVersion { version: String, supported: u64 },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure talking to the model backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("LLM API error: {0}")]
    Status(u16),

    #[error("Error calling LLM: {0}")]
    Http(String),

    #[error("Error calling LLM: invalid response body: {0}")]
    Decode(String),

    #[error("Error calling LLM: {0}")]
    Unavailable(String),
}

/// Model output that could not be turned into a plan.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("Failed to parse response: {0}")]
    Malformed(String),

    #[error("Unrecognized LLM response format")]
    Unrecognized,
}

/// Failure listing or calling tools through a registry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    #[error("Tool registry request failed: {0}")]
    Transport(String),

    #[error("Tool registry returned HTTP {0}")]
    Status(u16),

    #[error("Tool registry error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool {tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Invalid tool registry response: {0}")]
    Decode(String),
}

/// Umbrella error for callers that prefer a single type.
#[derive(Debug, Error)]
pub enum ToolplanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, ToolplanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_render_plan_error_text() {
        assert_eq!(
            ParseError::Malformed("expected value at line 1 column 1".to_string()).to_string(),
            "Failed to parse response: expected value at line 1 column 1"
        );
        assert_eq!(
            ParseError::Unrecognized.to_string(),
            "Unrecognized LLM response format"
        );
    }

    #[test]
    fn backend_status_renders_like_api_error() {
        assert_eq!(BackendError::Status(503).to_string(), "LLM API error: 503");
        assert_eq!(
            BackendError::Http("connection refused".to_string()).to_string(),
            "Error calling LLM: connection refused"
        );
    }

    #[test]
    fn umbrella_converts_from_boundary_errors() {
        let err: ToolplanError = ConfigError::MissingSection("llm".to_string()).into();
        assert!(matches!(err, ToolplanError::Config(_)));
        assert_eq!(err.to_string(), "Missing required config section: llm");
    }
}
