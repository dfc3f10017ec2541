use thiserror::Error;

/// Main error type for the agent system
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (status {status}): {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Http(err) => err.is_timeout() || err.is_connect(),
            AgentError::Provider { status, .. } => *status == 429 || *status >= 500,
            AgentError::Validation(_) => true,
            AgentError::RateLimit { .. } => true,
            AgentError::Timeout(_) => true,
            _ => false,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Http(_) => "HTTP_ERROR",
            AgentError::Provider { .. } => "PROVIDER_ERROR",
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::Validation(_) => "VALIDATION_ERROR",
            AgentError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            AgentError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            AgentError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            AgentError::Timeout(_) => "TIMEOUT_ERROR",
            AgentError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            AgentError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            AgentError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }

    pub(crate) fn provider(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        AgentError::Provider {
            provider,
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_report_status_and_retryability() {
        let err = AgentError::provider("Anthropic", 529, "overloaded");
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Anthropic API error (status 529): overloaded"
        );

        let err = AgentError::provider("OpenAI", 401, "invalid api key");
        assert!(!err.is_retryable());
    }

    #[test]
    fn payload_carries_code_and_message() {
        let payload = AgentError::ToolNotFound("python_repl".to_string()).to_error_payload();
        assert_eq!(payload["error"]["code"], "TOOL_NOT_FOUND");
        assert_eq!(payload["error"]["message"], "Tool not found: python_repl");
        assert_eq!(payload["error"]["retryable"], false);
    }
}
