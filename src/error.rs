//! llmroute Error Types
//!
//! Error handling for routing and completion calls. Every failure is surfaced
//! to the caller as-is; nothing in this crate retries or degrades.

use thiserror::Error;

/// Main error type for llmroute operations
#[derive(Debug, Error)]
pub enum LlmrouteError {
    /// Configuration errors (invalid JSON, bad model identifiers, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No routing API key in the config or the environment
    #[error("No routing API key found. Set the {0} environment variable or pass `api_key` in the config")]
    MissingApiKey(String),

    /// Provider not found in registry
    #[error("Provider '{0}' not found. Add it to llmroute.json with a `base_url`")]
    ProviderNotFound(String),

    /// No API key configured for a completion provider
    #[error("No API key available for '{provider}'. Set {env_var} or add `api_key_env` to the provider config")]
    NoKeysAvailable { provider: String, env_var: String },

    /// The router could not pick a model
    #[error("Routing failed: {0}")]
    Routing(String),

    /// Rate limit exceeded
    #[error("Rate limited by '{provider}'")]
    RateLimited { provider: String },

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Response parsing failed
    #[error("Response error: {0}")]
    Response(String),

    /// Authentication failed
    #[error("Authentication failed: {0}. Check your API key.")]
    Auth(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for LlmrouteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmrouteError::Timeout(err.to_string())
        } else if err.is_connect() {
            LlmrouteError::Request(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            LlmrouteError::Response(format!("Failed to decode response: {}", err))
        } else {
            LlmrouteError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmrouteError {
    fn from(err: serde_json::Error) -> Self {
        LlmrouteError::Response(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for LlmrouteError {
    fn from(err: std::io::Error) -> Self {
        LlmrouteError::Config(format!("IO error: {}", err))
    }
}

/// Result type alias for llmroute operations
pub type Result<T> = std::result::Result<T, LlmrouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_names_variable() {
        let err = LlmrouteError::MissingApiKey("NOTDIAMOND_API_KEY".to_string());
        assert!(err.to_string().contains("NOTDIAMOND_API_KEY"));
    }

    #[test]
    fn test_no_keys_available_suggests_env_var() {
        let err = LlmrouteError::NoKeysAvailable {
            provider: "groq".to_string(),
            env_var: "GROQ_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_json_error_maps_to_response() {
        let err: LlmrouteError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, LlmrouteError::Response(_)));
    }
}
