//! Model Routes
//!
//! Handles parsing of model identifiers into provider/model pairs.

use crate::error::{LlmrouteError, Result};
use serde::{Deserialize, Serialize};

/// Model-name prefixes that identify a provider without an explicit prefix
const KNOWN_PREFIXES: &[(&str, &str)] = &[
    ("gpt-", "openai"),
    ("chatgpt-", "openai"),
    ("o1", "openai"),
    ("claude-", "anthropic"),
    ("gemini-", "google"),
    ("mistral-", "mistral"),
    ("open-mistral-", "mistral"),
    ("open-mixtral-", "mistral"),
    ("codestral-", "mistral"),
    ("command-", "cohere"),
    ("llama-3.1-sonar-", "perplexity"),
];

/// Parsed model identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Provider name (e.g., "openai", "anthropic")
    pub provider: String,

    /// Model name (e.g., "gpt-4o")
    pub model: String,
}

impl ModelRoute {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Parse `provider/model` or a bare model name.
    ///
    /// Bare names get a provider inferred from well-known prefixes, then
    /// `default_provider`. Only the first `/` separates the provider, so
    /// model names may themselves contain slashes.
    pub fn parse(model_string: &str, default_provider: &str) -> Result<Self> {
        let model_string = model_string.trim();

        let route = match model_string.split_once('/') {
            Some((provider, model)) => Self::new(provider, model),
            None => Self::new(
                Self::infer_provider(model_string).unwrap_or(default_provider),
                model_string,
            ),
        };

        if route.provider.is_empty() || route.model.is_empty() {
            return Err(LlmrouteError::Config(format!(
                "Invalid model '{}'. Expected 'provider/model' or a model name",
                model_string
            )));
        }

        Ok(route)
    }

    /// Provider implied by a bare model name, if recognizable
    pub fn infer_provider(model: &str) -> Option<&'static str> {
        KNOWN_PREFIXES
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
            .map(|(_, provider)| *provider)
    }

    /// Model name as the provider's API expects it
    pub fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Display for ModelRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
