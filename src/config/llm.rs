//! Routing Configuration
//!
//! The record threaded through a routed call: routing credentials, candidate
//! models, the selected model and sampling parameters.

use crate::error::{LlmrouteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the Not Diamond API key
pub const ROUTER_API_KEY_ENV: &str = "NOTDIAMOND_API_KEY";

/// Candidates used when the config names none
pub const DEFAULT_MODELS: [&str; 2] = ["gpt-4o-mini", "gpt-4o"];

/// Configuration for a routed LLM
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Routing API key; falls back to `NOTDIAMOND_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Models the router may choose among
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,

    /// Currently selected model, overwritten by each routing decision
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Provider assumed for model identifiers without a `provider/` prefix
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Override for the routing service base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_base_url: Option<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_top_p() -> f32 {
    0.1
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            default_provider: default_provider(),
            router_base_url: None,
        }
    }
}

impl LlmConfig {
    /// Set the routing API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the candidate models
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    /// Copy of this config with a different selected model
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    /// Candidate models, falling back to the defaults when absent or empty
    pub fn candidate_models(&self) -> Vec<String> {
        match self.models.as_ref().filter(|m| !m.is_empty()) {
            Some(models) => models.clone(),
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Resolve the routing API key.
    ///
    /// A non-empty explicit key wins and `lookup` is never called; otherwise
    /// `lookup(ROUTER_API_KEY_ENV)` supplies it.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Result<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        lookup(ROUTER_API_KEY_ENV)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmrouteError::MissingApiKey(ROUTER_API_KEY_ENV.to_string()))
    }
}

// Keep the routing key out of logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("models", &self.models)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("default_provider", &self.default_provider)
            .field("router_base_url", &self.router_base_url)
            .finish()
    }
}
