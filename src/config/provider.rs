//! Provider Configuration
//!
//! Defines the configuration schema for completion providers.

use crate::config::llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Routing and sampling settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,

    /// Provider configurations keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Configuration for a single completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the API
    pub base_url: String,

    /// Raw API key (alternative to api_key_env)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Optional environment variable for custom base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_env: Option<String>,

    /// List of known models (documentation only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,

    /// Parameter name mappings (e.g., max_tokens -> max_completion_tokens)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub param_mappings: HashMap<String, String>,

    /// Additional headers to send with requests
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl ProviderConfig {
    /// A provider reachable at `base_url` with no other settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_key_env: None,
            api_base_env: None,
            models: Vec::new(),
            param_mappings: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    /// Get the effective base URL (from env var if configured, otherwise default)
    pub fn get_base_url(&self) -> String {
        if let Some(env_var) = &self.api_base_env {
            if let Ok(url) = std::env::var(env_var) {
                return url;
            }
        }
        self.base_url.clone()
    }

    /// Name of the environment variable holding this provider's key
    pub fn key_env_var(&self, provider: &str) -> String {
        self.api_key_env
            .clone()
            .unwrap_or_else(|| format!("{}_API_KEY", provider.to_uppercase().replace('-', "_")))
    }

    /// The raw key if configured, otherwise the key from the environment
    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }
        std::env::var(self.key_env_var(provider))
            .ok()
            .filter(|k| !k.is_empty())
    }

    /// Apply parameter mappings to a request body
    pub fn apply_param_mappings(&self, params: &mut serde_json::Value) {
        if let Some(obj) = params.as_object_mut() {
            for (from, to) in &self.param_mappings {
                if let Some(value) = obj.remove(from) {
                    obj.insert(to.clone(), value);
                }
            }
        }
    }
}
