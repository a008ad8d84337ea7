//! Chat Completion Backend
//!
//! Sends requests to any OpenAI-compatible `/chat/completions` endpoint
//! listed in the provider registry.

use crate::api::{
    CompletionRequest, CompletionResponse, LlmResponse, Message, ResponseFormat, Tool, ToolChoice,
};
use crate::backend::{BackendBuilder, LlmBackend};
use crate::client::HttpClient;
use crate::config::{ConfigLoader, LlmConfig, ProviderConfig, Settings};
use crate::error::{LlmrouteError, Result};
use crate::router::ModelRoute;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;

/// A completion client fixed to one provider and model
#[derive(Debug)]
pub struct CompletionBackend {
    config: LlmConfig,
    route: ModelRoute,
    url: String,
    headers: HeaderMap,
    provider: ProviderConfig,
    http_client: HttpClient,
}

impl CompletionBackend {
    /// Resolve `config.model` against the provider registry
    pub fn new(
        config: LlmConfig,
        providers: &HashMap<String, ProviderConfig>,
        http_client: HttpClient,
    ) -> Result<Self> {
        let route = ModelRoute::parse(&config.model, &config.default_provider)?;

        let provider = providers
            .get(&route.provider)
            .cloned()
            .ok_or_else(|| LlmrouteError::ProviderNotFound(route.provider.clone()))?;

        let api_key = provider.get_api_key(&route.provider).ok_or_else(|| {
            LlmrouteError::NoKeysAvailable {
                provider: route.provider.clone(),
                env_var: provider.key_env_var(&route.provider),
            }
        })?;

        let headers = HttpClient::auth_headers(&api_key, Some(&extra_headers(&provider)))?;
        let url = format!(
            "{}/chat/completions",
            provider.get_base_url().trim_end_matches('/')
        );

        Ok(Self {
            config,
            route,
            url,
            headers,
            provider,
            http_client,
        })
    }

    /// The provider and model this backend calls
    pub fn route(&self) -> &ModelRoute {
        &self.route
    }

    fn build_body(
        &self,
        messages: &[Message],
        response_format: Option<&ResponseFormat>,
        tools: Option<&[Tool]>,
        tool_choice: &ToolChoice,
    ) -> Result<serde_json::Value> {
        let mut request = CompletionRequest::new(self.route.model_id().to_string(), messages.to_vec())
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
            .with_top_p(self.config.top_p)
            .with_tools(tools, tool_choice);
        request.response_format = response_format.cloned();

        let mut body = serde_json::to_value(&request)?;
        self.provider.apply_param_mappings(&mut body);
        Ok(body)
    }
}

/// Provider-specific headers; entries that are not valid HTTP are skipped
fn extra_headers(provider: &ProviderConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in &provider.headers {
        match (
            HeaderName::try_from(key.as_str()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(val)) => {
                headers.insert(name, val);
            }
            _ => tracing::warn!(header = %key, "skipping invalid provider header"),
        }
    }
    headers
}

#[async_trait]
impl LlmBackend for CompletionBackend {
    async fn generate_response(
        &self,
        messages: &[Message],
        response_format: Option<&ResponseFormat>,
        tools: Option<&[Tool]>,
        tool_choice: &ToolChoice,
    ) -> Result<LlmResponse> {
        let body = self.build_body(messages, response_format, tools, tool_choice)?;
        let with_tools = tools.is_some_and(|t| !t.is_empty());

        tracing::debug!(route = %self.route, with_tools, "sending completion request");

        let response: CompletionResponse = self
            .http_client
            .post_json(&self.url, &body, self.headers.clone(), &self.route.provider)
            .await
            .inspect_err(|e| tracing::warn!(route = %self.route, error = %e, "completion failed"))?;

        LlmResponse::from_completion(response, with_tools)
    }
}

/// Builds [`CompletionBackend`]s from a shared provider registry
#[derive(Debug, Clone)]
pub struct CompletionBackendBuilder {
    providers: Arc<HashMap<String, ProviderConfig>>,
    http_client: HttpClient,
}

impl CompletionBackendBuilder {
    /// Use the providers from loaded settings
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_providers(settings.providers.clone())
    }

    /// Use the built-in provider registry plus any config files found
    pub fn from_default_config() -> Result<Self> {
        Self::new(ConfigLoader::new()?.settings())
    }

    /// Use an explicit provider map
    pub fn with_providers(providers: HashMap<String, ProviderConfig>) -> Result<Self> {
        Ok(Self {
            providers: Arc::new(providers),
            http_client: HttpClient::new()?,
        })
    }
}

impl BackendBuilder for CompletionBackendBuilder {
    fn build(&self, config: &LlmConfig) -> Result<Box<dyn LlmBackend>> {
        let backend = CompletionBackend::new(config.clone(), &self.providers, self.http_client.clone())?;
        Ok(Box::new(backend))
    }
}
