//! Not Diamond Router
//!
//! Client for the Not Diamond model-selection endpoint.

use crate::api::Message;
use crate::client::HttpClient;
use crate::error::{LlmrouteError, Result};
use crate::router::{ModelRoute, ModelRouter, RouteSelection};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// Default Not Diamond API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.notdiamond.ai";

const SELECT_PATH: &str = "/v2/modelRouter/modelSelect";

#[derive(Debug, Serialize)]
struct SelectRequest<'a> {
    messages: &'a [Message],
    llm_providers: Vec<ModelRoute>,
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    providers: Vec<ModelRoute>,
    #[serde(default)]
    session_id: String,
}

/// Routing client bound to one API key
#[derive(Debug, Clone)]
pub struct NotDiamondClient {
    http_client: HttpClient,
    headers: HeaderMap,
    url: String,
    default_provider: String,
}

impl NotDiamondClient {
    /// Create a client against the public endpoint
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        Ok(Self {
            http_client: HttpClient::new()?,
            headers: HttpClient::auth_headers(api_key, None)?,
            url: format!("{}{}", base_url.trim_end_matches('/'), SELECT_PATH),
            default_provider: "openai".to_string(),
        })
    }

    /// Provider assumed for bare candidate names
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    fn candidates(&self, models: &[String]) -> Result<Vec<ModelRoute>> {
        models
            .iter()
            .map(|m| ModelRoute::parse(m, &self.default_provider))
            .collect()
    }
}

#[async_trait]
impl ModelRouter for NotDiamondClient {
    async fn select(&self, messages: &[Message], models: &[String]) -> Result<RouteSelection> {
        let request = SelectRequest {
            messages,
            llm_providers: self.candidates(models)?,
        };

        tracing::debug!(candidates = request.llm_providers.len(), "requesting model selection");

        let response: SelectResponse = self
            .http_client
            .post_json(&self.url, &request, self.headers.clone(), "notdiamond")
            .await?;

        let route = response.providers.into_iter().next().ok_or_else(|| {
            LlmrouteError::Routing("Not Diamond returned no provider".to_string())
        })?;

        Ok(RouteSelection {
            session_id: response.session_id,
            route,
        })
    }
}
