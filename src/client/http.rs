//! HTTP Client
//!
//! Async JSON client with bearer auth. Each call is a single attempt; status
//! codes are classified into crate errors and returned to the caller.

use crate::error::{LlmrouteError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client for JSON APIs
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // long completions
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| LlmrouteError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Build the default header set for a bearer-authenticated JSON call
    pub fn auth_headers(api_key: &str, extra_headers: Option<&HeaderMap>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| LlmrouteError::Config(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        if let Some(extra) = extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        Ok(headers)
    }

    /// POST `body` as JSON and decode the JSON reply.
    ///
    /// `service` names the remote side in error messages.
    pub async fn post_json<T, R>(
        &self,
        url: &str,
        body: &T,
        headers: HeaderMap,
        service: &str,
    ) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&response_body).map_err(|e| {
                LlmrouteError::Response(format!(
                    "Failed to parse {} response: {}. Body: {}",
                    service,
                    e,
                    truncate(&response_body, 500)
                ))
            });
        }

        Err(classify_status(status, service, &response_body))
    }
}

/// Map a non-success status to a crate error
fn classify_status(status: StatusCode, service: &str, body: &str) -> LlmrouteError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmrouteError::RateLimited {
            provider: service.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmrouteError::Auth(format!("{} rejected credentials: {}", service, body))
        }
        _ => LlmrouteError::Request(format!(
            "{} request failed with status {}: {}",
            service, status, body
        )),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
