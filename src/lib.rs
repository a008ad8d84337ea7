//! llmroute - routed LLM completions
//!
//! Asks the Not Diamond router which candidate model should answer a
//! conversation, then delegates the completion to an OpenAI-compatible
//! backend configured with that model.

use tracing::{debug, info};

pub mod api;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod router;

pub use api::{LlmResponse, Message, ResponseFormat, Tool, ToolChoice};
pub use config::{ConfigLoader, LlmConfig};
pub use error::{LlmrouteError, Result};

use backend::{BackendBuilder, CompletionBackendBuilder};
use router::notdiamond::DEFAULT_BASE_URL;
use router::{ModelRouter, NotDiamondClient, RouteSelection};
use std::path::Path;

/// A routed response together with the config that produced it
#[derive(Debug, Clone)]
pub struct Routed<T> {
    /// Backend output, unchanged
    pub response: T,

    /// The config the backend was built from; `model` holds the router's pick
    pub config: LlmConfig,

    /// Router session identifier
    pub session_id: String,
}

/// LLM client that picks its model per conversation
pub struct RoutedLlm {
    config: LlmConfig,
    router: Box<dyn ModelRouter>,
    backends: Box<dyn BackendBuilder>,
}

impl RoutedLlm {
    /// Create a routed client.
    ///
    /// The routing key comes from `config.api_key` or `NOTDIAMOND_API_KEY`;
    /// backends use the built-in provider registry plus any config files.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let backends = CompletionBackendBuilder::from_default_config()?;
        Self::with_backends(config, backends)
    }

    /// Create a client from the config files in the default locations
    pub fn from_default_config() -> Result<Self> {
        Self::from_loader(&ConfigLoader::new()?)
    }

    /// Create a client from a specific config file
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_loader(&ConfigLoader::from_path(path)?)
    }

    fn from_loader(loader: &ConfigLoader) -> Result<Self> {
        let backends = CompletionBackendBuilder::new(loader.settings())?;
        Self::with_backends(loader.llm_config(), backends)
    }

    /// Create a client with the Not Diamond router and a custom backend builder
    pub fn with_backends(
        config: LlmConfig,
        backends: impl BackendBuilder + 'static,
    ) -> Result<Self> {
        let api_key = config.resolve_api_key(|name| std::env::var(name).ok())?;
        let base_url = config.router_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let router = NotDiamondClient::with_base_url(&api_key, base_url)?
            .with_default_provider(config.default_provider.clone());

        Ok(Self::with_parts(config, router, backends))
    }

    /// Create a client from explicit routing and generation capabilities
    pub fn with_parts(
        mut config: LlmConfig,
        router: impl ModelRouter + 'static,
        backends: impl BackendBuilder + 'static,
    ) -> Self {
        if config.models.as_ref().map_or(true, Vec::is_empty) {
            config.models = Some(config.candidate_models());
        }
        debug!(config = ?config, "routed llm initialized");

        Self {
            config,
            router: Box::new(router),
            backends: Box::new(backends),
        }
    }

    /// The configuration as initialized
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn route(&self, messages: &[Message]) -> Result<RouteSelection> {
        let models = self.config.candidate_models();
        let selection = self.router.select(messages, &models).await?;
        info!(
            route = %selection.route,
            session_id = %selection.session_id,
            "router selected model"
        );
        Ok(selection)
    }

    /// Ask the router which candidate model should answer `messages`.
    ///
    /// `tools` is accepted for signature parity with [`Self::generate_response`]
    /// and is not sent to the router.
    pub async fn recommend_model(
        &self,
        messages: &[Message],
        _tools: Option<&[Tool]>,
    ) -> Result<String> {
        let selection = self.route(messages).await?;
        Ok(selection.model_identifier(&self.config.default_provider))
    }

    /// Route `messages`, then generate with the recommended model.
    ///
    /// The backend is built from a copy of the config whose `model` is the
    /// recommendation; that copy is returned in [`Routed::config`]. Routing
    /// errors are returned before any backend is built.
    pub async fn generate_response(
        &self,
        messages: &[Message],
        response_format: Option<&ResponseFormat>,
        tools: Option<&[Tool]>,
        tool_choice: &ToolChoice,
    ) -> Result<Routed<LlmResponse>> {
        let selection = self.route(messages).await?;
        let model = selection.model_identifier(&self.config.default_provider);

        let config = self.config.with_model(model);
        debug!(config = ?config, "delegating to backend");

        let backend = self.backends.build(&config)?;
        let response = backend
            .generate_response(messages, response_format, tools, tool_choice)
            .await?;

        Ok(Routed {
            response,
            config,
            session_id: selection.session_id,
        })
    }
}

// =============================================================================
// Blocking API
// =============================================================================

/// Synchronous wrapper that drives a [`RoutedLlm`](crate::RoutedLlm) on its
/// own single-threaded runtime.
///
/// Must not be used from inside an async context.
pub mod blocking {
    use crate::api::{LlmResponse, Message, ResponseFormat, Tool, ToolChoice};
    use crate::config::LlmConfig;
    use crate::error::{LlmrouteError, Result};
    use crate::Routed;

    /// Blocking counterpart of [`crate::RoutedLlm`]
    pub struct RoutedLlm {
        inner: crate::RoutedLlm,
        runtime: tokio::runtime::Runtime,
    }

    impl RoutedLlm {
        /// Create a client, loading `.env` first if present
        pub fn new(config: LlmConfig) -> Result<Self> {
            let _ = dotenvy::dotenv();
            Self::from_async(crate::RoutedLlm::new(config)?)
        }

        /// Wrap an already configured async client
        pub fn from_async(inner: crate::RoutedLlm) -> Result<Self> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmrouteError::Internal(format!("Failed to create runtime: {}", e)))?;

            Ok(Self { inner, runtime })
        }

        /// The configuration as initialized
        pub fn config(&self) -> &LlmConfig {
            self.inner.config()
        }

        /// See [`crate::RoutedLlm::recommend_model`]
        pub fn recommend_model(&self, messages: &[Message], tools: Option<&[Tool]>) -> Result<String> {
            self.runtime
                .block_on(self.inner.recommend_model(messages, tools))
        }

        /// See [`crate::RoutedLlm::generate_response`]
        pub fn generate_response(
            &self,
            messages: &[Message],
            response_format: Option<&ResponseFormat>,
            tools: Option<&[Tool]>,
            tool_choice: &ToolChoice,
        ) -> Result<Routed<LlmResponse>> {
            self.runtime.block_on(self.inner.generate_response(
                messages,
                response_format,
                tools,
                tool_choice,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LlmBackend;
    use crate::router::ModelRoute;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Router that always picks the same model and records the candidates
    struct FixedRouter {
        pick: ModelRoute,
        candidates: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl FixedRouter {
        fn new(provider: &str, model: &str) -> Self {
            Self {
                pick: ModelRoute::new(provider, model),
                candidates: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl ModelRouter for FixedRouter {
        async fn select(&self, _messages: &[Message], models: &[String]) -> Result<RouteSelection> {
            self.candidates.lock().unwrap().push(models.to_vec());
            Ok(RouteSelection {
                session_id: "sess-1".to_string(),
                route: self.pick.clone(),
            })
        }
    }

    struct FailingRouter;

    #[async_trait]
    impl ModelRouter for FailingRouter {
        async fn select(&self, _messages: &[Message], _models: &[String]) -> Result<RouteSelection> {
            Err(LlmrouteError::Auth("invalid routing key".to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct BackendCall {
        response_format: Option<ResponseFormat>,
        tools: Option<Vec<Tool>>,
        tool_choice: ToolChoice,
    }

    /// Backend that answers only for the model it expects
    struct CannedBackend {
        model: String,
        expected_model: String,
        reply: String,
        calls: Arc<Mutex<Vec<BackendCall>>>,
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn generate_response(
            &self,
            _messages: &[Message],
            response_format: Option<&ResponseFormat>,
            tools: Option<&[Tool]>,
            tool_choice: &ToolChoice,
        ) -> Result<LlmResponse> {
            self.calls.lock().unwrap().push(BackendCall {
                response_format: response_format.cloned(),
                tools: tools.map(|t| t.to_vec()),
                tool_choice: tool_choice.clone(),
            });
            if self.model != self.expected_model {
                return Err(LlmrouteError::Request(format!("unexpected model {}", self.model)));
            }
            Ok(LlmResponse::Text(self.reply.clone()))
        }
    }

    #[derive(Default)]
    struct RecordingBuilder {
        expected_model: String,
        reply: String,
        built: Arc<Mutex<Vec<LlmConfig>>>,
        calls: Arc<Mutex<Vec<BackendCall>>>,
    }

    impl RecordingBuilder {
        fn new(expected_model: &str, reply: &str) -> Self {
            Self {
                expected_model: expected_model.to_string(),
                reply: reply.to_string(),
                ..Default::default()
            }
        }
    }

    impl BackendBuilder for RecordingBuilder {
        fn build(&self, config: &LlmConfig) -> Result<Box<dyn LlmBackend>> {
            self.built.lock().unwrap().push(config.clone());
            Ok(Box::new(CannedBackend {
                model: config.model.clone(),
                expected_model: self.expected_model.clone(),
                reply: self.reply.clone(),
                calls: self.calls.clone(),
            }))
        }
    }

    #[test]
    fn test_default_candidates_on_init() {
        let llm = RoutedLlm::with_parts(
            LlmConfig::default(),
            FixedRouter::new("openai", "gpt-4o"),
            RecordingBuilder::default(),
        );
        assert_eq!(
            llm.config().models,
            Some(vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()])
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_replaced_by_defaults() {
        let router = FixedRouter::new("openai", "gpt-4o");
        let candidates = router.candidates.clone();
        let config = LlmConfig {
            models: Some(vec![]),
            ..LlmConfig::default()
        };
        let llm = RoutedLlm::with_parts(config, router, RecordingBuilder::default());

        let defaults = vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()];
        assert_eq!(llm.config().models, Some(defaults.clone()));

        llm.recommend_model(&[Message::user("Hi")], None).await.unwrap();
        assert_eq!(candidates.lock().unwrap()[0], defaults);
    }

    #[test]
    fn test_explicit_candidates_kept() {
        let config = LlmConfig::default().with_models(["claude-3-haiku-20240307"]);
        let llm = RoutedLlm::with_parts(
            config,
            FixedRouter::new("openai", "gpt-4o"),
            RecordingBuilder::default(),
        );
        assert_eq!(
            llm.config().models,
            Some(vec!["claude-3-haiku-20240307".to_string()])
        );
    }

    #[test]
    fn test_explicit_api_key_builds_router() {
        let config = LlmConfig::default()
            .with_api_key("nd-explicit")
            .with_models(["gpt-4o"]);
        assert!(RoutedLlm::with_backends(config, RecordingBuilder::default()).is_ok());
    }

    #[test]
    fn test_config_file_llm_section_used() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"llm": {"api_key": "nd-file", "models": ["gpt-4o"], "temperature": 0.5}}"#,
        )
        .unwrap();

        let llm = RoutedLlm::with_config_path(file.path()).unwrap();
        assert_eq!(llm.config().models, Some(vec!["gpt-4o".to_string()]));
        assert_eq!(llm.config().temperature, 0.5);
    }

    #[tokio::test]
    async fn test_recommend_model_ignores_content() {
        let router = FixedRouter::new("openai", "gpt-4o");
        let candidates = router.candidates.clone();
        let llm = RoutedLlm::with_parts(LlmConfig::default(), router, RecordingBuilder::default());

        for prompt in ["Hi", "Summarize the French revolution in one line"] {
            let model = llm.recommend_model(&[Message::user(prompt)], None).await.unwrap();
            assert_eq!(model, "gpt-4o");
        }
        assert_eq!(
            candidates.lock().unwrap()[0],
            vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()]
        );
    }

    #[tokio::test]
    async fn test_generate_response_end_to_end() {
        let builder = RecordingBuilder::new("gpt-4o", "Hello!");
        let built = builder.built.clone();
        let llm = RoutedLlm::with_parts(
            LlmConfig::default(),
            FixedRouter::new("openai", "gpt-4o"),
            builder,
        );

        let routed = llm
            .generate_response(&[Message::user("Hi")], None, None, &ToolChoice::default())
            .await
            .unwrap();

        assert_eq!(routed.response, LlmResponse::Text("Hello!".to_string()));
        assert_eq!(routed.config.model, "gpt-4o");
        assert_eq!(routed.session_id, "sess-1");
        assert_eq!(built.lock().unwrap()[0].model, "gpt-4o");
        assert_eq!(llm.config().model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_generate_response_forwards_arguments() {
        let builder = RecordingBuilder::new("claude-3-haiku-20240307", "ok");
        let calls = builder.calls.clone();
        let llm = RoutedLlm::with_parts(
            LlmConfig::default(),
            FixedRouter::new("anthropic", "claude-3-haiku-20240307"),
            builder,
        );

        let tools = vec![Tool::function(
            "add_memory",
            "Store a fact",
            serde_json::json!({"type": "object"}),
        )];
        let choice = ToolChoice::Mode("required".to_string());
        llm.generate_response(
            &[Message::user("Remember I like tea")],
            Some(&ResponseFormat::JsonObject),
            Some(tools.as_slice()),
            &choice,
        )
        .await
        .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls[0],
            BackendCall {
                response_format: Some(ResponseFormat::JsonObject),
                tools: Some(tools.clone()),
                tool_choice: choice.clone(),
            }
        );
    }

    #[tokio::test]
    async fn test_routing_error_skips_backend() {
        let builder = RecordingBuilder::new("gpt-4o", "Hello!");
        let built = builder.built.clone();
        let llm = RoutedLlm::with_parts(LlmConfig::default(), FailingRouter, builder);

        let err = llm
            .generate_response(&[Message::user("Hi")], None, None, &ToolChoice::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmrouteError::Auth(msg) if msg == "invalid routing key"));
        assert!(built.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blocking_generate_response() {
        let llm = RoutedLlm::with_parts(
            LlmConfig::default(),
            FixedRouter::new("openai", "gpt-4o"),
            RecordingBuilder::new("gpt-4o", "Hello!"),
        );
        let llm = blocking::RoutedLlm::from_async(llm).unwrap();

        let routed = llm
            .generate_response(&[Message::user("Hi")], None, None, &ToolChoice::default())
            .unwrap();
        assert_eq!(routed.response.content(), Some("Hello!"));
        assert_eq!(routed.config.model, "gpt-4o");
    }

    #[test]
    fn test_blocking_recommend_model() {
        let llm = RoutedLlm::with_parts(
            LlmConfig::default(),
            FixedRouter::new("openai", "gpt-4o-mini"),
            RecordingBuilder::default(),
        );
        let llm = blocking::RoutedLlm::from_async(llm).unwrap();

        assert_eq!(
            llm.recommend_model(&[Message::user("Hi")], None).unwrap(),
            "gpt-4o-mini"
        );
    }
}
