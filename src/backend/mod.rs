//! Backend Module
//!
//! The generation capability a routed call is delegated to once its model is
//! known.

pub mod completion;

pub use completion::{CompletionBackend, CompletionBackendBuilder};

use crate::api::{LlmResponse, Message, ResponseFormat, Tool, ToolChoice};
use crate::config::LlmConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Something that can answer a conversation with one fixed model
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response.
    ///
    /// Returns [`LlmResponse::Text`] when `tools` is absent or empty and
    /// [`LlmResponse::WithTools`] otherwise.
    async fn generate_response(
        &self,
        messages: &[Message],
        response_format: Option<&ResponseFormat>,
        tools: Option<&[Tool]>,
        tool_choice: &ToolChoice,
    ) -> Result<LlmResponse>;
}

/// Creates a backend for the model selected in a config
pub trait BackendBuilder: Send + Sync {
    fn build(&self, config: &LlmConfig) -> Result<Box<dyn LlmBackend>>;
}
