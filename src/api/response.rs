//! Backend Responses
//!
//! The shape handed back to callers once a completion has been parsed.

use crate::api::completion::CompletionResponse;
use crate::error::{LlmrouteError, Result};
use serde::{Deserialize, Serialize};

/// A tool call with its arguments decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Generated output of a backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LlmResponse {
    /// Plain text, returned when no tools were offered
    Text(String),

    /// Content plus any tool calls, returned when tools were offered
    WithTools {
        content: Option<String>,
        tool_calls: Vec<ParsedToolCall>,
    },
}

impl LlmResponse {
    /// Parse the first choice of a completion.
    ///
    /// `with_tools` selects the output shape, even if the model chose not to
    /// call anything.
    pub fn from_completion(response: CompletionResponse, with_tools: bool) -> Result<Self> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmrouteError::Response("Completion returned no choices".to_string()))?;

        if !with_tools {
            return Ok(LlmResponse::Text(choice.message.content.unwrap_or_default()));
        }

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| -> Result<ParsedToolCall> {
                let arguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
                    LlmrouteError::Response(format!(
                        "Invalid arguments for tool '{}': {}",
                        call.function.name, e
                    ))
                })?;
                Ok(ParsedToolCall {
                    name: call.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LlmResponse::WithTools {
            content: choice.message.content,
            tool_calls,
        })
    }

    /// Text content, if any
    pub fn content(&self) -> Option<&str> {
        match self {
            LlmResponse::Text(text) => Some(text.as_str()),
            LlmResponse::WithTools { content, .. } => content.as_deref(),
        }
    }

    /// Tool calls; empty for plain text responses
    pub fn tool_calls(&self) -> &[ParsedToolCall] {
        match self {
            LlmResponse::Text(_) => &[],
            LlmResponse::WithTools { tool_calls, .. } => tool_calls,
        }
    }
}
