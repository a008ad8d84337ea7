//! Router Module
//!
//! The routing capability: given a conversation and candidate models, pick
//! the model that should answer.

pub mod notdiamond;
pub mod strategy;

pub use notdiamond::NotDiamondClient;
pub use strategy::ModelRoute;

use crate::api::Message;
use crate::error::Result;
use async_trait::async_trait;

/// Outcome of a routing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelection {
    /// Session identifier assigned by the router
    pub session_id: String,

    /// The recommended provider and model
    pub route: ModelRoute,
}

impl RouteSelection {
    /// Identifier of the selected model for use as `LlmConfig::model`.
    ///
    /// The bare model name when it resolves back to the same provider,
    /// otherwise the `provider/model` form.
    pub fn model_identifier(&self, default_provider: &str) -> String {
        match ModelRoute::parse(&self.route.model, default_provider) {
            Ok(resolved) if resolved.provider == self.route.provider => self.route.model.clone(),
            _ => self.route.to_string(),
        }
    }
}

/// A service that recommends a model for a conversation
#[async_trait]
pub trait ModelRouter: Send + Sync {
    /// Choose one of `models` to answer `messages`
    async fn select(&self, messages: &[Message], models: &[String]) -> Result<RouteSelection>;
}
