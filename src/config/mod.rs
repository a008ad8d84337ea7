//! Configuration Module
//!
//! Routing config, provider registry and the loader that merges them.

pub mod llm;
pub mod loader;
pub mod provider;

pub use llm::{LlmConfig, DEFAULT_MODELS, ROUTER_API_KEY_ENV};
pub use loader::ConfigLoader;
pub use provider::{ProviderConfig, Settings};
