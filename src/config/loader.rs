//! Configuration Loader
//!
//! Handles loading and merging settings from multiple sources.

use crate::config::llm::LlmConfig;
use crate::config::provider::Settings;
use crate::error::{LlmrouteError, Result};
use std::path::{Path, PathBuf};

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    settings: Settings,
}

impl ConfigLoader {
    /// Create a new config loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self::builtin()?;

        // File system settings can override built-ins
        loader.load_from_default_paths()?;

        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self::builtin()?;
        loader.load_from_file(path)?;
        Ok(loader)
    }

    /// Create a loader holding only the built-in provider registry
    pub fn builtin() -> Result<Self> {
        let mut loader = Self {
            settings: Settings::default(),
        };
        loader.load_builtin_defaults()?;
        Ok(loader)
    }

    fn load_builtin_defaults(&mut self) -> Result<()> {
        let defaults = include_str!("../../providers.json");
        let settings: Settings = serde_json::from_str(defaults).map_err(|e| {
            LlmrouteError::Config(format!("Failed to parse built-in providers.json: {}", e))
        })?;

        self.merge(settings);
        Ok(())
    }

    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config file");
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Config paths in increasing priority
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".llmroute").join("llmroute.json"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("llmroute").join("llmroute.json"));
        }

        paths.push(PathBuf::from("llmroute.json"));

        if let Ok(custom_path) = std::env::var("LLMROUTE_CONFIG_PATH") {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LlmrouteError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            LlmrouteError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        self.merge(settings);
        Ok(())
    }

    /// Merge another config into this one (later configs override earlier)
    fn merge(&mut self, other: Settings) {
        self.settings.providers.extend(other.providers);

        if other.llm.is_some() {
            self.settings.llm = other.llm;
        }
    }

    /// Get the loaded configuration
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The routing config from the loaded files, or the defaults
    pub fn llm_config(&self) -> LlmConfig {
        self.settings.llm.clone().unwrap_or_default()
    }
}
