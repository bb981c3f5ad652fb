//! Runtime configuration.
//!
//! Settings merge three layers, lowest precedence first: built-in
//! defaults, an optional TOML file at `<config dir>/errand/config.toml`,
//! and environment variables. Secrets (`OPENAI_API_KEY`,
//! `TODOIST_API_TOKEN`) come from the environment only and are required.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dialogue::{DEFAULT_MAX_ROUNDS, DEFAULT_SYSTEM_PROMPT, HistoryMode};
use crate::error::ErrandError;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default Todoist REST API base URL.
pub const DEFAULT_TODOIST_BASE_URL: &str = "https://api.todoist.com/rest/v2";

/// Optional fields as they appear in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileSettings {
    model: Option<String>,
    openai_base_url: Option<String>,
    todoist_base_url: Option<String>,
    max_rounds: Option<u32>,
    system_prompt: Option<String>,
    /// `"persistent"` or `"stateless"`.
    history: Option<String>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API key, from `OPENAI_API_KEY`.
    pub openai_api_key: String,
    /// Todoist API token, from `TODOIST_API_TOKEN`.
    pub todoist_api_token: String,
    /// Chat model identifier.
    pub model: String,
    /// OpenAI-compatible API base URL.
    pub openai_base_url: String,
    /// Todoist REST API base URL.
    pub todoist_base_url: String,
    /// Maximum model round-trips per utterance.
    pub max_rounds: u32,
    /// System framing for the assistant.
    pub system_prompt: String,
    /// History lifecycle across utterances.
    pub history: HistoryMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            todoist_api_token: String::new(),
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            todoist_base_url: DEFAULT_TODOIST_BASE_URL.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history: HistoryMode::Persistent,
        }
    }
}

impl Settings {
    /// Resolve settings from the default config file location and the
    /// environment. Fails if either secret is missing.
    pub fn load() -> Result<Self, ErrandError> {
        let mut settings = match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env();
        settings.require_secrets()?;
        Ok(settings)
    }

    /// Resolve settings from a specific config file, with defaults for
    /// anything the file omits. Secrets are not checked here.
    pub fn from_file(path: &Path) -> Result<Self, ErrandError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ErrandError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        let file: FileSettings = toml::from_str(&raw).map_err(|e| {
            ErrandError::ConfigError(format!("invalid config {}: {e}", path.display()))
        })?;

        let mut settings = Self::default();
        if let Some(model) = file.model {
            settings.model = model;
        }
        if let Some(url) = file.openai_base_url {
            settings.openai_base_url = url;
        }
        if let Some(url) = file.todoist_base_url {
            settings.todoist_base_url = url;
        }
        if let Some(prompt) = file.system_prompt {
            settings.system_prompt = prompt;
        }
        match file.max_rounds {
            None => {}
            Some(0) => {
                return Err(ErrandError::ConfigError(
                    "max_rounds must be at least 1".to_string(),
                ));
            }
            Some(n) => settings.max_rounds = n,
        }
        match file.history.as_deref() {
            None => {}
            Some("persistent") => settings.history = HistoryMode::Persistent,
            Some("stateless") => settings.history = HistoryMode::Stateless,
            Some(other) => {
                return Err(ErrandError::ConfigError(format!(
                    "invalid history mode '{other}', expected 'persistent' or 'stateless'"
                )));
            }
        }
        Ok(settings)
    }

    /// Default config file location: `<config dir>/errand/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("errand").join("config.toml"))
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = key;
        }
        if let Ok(token) = std::env::var("TODOIST_API_TOKEN") {
            self.todoist_api_token = token;
        }
        if let Ok(model) = std::env::var("ERRAND_MODEL") {
            self.model = model;
        }
        if let Ok(url) = std::env::var("ERRAND_OPENAI_BASE_URL") {
            self.openai_base_url = url;
        }
        if let Ok(url) = std::env::var("ERRAND_TODOIST_BASE_URL") {
            self.todoist_base_url = url;
        }
    }

    fn require_secrets(&self) -> Result<(), ErrandError> {
        if self.openai_api_key.is_empty() {
            return Err(ErrandError::AuthError(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }
        if self.todoist_api_token.is_empty() {
            return Err(ErrandError::AuthError(
                "TODOIST_API_TOKEN is not set".to_string(),
            ));
        }
        Ok(())
    }
}
