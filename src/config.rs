//! Bot configuration.

use crate::coordinator::TimerSettings;
use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the bot process.
///
/// Loaded from a TOML file with serde defaults for every field; API keys
/// come from the environment at client-construction time and are never
/// stored in the file.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct BotConfig {
    /// LLM provider for the chat feature.
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// Model name (e.g. "gemini-2.0-flash", "gpt-4o-mini").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for chat replies.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Root directory for per-user conversation logs.
    #[serde(default = "default_log_dir")]
    log_dir: String,

    /// Per-move budget in seconds.
    #[serde(default = "default_turn_limit_secs")]
    turn_limit_secs: u64,

    /// Rematch/cancel prompt lifetime in seconds.
    #[serde(default = "default_follow_up_expiry_secs")]
    follow_up_expiry_secs: u64,

    /// Overall session inactivity ceiling in seconds.
    #[serde(default = "default_session_ceiling_secs")]
    session_ceiling_secs: u64,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_turn_limit_secs() -> u64 {
    30
}

fn default_follow_up_expiry_secs() -> u64 {
    300
}

fn default_session_ceiling_secs() -> u64 {
    1800
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            log_dir: default_log_dir(),
            turn_limit_secs: default_turn_limit_secs(),
            follow_up_expiry_secs: default_follow_up_expiry_secs(),
            session_ceiling_secs: default_session_ceiling_secs(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {e}")))?;

        info!(model = %config.llm_model, "Config loaded");
        Ok(config)
    }

    /// Builds the timer policy for the game coordinator.
    pub fn timers(&self) -> TimerSettings {
        TimerSettings::new(
            Duration::from_secs(self.turn_limit_secs),
            Duration::from_secs(self.follow_up_expiry_secs),
            Duration::from_secs(self.session_ceiling_secs),
        )
    }

    /// Creates the completion-client configuration.
    ///
    /// Requires `OPENAI_API_KEY` or `GEMINI_API_KEY` in the environment,
    /// matching the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the key variable is unset.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let api_key = match self.llm_provider {
            LlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ConfigError::new("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            LlmProvider::Gemini => std::env::var("GEMINI_API_KEY").map_err(|_| {
                ConfigError::new("GEMINI_API_KEY environment variable not set".to_string())
            })?,
        };

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        ))
    }

    /// Reads the OpenWeather API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `OPENWEATHER_API_KEY` is unset.
    pub fn openweather_api_key(&self) -> Result<String, ConfigError> {
        std::env::var("OPENWEATHER_API_KEY").map_err(|_| {
            ConfigError::new("OPENWEATHER_API_KEY environment variable not set".to_string())
        })
    }

    /// Reads the Hugging Face API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `HUGGINGFACE_API_KEY` is unset.
    pub fn huggingface_api_key(&self) -> Result<String, ConfigError> {
        std::env::var("HUGGINGFACE_API_KEY").map_err(|_| {
            ConfigError::new("HUGGINGFACE_API_KEY environment variable not set".to_string())
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error was created.
    pub line: u32,
    /// Source file where the error was created.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
