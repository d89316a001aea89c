use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::persona::DEFAULT_SYSTEM_INSTRUCTION;

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default completion model.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";

/// Top-level configuration for the StudyBot service.
///
/// Loaded from `~/.studybot/config.toml` by default, then overlaid with
/// environment variables (see [`StudyBotConfig::apply_env_overrides`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyBotConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl StudyBotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StudyBotConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay values from the process environment.
    ///
    /// Returns the variables that were set but could not be applied. This
    /// usually runs before logging is initialized, so reporting them is left
    /// to the caller.
    #[must_use]
    pub fn apply_env_overrides(&mut self) -> Vec<RejectedOverride> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Recognized keys: `STUDYBOT_API_KEY` (falling back to `GROQ_API_KEY`),
    /// `STUDYBOT_DATABASE_URL`, `STUDYBOT_MODEL`, `STUDYBOT_BASE_URL`,
    /// `STUDYBOT_HOST`, `STUDYBOT_PORT`. Empty values are ignored. A port
    /// that does not parse is left unapplied and returned.
    #[must_use]
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Vec<RejectedOverride>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut rejected = Vec::new();

        if let Some(key) = get("STUDYBOT_API_KEY").or_else(|| get("GROQ_API_KEY")) {
            self.provider.api_key = Some(key);
        }
        if let Some(url) = get("STUDYBOT_DATABASE_URL") {
            self.storage.database_url = url;
        }
        if let Some(model) = get("STUDYBOT_MODEL") {
            self.provider.model = model;
        }
        if let Some(base_url) = get("STUDYBOT_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(host) = get("STUDYBOT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("STUDYBOT_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(e) => rejected.push(RejectedOverride {
                    key: "STUDYBOT_PORT",
                    value: port,
                    reason: e.to_string(),
                }),
            }
        }
        rejected
    }
}

/// An override variable that was set but not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
        }
    }
}

/// History store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite location: a file path (optionally `sqlite://`-prefixed) or
    /// `:memory:`.
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "~/.studybot/studybot.db".to_string(),
        }
    }
}

/// Completion provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer credential. Usually supplied through the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Whole-request timeout in seconds. 0 disables the timeout.
    pub timeout_secs: u64,
    /// Sampling temperature. Provider default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: None,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Prompt construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Persona and behavior rules, sent verbatim as the system message.
    pub system_instruction: String,
    /// Only the most recent N history turns go into the prompt. Unset means
    /// the full history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history_turns: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            max_history_turns: None,
        }
    }
}
