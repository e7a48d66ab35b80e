use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HTTP_PORT: u16 = 10000;
pub const DEFAULT_HTTP_BIND: &str = "0.0.0.0";
/// Discord rejects messages longer than this many characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Chunk size used once a message has to be split.
pub const DISCORD_CHUNK_SIZE: usize = 1900;

/// Top-level config (researchbot.toml + RESEARCHBOT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub discord: Option<DiscordConfig>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub bot: DispatchConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            discord: None,
            provider: ProviderConfig::default(),
            bot: DispatchConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Presence status: online, idle, dnd, invisible.
    #[serde(default = "default_status")]
    pub status: String,
    /// Activity verb: playing, listening, watching, competing, custom.
    #[serde(default = "default_activity_type")]
    pub activity_type: String,
    #[serde(default = "default_activity_name")]
    pub activity_name: String,
}

impl DiscordConfig {
    /// Config with default presence, for a token that came from outside the file.
    pub fn from_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            status: default_status(),
            activity_type: default_activity_type(),
            activity_name: default_activity_name(),
        }
    }
}

/// Which backend answers `query(prompt)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Any OpenAI-compatible `/v1/chat/completions` endpoint.
    #[default]
    Openai,
    /// Local Ollama server (`/api/chat`).
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// Required for `openai`; ignored by `ollama`.
    pub api_key: Option<String>,
    /// Defaults per kind when unset.
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            api_key: None,
            base_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Tunables for the dispatcher and its conversation store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Entries kept per channel.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Entries embedded as context for free-text messages.
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,
    /// Entries fed to `!summarize` when called without text.
    #[serde(default = "default_summary_messages")]
    pub summary_messages: usize,
    /// Pause between `!report` chunks.
    #[serde(default = "default_report_chunk_delay_ms")]
    pub report_chunk_delay_ms: u64,
    /// Distinct channels tracked before the least recently active one is evicted.
    #[serde(default = "default_max_channels")]
    pub max_channels: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            context_messages: default_context_messages(),
            summary_messages: default_summary_messages(),
            report_chunk_delay_ms: default_report_chunk_delay_ms(),
            max_channels: default_max_channels(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_status() -> String {
    "online".to_string()
}
fn default_activity_type() -> String {
    "watching".to_string()
}
fn default_activity_name() -> String {
    "for research requests | !help".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_history_limit() -> usize {
    10
}
fn default_context_messages() -> usize {
    3
}
fn default_summary_messages() -> usize {
    5
}
fn default_report_chunk_delay_ms() -> u64 {
    1000
}
fn default_max_channels() -> usize {
    10_000
}
fn default_port() -> u16 {
    DEFAULT_HTTP_PORT
}
fn default_bind() -> String {
    DEFAULT_HTTP_BIND.to_string()
}

impl BotConfig {
    /// Load config from a TOML file with RESEARCHBOT_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `RESEARCHBOT_DISCORD__BOT_TOKEN` or `RESEARCHBOT_BOT__HISTORY_LIMIT`.
    /// A missing file is not an error; env vars alone are enough.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: BotConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RESEARCHBOT_").split("__"))
            .extract()
            .map_err(|e| crate::error::BotError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.researchbot/researchbot.toml", home)
}
