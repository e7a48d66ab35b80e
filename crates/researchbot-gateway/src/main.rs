use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use researchbot_agent::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};
use researchbot_agent::AgentRuntime;
use researchbot_core::config::{BotConfig, DiscordConfig, ProviderConfig, ProviderKind};
use researchbot_discord::{DiscordAdapter, Dispatcher, SerenityOutbound};

mod app;
mod http;

#[derive(Debug, Parser)]
#[command(name = "researchbot-gateway", version, about = "Discord research assistant bot")]
struct Args {
    /// Path to researchbot.toml (default: ~/.researchbot/researchbot.toml)
    #[arg(long, env = "RESEARCHBOT_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "researchbot_gateway=info,researchbot_discord=info,tower_http=debug".into()
            }),
        )
        .init();

    let args = Args::parse();

    // load config: --config > RESEARCHBOT_CONFIG env > ~/.researchbot/researchbot.toml
    let mut config = BotConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        BotConfig::default()
    });

    // hosted platforms hand out the port through PORT
    let port = resolve_port(config.http.port, std::env::var("PORT").ok());

    let provider = build_provider(&config.provider, std::env::var("OPENAI_API_KEY").ok());
    let agent = Arc::new(AgentRuntime::new(
        provider,
        config.provider.model.clone(),
        config.provider.max_tokens,
    ));

    if config.discord.is_none() {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            info!("Discord token taken from DISCORD_TOKEN");
            config.discord = Some(DiscordConfig::from_token(token));
        }
    }

    // spawn Discord adapter if configured
    let dispatcher = match config.discord {
        Some(ref discord_cfg) => match SerenityOutbound::new(&discord_cfg.bot_token) {
            Ok(outbound) => {
                let dispatcher = Arc::new(Dispatcher::new(
                    Arc::clone(&agent),
                    Arc::new(outbound),
                    config.bot.clone(),
                ));
                let adapter = DiscordAdapter::new(discord_cfg, Arc::clone(&dispatcher));
                tokio::spawn(adapter.run());
                info!("Discord bot started");
                Some(dispatcher)
            }
            Err(e) => {
                warn!("Discord bot not started: {e}");
                None
            }
        },
        None => {
            warn!("No [discord] config and no DISCORD_TOKEN, serving HTTP only");
            None
        }
    };

    let state = Arc::new(app::AppState::new(dispatcher, config.provider.model.clone()));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.http.bind, port).parse()?;
    info!("researchbot gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// `PORT` wins over the configured port when it parses.
fn resolve_port(configured: u16, env_port: Option<String>) -> u16 {
    match env_port {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "ignoring unparsable PORT");
            configured
        }),
        None => configured,
    }
}

/// Build the LLM provider from config.
///
/// OpenAI-compatible endpoints need a key, from `[provider] api_key` or the
/// `OPENAI_API_KEY` env var. Without one the bot still runs and every model
/// call fails with a readable notice.
fn build_provider(config: &ProviderConfig, env_api_key: Option<String>) -> Arc<dyn LlmProvider> {
    match config.kind {
        ProviderKind::Openai => match config.api_key.clone().or(env_api_key) {
            Some(key) => {
                info!(
                    "LLM provider: OpenAI-compatible ({})",
                    config.base_url.as_deref().unwrap_or("api.openai.com")
                );
                Arc::new(researchbot_agent::openai::OpenAiProvider::new(
                    key,
                    config.base_url.clone(),
                ))
            }
            None => {
                warn!("No LLM API key configured, model calls will return errors");
                Arc::new(NullProvider)
            }
        },
        ProviderKind::Ollama => {
            info!(
                "LLM provider: Ollama ({})",
                config.base_url.as_deref().unwrap_or("localhost")
            );
            Arc::new(researchbot_agent::ollama::OllamaProvider::new(
                config.base_url.clone(),
            ))
        }
    }
}

/// Placeholder provider when no API key is available.
struct NullProvider;

#[async_trait::async_trait]
impl LlmProvider for NullProvider {
    fn name(&self) -> &str {
        "null"
    }
    async fn send(&self, _req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        Err(ProviderError::Unavailable(
            "no LLM API key configured, set provider.api_key in researchbot.toml".into(),
        ))
    }
}
