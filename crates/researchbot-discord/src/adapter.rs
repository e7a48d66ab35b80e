use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use researchbot_core::config::DiscordConfig;

use crate::dispatch::Dispatcher;
use crate::handler::DiscordHandler;

/// Discord gateway adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process exits.
/// Reconnects whenever the gateway drops. The dispatcher (and with it the
/// conversation store) outlives every reconnect.
pub struct DiscordAdapter {
    dispatcher: Arc<Dispatcher>,
    config: DiscordConfig,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            config: config.clone(),
        }
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns.
    pub async fn run(self) {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = self.connect(intents, "initial connect").await;

        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;
            client = self.connect(intents, "reconnect").await;
        }
    }

    /// Build a client, retrying every 30s until it succeeds.
    async fn connect(&self, intents: GatewayIntents, phase: &str) -> Client {
        loop {
            match self.build_client(intents).await {
                Ok(c) => return c,
                Err(e) => {
                    error!("Discord: {phase} failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        }
    }

    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = DiscordHandler {
            dispatcher: Arc::clone(&self.dispatcher),
            config: self.config.clone(),
        };

        Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
    }
}
