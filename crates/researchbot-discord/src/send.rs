use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;

use researchbot_core::ChannelKey;

use crate::error::DiscordError;
use crate::format::{self, ChunkStyle};

/// Outbound half of the gateway: deliver one message to one channel.
///
/// The dispatcher only ever talks to this trait, so tests can swap in a
/// recorder instead of a live Discord connection.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send(&self, channel: &ChannelKey, text: &str) -> Result<(), DiscordError>;
}

/// [`Outbound`] backed by Discord's REST API.
///
/// Holds its own `Http` client built from the bot token. REST calls do not
/// depend on the gateway WebSocket, so this keeps working across reconnects.
pub struct SerenityOutbound {
    http: Arc<Http>,
}

impl SerenityOutbound {
    pub fn new(bot_token: &str) -> Result<Self, DiscordError> {
        if bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            http: Arc::new(Http::new(bot_token)),
        })
    }
}

#[async_trait]
impl Outbound for SerenityOutbound {
    async fn send(&self, channel: &ChannelKey, text: &str) -> Result<(), DiscordError> {
        let channel_id = parse_channel_id(channel)?;
        channel_id.say(&self.http, text).await?;
        Ok(())
    }
}

fn parse_channel_id(channel: &ChannelKey) -> Result<ChannelId, DiscordError> {
    match channel.as_str().parse::<u64>() {
        Ok(id) if id != 0 => Ok(ChannelId::new(id)),
        _ => Err(DiscordError::InvalidChannel(channel.to_string())),
    }
}

/// Send `text` to `channel`, split to fit Discord's limit and laid out per
/// `style`. Chunks go out strictly in order, one send each; `Paced` waits
/// `delay` between consecutive chunks.
pub async fn send_chunked(
    out: &dyn Outbound,
    channel: &ChannelKey,
    text: &str,
    style: ChunkStyle,
    delay: Duration,
) -> Result<(), DiscordError> {
    let messages = format::discord_messages(text, style);
    let last = messages.len().saturating_sub(1);
    for (i, message) in messages.iter().enumerate() {
        out.send(channel, message).await?;
        if style == ChunkStyle::Paced && i < last && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    Ok(())
}
