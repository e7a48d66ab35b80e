use std::sync::Arc;

use serenity::all::ActivityData;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::user::OnlineStatus;
use serenity::prelude::{Context, EventHandler};
use tracing::info;

use researchbot_core::config::DiscordConfig;

use crate::dispatch::{Dispatcher, InboundMessage};

/// Serenity event handler wired to the dispatcher.
pub struct DiscordHandler {
    pub dispatcher: Arc<Dispatcher>,
    pub config: DiscordConfig,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.dispatcher.set_bot_user_id(ready.user.id.to_string());

        let status = parse_online_status(&self.config.status);
        let activity = build_activity(&self.config);
        ctx.set_presence(activity, status);

        info!(name = %ready.user.name, id = %ready.user.id, "Discord bot connected");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let inbound = InboundMessage::from(&msg);

        // Each message runs on its own task so a slow model call only holds
        // up its own reply.
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.handle(inbound).await;
        });
    }
}

/// Parse a config status string into serenity's `OnlineStatus`.
fn parse_online_status(s: &str) -> OnlineStatus {
    match s.to_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" | "do_not_disturb" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        _ => OnlineStatus::Online,
    }
}

/// Build an `ActivityData` from the Discord config. Empty name means none.
fn build_activity(config: &DiscordConfig) -> Option<ActivityData> {
    let name = config.activity_name.as_str();
    if name.is_empty() {
        return None;
    }
    Some(match config.activity_type.to_lowercase().as_str() {
        "listening" => ActivityData::listening(name),
        "playing" => ActivityData::playing(name),
        "competing" => ActivityData::competing(name),
        "custom" => ActivityData::custom(name),
        _ => ActivityData::watching(name),
    })
}
