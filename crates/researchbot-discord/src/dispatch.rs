//! Message dispatcher: bot filter, history bookkeeping, command routing and
//! the free-text chat path.
//!
//! `handle` never fails. Every path ends in a best-effort reply to the
//! originating channel plus a log line.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{debug, error, info, warn};

use researchbot_agent::prompt;
use researchbot_agent::{AgentRuntime, ProviderError};
use researchbot_core::config::DispatchConfig;
use researchbot_core::{ChannelKey, ConversationEntry};

use crate::commands::{self, Command, HELP_TEXT, UNKNOWN_COMMAND};
use crate::error::DiscordError;
use crate::format::{self, ChunkStyle, ReportKind};
use crate::send::{self, Outbound};
use crate::store::ConversationStore;

/// Sent when the free-text model call fails.
pub const CHAT_FALLBACK: &str =
    "I'm having trouble processing that. Try using one of my research commands: !help";

/// Sent when anything else goes wrong while handling a message.
pub const GENERIC_ERROR: &str =
    "\u{274c} Sorry, I encountered an error processing your request. Please try again.";

/// A received chat message, already stripped of platform types.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: String,
    pub author_name: String,
    pub is_bot: bool,
    pub content: String,
    pub channel: ChannelKey,
}

impl From<&serenity::model::channel::Message> for InboundMessage {
    fn from(msg: &serenity::model::channel::Message) -> Self {
        Self {
            author_id: msg.author.id.to_string(),
            author_name: msg.author.name.clone(),
            is_bot: msg.author.bot,
            content: msg.content.clone(),
            channel: ChannelKey::from(msg.channel_id.get()),
        }
    }
}

/// What a command resolves to before any model call.
enum Plan {
    /// Answer immediately, no model involved.
    Reply(String),
    /// Acknowledge, query the model, decorate the answer.
    Query {
        prompt: String,
        kind: ReportKind,
        topic: String,
    },
}

pub struct Dispatcher {
    agent: Arc<AgentRuntime>,
    outbound: Arc<dyn Outbound>,
    store: ConversationStore,
    config: DispatchConfig,
    bot_user_id: OnceLock<String>,
}

impl Dispatcher {
    pub fn new(
        agent: Arc<AgentRuntime>,
        outbound: Arc<dyn Outbound>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            agent,
            outbound,
            store: ConversationStore::new(config.history_limit, config.max_channels),
            config,
            bot_user_id: OnceLock::new(),
        }
    }

    /// Remember our own user id so our messages are never answered.
    /// Only the first call takes effect.
    pub fn set_bot_user_id(&self, id: impl Into<String>) {
        self.bot_user_id.set(id.into()).ok();
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Process one inbound message to completion.
    pub async fn handle(&self, msg: InboundMessage) {
        if msg.is_bot || self.is_self(&msg.author_id) {
            debug!(author = %msg.author_name, channel = %msg.channel, "ignoring bot message");
            return;
        }

        info!(author = %msg.author_name, channel = %msg.channel, content = %msg.content, "message received");

        self.store.record(
            &msg.channel,
            ConversationEntry::new(msg.author_name.clone(), msg.content.clone()),
        );

        let outcome = AssertUnwindSafe(self.dispatch(&msg)).catch_unwind().await;
        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "handler panicked".to_string(),
        };

        error!(channel = %msg.channel, error = %failure, "error processing message");
        if let Err(e) = self.outbound.send(&msg.channel, GENERIC_ERROR).await {
            warn!(channel = %msg.channel, error = %e, "failed to deliver error notice");
        }
    }

    fn is_self(&self, author_id: &str) -> bool {
        self.bot_user_id.get().is_some_and(|id| id == author_id)
    }

    async fn dispatch(&self, msg: &InboundMessage) -> Result<(), DiscordError> {
        match commands::parse(&msg.content) {
            Some((token, query)) => match Command::lookup(&token) {
                Some(command) => self.run_command(command, &msg.channel, query).await,
                None => {
                    debug!(token = %token, "unknown command");
                    self.outbound.send(&msg.channel, UNKNOWN_COMMAND).await
                }
            },
            None => self.chat(msg).await,
        }
    }

    fn plan(&self, command: Command, channel: &ChannelKey, query: &str) -> Plan {
        let query_plan = |prompt: String, kind: ReportKind| Plan::Query {
            prompt,
            kind,
            topic: query.to_string(),
        };

        match command {
            Command::Help => Plan::Reply(HELP_TEXT.to_string()),
            Command::Research if query.is_empty() => Plan::Reply(command.usage().to_string()),
            Command::Research => query_plan(prompt::research(query), ReportKind::Research),
            Command::Analyze if query.is_empty() => Plan::Reply(command.usage().to_string()),
            Command::Analyze => query_plan(prompt::analysis(query), ReportKind::Analysis),
            Command::Report if query.is_empty() => Plan::Reply(command.usage().to_string()),
            Command::Report => query_plan(prompt::report(query), ReportKind::Report),
            Command::Summarize if query.is_empty() => {
                let recent = self.store.recent(channel, self.config.summary_messages);
                if recent.len() < 2 {
                    Plan::Reply(command.usage().to_string())
                } else {
                    query_plan(prompt::conversation_summary(&recent), ReportKind::Summary)
                }
            }
            Command::Summarize => query_plan(prompt::summary(query), ReportKind::Summary),
        }
    }

    async fn run_command(
        &self,
        command: Command,
        channel: &ChannelKey,
        query: &str,
    ) -> Result<(), DiscordError> {
        let (prompt, kind, topic) = match self.plan(command, channel, query) {
            Plan::Reply(text) => return self.outbound.send(channel, &text).await,
            Plan::Query {
                prompt,
                kind,
                topic,
            } => (prompt, kind, topic),
        };

        self.outbound
            .send(channel, &command.working_notice(query))
            .await?;

        match self.agent.query(&prompt).await {
            Ok(body) => {
                let text = format::format(kind, &topic, &body);
                send::send_chunked(
                    self.outbound.as_ref(),
                    channel,
                    &text,
                    kind.chunk_style(),
                    self.report_delay(),
                )
                .await
            }
            Err(e) => self.command_failed(command, channel, &e).await,
        }
    }

    async fn command_failed(
        &self,
        command: Command,
        channel: &ChannelKey,
        err: &ProviderError,
    ) -> Result<(), DiscordError> {
        warn!(command = command.token(), channel = %channel, error = %err, "model call failed");
        let notice = format!("\u{274c} {} failed: {}", command.action(), err);
        self.outbound.send(channel, &notice).await
    }

    /// Free text: answer with recent channel context, never leave the user
    /// without a reply.
    async fn chat(&self, msg: &InboundMessage) -> Result<(), DiscordError> {
        let context = self.store.recent(&msg.channel, self.config.context_messages);
        let prompt = prompt::assistant(&context, &msg.content);

        match self.agent.query(&prompt).await {
            Ok(reply) => {
                send::send_chunked(
                    self.outbound.as_ref(),
                    &msg.channel,
                    &reply,
                    ChunkStyle::Plain,
                    Duration::ZERO,
                )
                .await
            }
            Err(e) => {
                warn!(channel = %msg.channel, error = %e, "chat model call failed");
                self.outbound.send(&msg.channel, CHAT_FALLBACK).await
            }
        }
    }

    fn report_delay(&self) -> Duration {
        Duration::from_millis(self.config.report_chunk_delay_ms)
    }
}
