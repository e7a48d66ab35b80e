// End-to-end dispatcher behaviour through the public API, with a scripted
// model backend and a recording outbound channel.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use researchbot_agent::provider::{ChatRequest, ChatResponse, LlmProvider};
use researchbot_agent::{AgentRuntime, ProviderError};
use researchbot_core::config::DispatchConfig;
use researchbot_core::{ChannelKey, ConversationEntry};
use researchbot_discord::commands::{Command, UNKNOWN_COMMAND};
use researchbot_discord::dispatch::{Dispatcher, InboundMessage, CHAT_FALLBACK};
use researchbot_discord::error::DiscordError;
use researchbot_discord::format::continuation_prefix;
use researchbot_discord::send::Outbound;

/// Records every prompt and answers from a fixed script.
struct ScriptedModel {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn ok(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.prompts.lock().unwrap().push(req.prompt.clone());
        match &self.reply {
            Ok(text) => Ok(ChatResponse {
                content: text.clone(),
                model: req.model.clone(),
                tokens_in: 0,
                tokens_out: 0,
                stop_reason: "stop".to_string(),
            }),
            Err(message) => Err(ProviderError::Unavailable(message.clone())),
        }
    }
}

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(String, String)>>,
}

impl Recorder {
    fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl Outbound for Recorder {
    async fn send(&self, channel: &ChannelKey, text: &str) -> Result<(), DiscordError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

struct Harness {
    model: Arc<ScriptedModel>,
    out: Arc<Recorder>,
    dispatcher: Dispatcher,
}

fn harness(model: Arc<ScriptedModel>) -> Harness {
    let out = Arc::new(Recorder::default());
    let agent = AgentRuntime::new(model.clone(), "test-model".to_string(), 256);
    let config = DispatchConfig {
        report_chunk_delay_ms: 0,
        ..DispatchConfig::default()
    };
    let dispatcher = Dispatcher::new(Arc::new(agent), out.clone(), config);
    Harness {
        model,
        out,
        dispatcher,
    }
}

fn user_msg(author: &str, content: &str) -> InboundMessage {
    InboundMessage {
        author_id: format!("id-{author}"),
        author_name: author.to_string(),
        is_bot: false,
        content: content.to_string(),
        channel: ChannelKey::from("1001"),
    }
}

fn channel() -> ChannelKey {
    ChannelKey::from("1001")
}

/// Record history directly, as if earlier messages had been handled.
fn seed(dispatcher: &Dispatcher, author: &str, content: &str) {
    dispatcher
        .store()
        .record(&channel(), ConversationEntry::new(author, content));
}

#[tokio::test]
async fn bot_authors_are_ignored_entirely() {
    let h = harness(ScriptedModel::ok("hi"));
    let mut msg = user_msg("otherbot", "!research anything");
    msg.is_bot = true;

    h.dispatcher.handle(msg).await;

    assert!(h.out.texts().is_empty());
    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.dispatcher.store().len(&channel()), 0);
}

#[tokio::test]
async fn self_messages_are_ignored_entirely() {
    let h = harness(ScriptedModel::ok("hi"));
    h.dispatcher.set_bot_user_id("id-me");

    h.dispatcher.handle(user_msg("me", "hello")).await;

    assert!(h.out.texts().is_empty());
    assert_eq!(h.dispatcher.store().len(&channel()), 0);
}

#[tokio::test]
async fn every_user_message_is_recorded() {
    let h = harness(ScriptedModel::ok("reply"));
    h.dispatcher.handle(user_msg("alice", "hello")).await;
    h.dispatcher.handle(user_msg("alice", "!help")).await;
    h.dispatcher.handle(user_msg("alice", "!nope")).await;

    let log: Vec<String> = h
        .dispatcher
        .store()
        .recent(&channel(), 10)
        .into_iter()
        .map(|e| e.content)
        .collect();
    assert_eq!(log, ["hello", "!help", "!nope"]);
}

#[tokio::test]
async fn history_is_capped_at_ten() {
    let h = harness(ScriptedModel::ok("reply"));
    for n in 0..15 {
        h.dispatcher.handle(user_msg("alice", &format!("msg {n}"))).await;
    }
    let log = h.dispatcher.store().recent(&channel(), 10);
    assert_eq!(log.len(), 10);
    assert_eq!(log[0].content, "msg 5");
    assert_eq!(log[9].content, "msg 14");
}

#[tokio::test]
async fn research_without_topic_sends_only_usage() {
    let h = harness(ScriptedModel::ok("never"));
    h.dispatcher.handle(user_msg("alice", "!research")).await;

    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.out.texts(), [Command::Research.usage()]);
}

#[tokio::test]
async fn analyze_and_report_without_topic_send_only_usage() {
    let h = harness(ScriptedModel::ok("never"));
    h.dispatcher.handle(user_msg("alice", "!analyze")).await;
    h.dispatcher.handle(user_msg("alice", "!report   ")).await;

    assert_eq!(h.model.calls(), 0);
    assert_eq!(
        h.out.texts(),
        [Command::Analyze.usage(), Command::Report.usage()]
    );
}

#[tokio::test]
async fn research_acks_then_sends_decorated_report() {
    let h = harness(ScriptedModel::ok("Fusion is hard."));
    h.dispatcher
        .handle(user_msg("alice", "!Research fusion power"))
        .await;

    assert_eq!(h.model.calls(), 1);
    assert!(h.model.last_prompt().contains("Conduct thorough research on: fusion power"));

    let sent = h.out.texts();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("**Researching:** fusion power"));
    assert!(sent[1].contains("**Research Report: fusion power**"));
    assert!(sent[1].contains("Fusion is hard."));
}

#[tokio::test]
async fn long_research_is_chunked_with_continuation_headers() {
    let body = "x".repeat(5000);
    let h = harness(ScriptedModel::ok(body.clone()));
    h.dispatcher.handle(user_msg("alice", "!research big")).await;

    let sent = h.out.texts();
    let chunks = &sent[1..];
    let total = chunks.len();

    let rebuilt: String = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.clone()
            } else {
                c.strip_prefix(&continuation_prefix(i + 1, total))
                    .expect("continuation header")
                    .to_string()
            }
        })
        .collect();

    let formatted_len = rebuilt.chars().count();
    assert!(formatted_len > 2000);
    assert_eq!(total, formatted_len.div_ceil(1900));
    assert!(rebuilt.contains(&body));
    assert!(rebuilt.starts_with("\u{1f4ca} **Research Report: big**"));
}

#[tokio::test]
async fn long_report_is_chunked_without_headers() {
    let body = "y".repeat(4500);
    let h = harness(ScriptedModel::ok(body.clone()));
    h.dispatcher.handle(user_msg("alice", "!report markets")).await;

    let sent = h.out.texts();
    assert!(sent[0].contains("**Generating Report:** markets"));
    let chunks = &sent[1..];
    assert!(chunks.len() >= 3);
    assert!(chunks.iter().all(|c| !c.starts_with("**Continued")));

    let rebuilt = chunks.concat();
    assert_eq!(chunks.len(), rebuilt.chars().count().div_ceil(1900));
    assert!(rebuilt.contains(&body));
    assert!(rebuilt.contains("**Topic:** markets"));
}

#[tokio::test]
async fn long_analysis_is_chunked_plain() {
    let body = "a".repeat(4200);
    let h = harness(ScriptedModel::ok(body.clone()));
    h.dispatcher.handle(user_msg("alice", "!analyze grid load")).await;

    let sent = h.out.texts();
    assert!(sent[0].contains("**Analyzing:** grid load"));
    let chunks = &sent[1..];
    assert!(chunks.iter().all(|c| c.chars().count() <= 1900));
    assert!(chunks.iter().all(|c| !c.starts_with("**Continued")));

    let rebuilt = chunks.concat();
    assert_eq!(chunks.len(), rebuilt.chars().count().div_ceil(1900));
    assert!(rebuilt.starts_with("\u{1f4ca} **Analysis Report**"));
    assert!(rebuilt.ends_with(&body));
}

#[tokio::test]
async fn long_chat_reply_is_chunked_plain() {
    let reply = "c".repeat(4500);
    let h = harness(ScriptedModel::ok(reply.clone()));
    h.dispatcher.handle(user_msg("alice", "tell me everything")).await;

    let sent = h.out.texts();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|c| c.chars().count() <= 1900));
    assert!(sent.iter().all(|c| !c.starts_with("**Continued")));
    assert_eq!(sent.concat(), reply);
}

#[tokio::test]
async fn summarize_without_text_needs_two_entries() {
    let h = harness(ScriptedModel::ok("summary"));
    // the command itself is the only recorded entry
    h.dispatcher.handle(user_msg("alice", "!summarize")).await;

    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.out.texts(), [Command::Summarize.usage()]);
}

#[tokio::test]
async fn summarize_without_text_uses_last_five_entries() {
    let h = harness(ScriptedModel::ok("summary"));
    for n in 1..=6 {
        seed(&h.dispatcher, &format!("user{n}"), &format!("line {n}"));
    }
    h.dispatcher.handle(user_msg("alice", "!summarize")).await;

    assert_eq!(h.model.calls(), 1);
    let prompt = h.model.last_prompt();
    let expected = "Summarize this conversation concisely:\n\
                    user3: line 3\nuser4: line 4\nuser5: line 5\nuser6: line 6\nalice: !summarize";
    assert_eq!(prompt, expected);

    let sent = h.out.texts();
    assert_eq!(sent[0], "\u{1f4dd} **Summarizing...**");
    assert!(sent[1].starts_with("\u{1f4c4} **Summary**"));
}

#[tokio::test]
async fn summarize_with_text_summarizes_that_text() {
    let h = harness(ScriptedModel::ok("short"));
    h.dispatcher
        .handle(user_msg("alice", "!summarize a very long article"))
        .await;

    assert_eq!(
        h.model.last_prompt(),
        "Provide a concise, well-structured summary of: a very long article"
    );
}

#[tokio::test]
async fn unknown_command_gets_one_notice_and_no_model_call() {
    let h = harness(ScriptedModel::ok("never"));
    h.dispatcher.handle(user_msg("alice", "!foo bar")).await;

    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.out.texts(), [UNKNOWN_COMMAND]);
}

#[tokio::test]
async fn model_failure_in_command_sends_one_failure_notice() {
    for (content, action) in [
        ("!research ai", "Research"),
        ("!analyze ai", "Analysis"),
        ("!summarize ai", "Summarization"),
        ("!report ai", "Report generation"),
    ] {
        let h = harness(ScriptedModel::failing("backend down"));
        h.dispatcher.handle(user_msg("alice", content)).await;

        let sent = h.out.texts();
        let failures: Vec<&String> = sent.iter().filter(|t| t.contains("failed:")).collect();
        assert_eq!(failures.len(), 1, "{content}");
        assert_eq!(
            failures[0],
            &format!("\u{274c} {action} failed: Provider unavailable: backend down")
        );
        assert_eq!(h.model.calls(), 1, "no retry for {content}");
    }
}

#[tokio::test]
async fn free_text_includes_last_three_entries_as_context() {
    let h = harness(ScriptedModel::ok("Happy to help."));
    h.dispatcher.handle(user_msg("alice", "one")).await;
    h.dispatcher.handle(user_msg("bob", "two")).await;
    h.dispatcher.handle(user_msg("alice", "three")).await;
    h.dispatcher.handle(user_msg("bob", "four")).await;

    let prompt = h.model.last_prompt();
    assert!(prompt.contains("Recent conversation:\nbob: two\nalice: three\nbob: four"));
    assert!(!prompt.contains("alice: one"));
    assert!(prompt.contains("User message: four"));
    assert_eq!(h.out.texts().last().map(String::as_str), Some("Happy to help."));
}

#[tokio::test]
async fn free_text_model_failure_sends_fallback() {
    let h = harness(ScriptedModel::failing("timeout"));
    h.dispatcher.handle(user_msg("alice", "hello?")).await;

    assert_eq!(h.out.texts(), [CHAT_FALLBACK]);
}

#[tokio::test]
async fn replies_go_to_the_originating_channel() {
    let h = harness(ScriptedModel::ok("pong"));
    let mut msg = user_msg("alice", "ping");
    msg.channel = ChannelKey::from("777");
    h.dispatcher.handle(msg).await;

    let sent = h.out.sent.lock().unwrap();
    assert_eq!(sent.as_slice(), [("777".to_string(), "pong".to_string())]);
}
