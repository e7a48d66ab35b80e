use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::provider::{ChatRequest, LlmProvider, ProviderError};

/// Central agent runtime: the single `query(prompt) -> text` entry point.
///
/// Stateless from the backend's point of view. Every call carries the full
/// prompt, and conversation context is assembled by the caller.
pub struct AgentRuntime {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LlmProvider>, model: String, max_tokens: u32) -> Self {
        Self {
            provider,
            model,
            max_tokens,
        }
    }

    /// Send `prompt` as a single user turn and return the generated text.
    pub async fn query(&self, prompt: &str) -> Result<String, ProviderError> {
        let req = ChatRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: self.max_tokens,
        };
        info!(model = %req.model, provider = %self.provider.name(), "processing query");

        let started = Instant::now();
        let resp = self.provider.send(&req).await?;
        debug!(
            latency_ms = started.elapsed().as_millis() as u64,
            tokens_in = resp.tokens_in,
            tokens_out = resp.tokens_out,
            stop_reason = %resp.stop_reason,
            "query completed"
        );
        Ok(resp.content)
    }
}
