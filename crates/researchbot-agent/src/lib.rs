pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod runtime;

pub use provider::{LlmProvider, ProviderError};
pub use runtime::AgentRuntime;
