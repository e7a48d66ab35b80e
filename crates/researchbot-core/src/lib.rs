pub mod config;
pub mod error;
pub mod types;

pub use error::{BotError, Result};
pub use types::{ChannelKey, ConversationEntry};
