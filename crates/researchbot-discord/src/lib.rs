pub mod adapter;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod handler;
pub mod send;
pub mod store;

pub use adapter::DiscordAdapter;
pub use dispatch::{Dispatcher, InboundMessage};
pub use error::DiscordError;
pub use send::{Outbound, SerenityOutbound};
pub use store::ConversationStore;
