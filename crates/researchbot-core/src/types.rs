use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a conversation context on the chat platform.
///
/// Discord snowflakes are kept as strings so the core never depends on the
/// platform's id types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey(pub String);

impl ChannelKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChannelKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for ChannelKey {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One message remembered in a channel's rolling history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    /// Build an entry stamped with the current time.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// `author: content`, the line format used when entries are fed to the model.
    pub fn as_transcript_line(&self) -> String {
        format!("{}: {}", self.author, self.content)
    }
}
