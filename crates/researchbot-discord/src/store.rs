//! Per-channel rolling conversation history.
//!
//! Each channel keeps at most `history_limit` entries, oldest dropped first.
//! Whole channels are evicted by least recent activity once more than
//! `max_channels` are tracked, so a long-running bot seen in many channels
//! does not grow without bound.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use researchbot_core::{ChannelKey, ConversationEntry};

#[derive(Default)]
struct ChannelHistory {
    entries: VecDeque<ConversationEntry>,
    /// Value of the store's activity clock at the last `record`.
    last_active: u64,
}

/// In-memory conversation store, sharded by channel key.
///
/// Safe to share across tasks: writes for different channels land on
/// independent shards and no lock is held across an `.await`.
pub struct ConversationStore {
    channels: DashMap<ChannelKey, ChannelHistory>,
    clock: AtomicU64,
    history_limit: usize,
    /// 0 disables whole-channel eviction.
    max_channels: usize,
}

impl ConversationStore {
    pub fn new(history_limit: usize, max_channels: usize) -> Self {
        Self {
            channels: DashMap::new(),
            clock: AtomicU64::new(0),
            history_limit,
            max_channels,
        }
    }

    /// Append `entry` to the channel's history, then trim to the newest
    /// `history_limit` entries.
    pub fn record(&self, channel: &ChannelKey, entry: ConversationEntry) {
        if self.max_channels > 0
            && !self.channels.contains_key(channel)
            && self.channels.len() >= self.max_channels
        {
            self.evict_least_recent();
        }

        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let mut history = self.channels.entry(channel.clone()).or_default();
        history.entries.push_back(entry);
        while history.entries.len() > self.history_limit {
            history.entries.pop_front();
        }
        history.last_active = tick;
    }

    /// The last `n` entries for `channel` in chronological order.
    /// Unknown channels read as empty.
    pub fn recent(&self, channel: &ChannelKey, n: usize) -> Vec<ConversationEntry> {
        match self.channels.get(channel) {
            Some(history) => {
                let skip = history.entries.len().saturating_sub(n);
                history.entries.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Number of entries currently held for `channel`.
    pub fn len(&self, channel: &ChannelKey) -> usize {
        self.channels
            .get(channel)
            .map(|h| h.entries.len())
            .unwrap_or(0)
    }

    /// Number of distinct channels tracked.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn evict_least_recent(&self) {
        let oldest = self
            .channels
            .iter()
            .min_by_key(|item| item.value().last_active)
            .map(|item| item.key().clone());

        if let Some(key) = oldest {
            debug!(channel = %key, "evicting least recently active channel history");
            self.channels.remove(&key);
        }
    }
}
