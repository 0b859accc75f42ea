//! Per-conversation unread counters.

use std::collections::HashMap;

use monitoring_shared::types::Conversation;

/// Unread counts keyed by conversation. Direct and group conversations are
/// separate keys, so a user and a group sharing a numeric id never collide.
///
/// Zero counts are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreadIndex {
    counts: HashMap<Conversation, u32>,
}

impl UnreadIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, conversation: Conversation) -> u32 {
        let count = self.counts.entry(conversation).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn reset(&mut self, conversation: Conversation) {
        self.counts.remove(&conversation);
    }

    pub fn get(&self, conversation: Conversation) -> u32 {
        self.counts.get(&conversation).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().fold(0u32, |acc, c| acc.saturating_add(*c))
    }

    /// Conversations with at least one unread message.
    pub fn iter(&self) -> impl Iterator<Item = (Conversation, u32)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
