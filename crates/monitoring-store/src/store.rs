//! The in-memory conversation store.
//!
//! [`ConversationStore`] owns every chat message the client has observed
//! (history fetches, optimistic sends, live pushes), the unread index, and
//! the pointer to the currently open conversation. Nothing else mutates
//! these; the message operations live in [`crate::messages`].

use tracing::debug;

use monitoring_shared::types::{Conversation, UserId};

use crate::models::ChatMessage;
use crate::unread::UnreadIndex;

/// Client-side view of all conversations of one user.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    pub(crate) me: UserId,
    /// Insertion ordered; the order breaks `created_at` ties.
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) unread: UnreadIndex,
    pub(crate) active: Option<Conversation>,
    /// Last placeholder id handed to a provisional message.
    pub(crate) last_provisional_id: i64,
}

impl ConversationStore {
    /// Create an empty store for the given current user.
    pub fn new(me: UserId) -> Self {
        Self {
            me,
            messages: Vec::new(),
            unread: UnreadIndex::new(),
            active: None,
            last_provisional_id: 0,
        }
    }

    /// The current user.
    pub fn me(&self) -> UserId {
        self.me
    }

    /// The conversation currently open, if any.
    pub fn active(&self) -> Option<Conversation> {
        self.active
    }

    /// Make `target` the open conversation and mark it read.
    ///
    /// Messages are kept; the visible list is recomputed by
    /// [`ConversationStore::messages_for_active`].
    pub fn open_conversation(&mut self, target: Conversation) {
        debug!(conversation = %target, "Opening conversation");
        self.active = Some(target);
        self.unread.reset(target);
    }

    /// Clear the open-conversation pointer. Later pushes count as unread.
    pub fn close_conversation(&mut self) {
        self.active = None;
    }

    pub fn unread(&self) -> &UnreadIndex {
        &self.unread
    }

    pub fn unread_count(&self, conversation: Conversation) -> u32 {
        self.unread.get(conversation)
    }

    pub fn total_unread(&self) -> u32 {
        self.unread.total()
    }

    /// Every observed message in insertion order.
    pub fn all_messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitoring_shared::types::GroupId;

    #[test]
    fn test_new_store_is_empty() {
        let store = ConversationStore::new(UserId(1));
        assert_eq!(store.me(), UserId(1));
        assert!(store.is_empty());
        assert_eq!(store.active(), None);
        assert_eq!(store.total_unread(), 0);
    }

    #[test]
    fn test_open_and_close() {
        let mut store = ConversationStore::new(UserId(1));
        store.open_conversation(Conversation::Group(GroupId(2)));
        assert_eq!(store.active(), Some(Conversation::Group(GroupId(2))));
        store.close_conversation();
        assert_eq!(store.active(), None);
    }
}
