//! Message reconciliation: history merge, live pushes, optimistic sends,
//! per-conversation views, and local removal.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use monitoring_shared::types::{Conversation, MessageId};

use crate::error::{Result, StoreError};
use crate::models::{ChatMessage, Delivery, ServerCopy};
use crate::store::ConversationStore;

/// What [`ConversationStore::ingest_push`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The message does not involve the current user.
    Ignored,
    /// A confirmed message with the same id is already held.
    Duplicate,
    /// The push is the authoritative copy of a provisional send and replaced it.
    Confirmed {
        correlation: Uuid,
        conversation: Conversation,
    },
    /// Appended as a new message.
    Appended {
        conversation: Conversation,
        /// Unread count of the conversation after the push.
        unread: u32,
    },
}

impl ConversationStore {
    /// Merge fetched history. A message whose id is already held is skipped
    /// (first seen wins). A message echoing the client id of a provisional
    /// send takes that entry's place. The unread index is untouched.
    ///
    /// Returns how many messages were appended.
    pub fn ingest_history(
        &mut self,
        conversation: Conversation,
        history: impl IntoIterator<Item = impl Into<ServerCopy>>,
    ) -> usize {
        let mut known = self.confirmed_ids();
        let mut added = 0;
        let mut confirmed = 0;

        for copy in history {
            let ServerCopy {
                message,
                correlation,
            } = copy.into();
            let already_held = !known.insert(message.id);

            if let Some(idx) = correlation.and_then(|c| self.provisional_index(c)) {
                self.settle_provisional(idx, message, already_held);
                confirmed += 1;
            } else if !already_held {
                self.messages.push(message);
                added += 1;
            }
        }

        debug!(conversation = %conversation, added, confirmed, "Merged history");
        added
    }

    /// Admit a live message.
    ///
    /// `correlation` is the client id echoed back by the server for one of
    /// our own sends; when it matches a provisional message that entry is
    /// replaced in place.
    pub fn ingest_push(&mut self, message: ChatMessage, correlation: Option<Uuid>) -> PushOutcome {
        if !message.involves(self.me) {
            debug!(msg_id = %message.id, "Ignoring push not addressed to current user");
            return PushOutcome::Ignored;
        }

        let conversation = message.conversation_for(self.me);
        let already_held = self.holds_confirmed(message.id);

        if let Some(correlation) = correlation {
            if let Some(idx) = self.provisional_index(correlation) {
                self.settle_provisional(idx, message, already_held);
                debug!(%correlation, "Provisional message confirmed");
                return PushOutcome::Confirmed {
                    correlation,
                    conversation,
                };
            }
        }

        if already_held {
            return PushOutcome::Duplicate;
        }

        let from_me = message.from == self.me;
        self.messages.push(message);

        if !from_me && self.active != Some(conversation) {
            self.unread.increment(conversation);
        }

        PushOutcome::Appended {
            conversation,
            unread: self.unread.get(conversation),
        }
    }

    /// Append a provisional message from the current user and return it so
    /// the caller can issue the network send.
    pub fn send_optimistic(&mut self, text: impl Into<String>, target: Conversation) -> ChatMessage {
        self.send_optimistic_at(text, target, Utc::now())
    }

    pub(crate) fn send_optimistic_at(
        &mut self,
        text: impl Into<String>,
        target: Conversation,
        now: DateTime<Utc>,
    ) -> ChatMessage {
        // Millisecond placeholder, bumped so rapid sends stay distinct.
        let id = now.timestamp_millis().max(self.last_provisional_id + 1);
        self.last_provisional_id = id;

        let message = ChatMessage {
            id: MessageId(id),
            from: self.me,
            to: target.addressee(),
            text: text.into(),
            created_at: now,
            delivery: Delivery::Pending {
                correlation: Uuid::new_v4(),
            },
        };

        self.messages.push(message.clone());
        message
    }

    /// The send for `correlation` failed; keep the message but flag it.
    pub fn mark_failed(&mut self, correlation: Uuid) -> Result<()> {
        let idx = self
            .provisional_index(correlation)
            .ok_or(StoreError::UnknownCorrelation(correlation))?;
        self.messages[idx].delivery = Delivery::Failed { correlation };
        info!(%correlation, "Provisional message marked failed");
        Ok(())
    }

    /// Flip a failed message back to pending and return it for resending.
    pub fn retry(&mut self, correlation: Uuid) -> Result<ChatMessage> {
        let idx = self
            .provisional_index(correlation)
            .ok_or(StoreError::UnknownCorrelation(correlation))?;
        let message = &mut self.messages[idx];
        if !matches!(message.delivery, Delivery::Failed { .. }) {
            return Err(StoreError::NotFailed(correlation));
        }
        message.delivery = Delivery::Pending { correlation };
        Ok(message.clone())
    }

    /// Drop a provisional message (pending or failed).
    pub fn discard(&mut self, correlation: Uuid) -> Result<ChatMessage> {
        let idx = self
            .provisional_index(correlation)
            .ok_or(StoreError::UnknownCorrelation(correlation))?;
        Ok(self.messages.remove(idx))
    }

    /// Messages of the open conversation, oldest first. Empty when nothing
    /// is open.
    pub fn messages_for_active(&self) -> impl Iterator<Item = &ChatMessage> + '_ {
        let selected = match self.active {
            Some(conversation) => self.collect_sorted(conversation),
            None => Vec::new(),
        };
        selected.into_iter()
    }

    /// Messages of any conversation, oldest first.
    pub fn messages_for(&self, conversation: Conversation) -> impl Iterator<Item = &ChatMessage> + '_ {
        self.collect_sorted(conversation).into_iter()
    }

    /// Remove the message with `id`, the confirmed one when a provisional
    /// placeholder shares the id. Returns false when it was not held.
    pub fn delete_message(&mut self, id: MessageId) -> bool {
        let confirmed = self
            .messages
            .iter()
            .position(|m| m.id == id && !m.is_provisional());
        let found = confirmed.or_else(|| self.messages.iter().position(|m| m.id == id));
        match found {
            Some(idx) => {
                self.messages.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove every message of `target`; other conversations are untouched.
    /// Returns how many messages were removed.
    pub fn clear_conversation(&mut self, target: Conversation) -> usize {
        let me = self.me;
        let before = self.messages.len();
        self.messages.retain(|m| !m.belongs_to(me, target));
        let removed = before - self.messages.len();
        info!(conversation = %target, removed, "Conversation cleared");
        removed
    }

    /// Known conversation partners, most recent activity first.
    pub fn partners(&self) -> Vec<Conversation> {
        let mut latest: HashMap<Conversation, DateTime<Utc>> = HashMap::new();
        for message in &self.messages {
            let entry = latest
                .entry(message.conversation_for(self.me))
                .or_insert(message.created_at);
            if message.created_at > *entry {
                *entry = message.created_at;
            }
        }

        let mut partners: Vec<(Conversation, DateTime<Utc>)> = latest.into_iter().collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        partners.into_iter().map(|(c, _)| c).collect()
    }

    pub fn find_provisional(&self, correlation: Uuid) -> Option<&ChatMessage> {
        self.provisional_index(correlation).map(|idx| &self.messages[idx])
    }

    fn collect_sorted(&self, conversation: Conversation) -> Vec<&ChatMessage> {
        let mut selected: Vec<&ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.belongs_to(self.me, conversation))
            .collect();
        // Stable: equal timestamps keep insertion order.
        selected.sort_by_key(|m| m.created_at);
        selected
    }

    // Provisional placeholders are not part of the server id space.
    fn confirmed_ids(&self) -> HashSet<MessageId> {
        self.messages
            .iter()
            .filter(|m| !m.is_provisional())
            .map(|m| m.id)
            .collect()
    }

    fn holds_confirmed(&self, id: MessageId) -> bool {
        self.messages.iter().any(|m| m.id == id && !m.is_provisional())
    }

    /// The server copy of the send at `idx` arrived: take its place, or just
    /// drop the placeholder when that copy is already held.
    fn settle_provisional(&mut self, idx: usize, message: ChatMessage, already_held: bool) {
        if already_held {
            self.messages.remove(idx);
        } else {
            self.messages[idx] = ChatMessage {
                delivery: Delivery::Confirmed,
                ..message
            };
        }
    }

    fn provisional_index(&self, correlation: Uuid) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.delivery.correlation() == Some(correlation))
    }
}
