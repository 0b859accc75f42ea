//! The chat widget.
//!
//! [`ChatWidget`] is a cloneable handle over the chat state (conversation
//! store, contact roster, open/closed flag, active tab) and the hub client.
//! The state sits behind a mutex shared with the hub bridge; the lock is
//! only taken between awaits, never across one.
//!
//! Destructive actions (delete, clear) go to the hub first and only touch
//! local state once the server has accepted them. Sends are optimistic: the
//! message is shown as pending at once and flagged failed if the call fails.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use uuid::Uuid;

use monitoring_api::HubClient;
use monitoring_shared::protocol::ServerEvent;
use monitoring_shared::types::{Addressee, Conversation, GroupId, MessageId, UserId};
use monitoring_store::{
    ChatMessage, ConversationStore, PushOutcome, Roster, ServerCopy, StoreError,
};

use crate::error::Result;
use crate::events::{emit_event, EventSink, UiEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatTab {
    #[default]
    Chat,
    Friends,
    Blocked,
    Groups,
}

/// Everything the widget renders.
#[derive(Debug)]
pub struct ChatState {
    store: ConversationStore,
    roster: Roster,
    groups: Vec<GroupId>,
    is_open: bool,
    tab: ChatTab,
}

impl ChatState {
    fn new(me: UserId) -> Self {
        Self {
            store: ConversationStore::new(me),
            roster: Roster::new(),
            groups: Vec::new(),
            is_open: false,
            tab: ChatTab::default(),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Groups opened in this session.
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn tab(&self) -> ChatTab {
        self.tab
    }
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    state: Arc<Mutex<ChatState>>,
    hub: HubClient,
    events: EventSink,
}

impl ChatWidget {
    pub fn new(me: UserId, hub: HubClient, events: EventSink) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatState::new(me))),
            hub,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&self.lock())
    }

    pub fn hub(&self) -> &HubClient {
        &self.hub
    }

    /// Fetch friends and all other users. Blocked users and groups start
    /// empty.
    pub async fn load_initial_data(&self) -> Result<()> {
        let friends = self.hub.get_friends().await?;
        let everyone = self.hub.get_all_users_except_me().await?;

        let mut state = self.lock();
        state.roster.load(friends, everyone);
        state.groups.clear();
        Ok(())
    }

    /// Open or close the widget. Returns the new state.
    pub fn toggle(&self) -> bool {
        let mut state = self.lock();
        state.is_open = !state.is_open;
        state.is_open
    }

    pub fn set_tab(&self, tab: ChatTab) {
        self.lock().tab = tab;
    }

    /// Open the direct conversation with `friend` and merge its history.
    ///
    /// Returns how many history messages were new.
    pub async fn open_direct(&self, friend: UserId) -> Result<usize> {
        let conversation = Conversation::Direct(friend);
        self.activate(conversation);

        let history = self.hub.get_private_messages(friend).await?;
        let messages: Vec<ServerCopy> = history
            .into_iter()
            .filter_map(|dto| {
                let id = dto.id;
                match ServerCopy::try_from(dto) {
                    Ok(copy) => Some(copy),
                    Err(e) => {
                        warn!(msg_id = %id, error = %e, "Skipping malformed history message");
                        None
                    }
                }
            })
            .collect();

        let added = self.lock().store.ingest_history(conversation, messages);
        Ok(added)
    }

    /// Open a group conversation. Groups have no history call.
    pub fn open_group(&self, group: GroupId) {
        {
            let mut state = self.lock();
            if !state.groups.contains(&group) {
                state.groups.push(group);
            }
        }
        self.activate(Conversation::Group(group));
    }

    pub fn close_conversation(&self) {
        self.lock().store.close_conversation();
    }

    fn activate(&self, conversation: Conversation) {
        let total = {
            let mut state = self.lock();
            state.store.open_conversation(conversation);
            state.tab = ChatTab::Chat;
            state.is_open = true;
            state.store.total_unread()
        };
        emit_event(
            &self.events,
            UiEvent::UnreadChanged {
                conversation,
                unread: 0,
                total,
            },
        );
    }

    /// Send `text` to the open conversation.
    ///
    /// Blank text or no open conversation is a no-op returning `None`.
    /// Otherwise the provisional message is returned once the hub accepted
    /// the call; on failure it stays in the store flagged as failed.
    pub async fn send(&self, text: &str) -> Result<Option<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let message = {
            let mut state = self.lock();
            let Some(conversation) = state.store.active() else {
                debug!("Send with no open conversation ignored");
                return Ok(None);
            };
            state.store.send_optimistic(text, conversation)
        };

        self.dispatch(&message).await?;
        Ok(Some(message))
    }

    /// Resend a failed message.
    pub async fn retry(&self, correlation: Uuid) -> Result<()> {
        let message = self.lock().store.retry(correlation)?;
        self.dispatch(&message).await
    }

    /// Drop a failed or pending message without sending it.
    pub fn discard(&self, correlation: Uuid) -> Result<ChatMessage> {
        Ok(self.lock().store.discard(correlation)?)
    }

    async fn dispatch(&self, message: &ChatMessage) -> Result<()> {
        let Some(correlation) = message.delivery.correlation() else {
            return Ok(());
        };

        let sent = match message.to {
            Addressee::Direct(friend) => {
                self.hub
                    .send_private_message(friend, &message.text, correlation)
                    .await
            }
            Addressee::Group(group) => {
                self.hub
                    .send_group_message(group, &message.text, correlation)
                    .await
            }
        };

        match sent {
            Ok(()) => {
                debug!(%correlation, "Message sent");
                Ok(())
            }
            Err(e) => {
                warn!(%correlation, error = %e, "Send failed");
                let conversation = {
                    let mut state = self.lock();
                    // The confirming push may already have replaced it.
                    if state.store.find_provisional(correlation).is_some() {
                        state.store.mark_failed(correlation)?;
                        Some(message.conversation_for(state.store.me()))
                    } else {
                        None
                    }
                };
                if let Some(conversation) = conversation {
                    emit_event(
                        &self.events,
                        UiEvent::MessageFailed {
                            conversation,
                            correlation,
                        },
                    );
                }
                Err(e.into())
            }
        }
    }

    /// Delete a message on the server, then locally. A message that was
    /// never confirmed is only discarded locally.
    ///
    /// Returns false when no such message is held.
    pub async fn delete_message(&self, id: MessageId) -> Result<bool> {
        let held = self.with_state(|state| {
            let messages = state.store.all_messages();
            messages
                .iter()
                .find(|m| m.id == id && !m.is_provisional())
                .or_else(|| messages.iter().find(|m| m.id == id))
                .map(|m| m.delivery.correlation())
        });

        match held {
            None => return Ok(false),
            Some(Some(correlation)) => {
                self.discard(correlation)?;
                return Ok(true);
            }
            Some(None) => {}
        }

        self.hub.delete_message(id).await?;
        let removed = self.lock().store.delete_message(id);
        info!(msg_id = %id, "Message deleted");
        Ok(removed)
    }

    /// Clear the open conversation on the server, then locally.
    ///
    /// Returns how many local messages were removed.
    pub async fn clear_history(&self) -> Result<usize> {
        let Some(conversation) = self.with_state(|state| state.store.active()) else {
            return Ok(0);
        };

        match conversation {
            Conversation::Direct(friend) => self.hub.clear_private_history(friend).await?,
            Conversation::Group(group) => self.hub.clear_group_history(group).await?,
        }

        Ok(self.lock().store.clear_conversation(conversation))
    }

    pub async fn add_friend(&self, user_id: UserId) -> Result<()> {
        self.hub.add_friend(user_id).await?;
        if self.lock().roster.add_friend(user_id) {
            info!(user = %user_id, "Friend added");
        }
        Ok(())
    }

    pub async fn remove_friend(&self, user_id: UserId) -> Result<()> {
        self.hub.remove_friend(user_id).await?;
        if self.lock().roster.remove_friend(user_id) {
            info!(user = %user_id, "Friend removed");
        }
        Ok(())
    }

    /// Blocking is local to this client.
    pub fn block(&self, user_id: UserId) -> bool {
        self.lock().roster.block(user_id)
    }

    pub fn unblock(&self, user_id: UserId) -> bool {
        self.lock().roster.unblock(user_id)
    }

    /// Route a server push into the store and tell the UI what changed.
    pub fn handle_push(&self, event: ServerEvent) -> Result<PushOutcome> {
        let ServerCopy {
            message,
            correlation,
        } = ServerCopy::try_from(event.into_message()).map_err(StoreError::from)?;
        let message_id = message.id;

        let (outcome, unread_before, total) = {
            let mut state = self.lock();
            let me = state.store.me();
            let before = state.store.unread_count(message.conversation_for(me));
            let outcome = state.store.ingest_push(message, correlation);
            (outcome, before, state.store.total_unread())
        };

        match outcome {
            PushOutcome::Ignored | PushOutcome::Duplicate => {
                debug!(msg_id = %message_id, outcome = ?outcome, "Push not applied");
            }
            PushOutcome::Confirmed {
                correlation,
                conversation,
            } => {
                emit_event(
                    &self.events,
                    UiEvent::MessageConfirmed {
                        conversation,
                        correlation,
                    },
                );
            }
            PushOutcome::Appended {
                conversation,
                unread,
            } => {
                emit_event(
                    &self.events,
                    UiEvent::MessageReceived {
                        conversation,
                        message_id,
                    },
                );
                if unread != unread_before {
                    emit_event(
                        &self.events,
                        UiEvent::UnreadChanged {
                            conversation,
                            unread,
                            total,
                        },
                    );
                }
            }
        }

        Ok(outcome)
    }
}
