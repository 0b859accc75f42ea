//! Domain model structs held by the conversation store.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use monitoring_shared::error::ProtocolError;
use monitoring_shared::protocol::ChatMessageDto;
use monitoring_shared::types::{Addressee, Conversation, MessageId, UserId};

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Where a message stands relative to the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Delivery {
    /// Authoritative copy from history or a push.
    Confirmed,
    /// Shown locally, send call still in flight.
    Pending { correlation: Uuid },
    /// Send call failed; the user may retry or discard.
    Failed { correlation: Uuid },
}

impl Delivery {
    pub fn correlation(&self) -> Option<Uuid> {
        match *self {
            Self::Confirmed => None,
            Self::Pending { correlation } | Self::Failed { correlation } => Some(correlation),
        }
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// A single chat message, direct or group-addressed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Server id once confirmed, a local placeholder while provisional.
    pub id: MessageId,
    /// Author.
    pub from: UserId,
    /// Recipient user or group.
    pub to: Addressee,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub delivery: Delivery,
}

impl ChatMessage {
    pub fn is_provisional(&self) -> bool {
        !matches!(self.delivery, Delivery::Confirmed)
    }

    /// Whether `me` is the sender or the direct recipient. Group messages are
    /// admitted as-is: the server only pushes them to members.
    pub fn involves(&self, me: UserId) -> bool {
        match self.to {
            Addressee::Direct(to) => self.from == me || to == me,
            Addressee::Group(_) => true,
        }
    }

    /// The conversation this message belongs to, seen from `me`.
    pub fn conversation_for(&self, me: UserId) -> Conversation {
        match self.to {
            Addressee::Direct(to) if self.from == me => Conversation::Direct(to),
            Addressee::Direct(_) => Conversation::Direct(self.from),
            Addressee::Group(group) => Conversation::Group(group),
        }
    }

    /// Direct: `(from = me ∧ to = partner) ∨ (from = partner ∧ to = me)`.
    /// Group: `group = target`.
    pub fn belongs_to(&self, me: UserId, conversation: Conversation) -> bool {
        match (conversation, self.to) {
            (Conversation::Direct(partner), Addressee::Direct(to)) => {
                (self.from == me && to == partner) || (self.from == partner && to == me)
            }
            (Conversation::Group(target), Addressee::Group(group)) => group == target,
            _ => false,
        }
    }
}

impl TryFrom<ChatMessageDto> for ChatMessage {
    type Error = ProtocolError;

    fn try_from(dto: ChatMessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            to: dto.addressee()?,
            id: dto.id,
            from: dto.from_user_id,
            text: dto.message_text,
            created_at: dto.created_at,
            delivery: Delivery::Confirmed,
        })
    }
}

// ---------------------------------------------------------------------------
// ServerCopy
// ---------------------------------------------------------------------------

/// An authoritative message as delivered by the server, with the client id it
/// echoes when it answers one of our own sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCopy {
    pub message: ChatMessage,
    pub correlation: Option<Uuid>,
}

impl From<ChatMessage> for ServerCopy {
    fn from(message: ChatMessage) -> Self {
        Self {
            message,
            correlation: None,
        }
    }
}

impl TryFrom<ChatMessageDto> for ServerCopy {
    type Error = ProtocolError;

    fn try_from(dto: ChatMessageDto) -> Result<Self, Self::Error> {
        let correlation = dto.client_message_id;
        Ok(Self {
            message: ChatMessage::try_from(dto)?,
            correlation,
        })
    }
}
