//! UI notifications emitted by the chat widget and the hub bridge.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use monitoring_shared::types::{Conversation, MessageId};

pub const EVENT_MESSAGE_RECEIVED: &str = "message-received";
pub const EVENT_MESSAGE_CONFIRMED: &str = "message-confirmed";
pub const EVENT_MESSAGE_FAILED: &str = "message-failed";
pub const EVENT_UNREAD_CHANGED: &str = "unread-changed";
pub const EVENT_HUB_CLOSED: &str = "hub-closed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum UiEvent {
    #[serde(rename_all = "camelCase")]
    MessageReceived {
        conversation: Conversation,
        message_id: MessageId,
    },
    #[serde(rename_all = "camelCase")]
    MessageConfirmed {
        conversation: Conversation,
        correlation: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    MessageFailed {
        conversation: Conversation,
        correlation: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    UnreadChanged {
        conversation: Conversation,
        unread: u32,
        total: u32,
    },
    HubClosed {
        reason: Option<String>,
    },
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageReceived { .. } => EVENT_MESSAGE_RECEIVED,
            Self::MessageConfirmed { .. } => EVENT_MESSAGE_CONFIRMED,
            Self::MessageFailed { .. } => EVENT_MESSAGE_FAILED,
            Self::UnreadChanged { .. } => EVENT_UNREAD_CHANGED,
            Self::HubClosed { .. } => EVENT_HUB_CLOSED,
        }
    }
}

/// Where UI events go. The UI drains the receiving end.
pub type EventSink = mpsc::UnboundedSender<UiEvent>;

pub fn event_channel() -> (EventSink, mpsc::UnboundedReceiver<UiEvent>) {
    mpsc::unbounded_channel()
}

pub fn emit_event(sink: &EventSink, event: UiEvent) {
    let name = event.name();
    if let Err(e) = sink.send(event) {
        tracing::error!(event = name, error = %e, "Failed to emit event");
    }
}
