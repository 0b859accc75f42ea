use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::types::{Addressee, GroupId, MessageId, UserId};

/// Frames exchanged with the real-time chat hub.
///
/// The transport below (websocket framing, handshake, reconnect) maps these
/// onto its own wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HubFrame {
    /// Method call. Client calls always carry an invocation id; server
    /// pushes usually do not.
    #[serde(rename_all = "camelCase")]
    Invocation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        invocation_id: Option<String>,
        target: String,
        #[serde(default)]
        arguments: Vec<Value>,
    },

    /// Result of a client call
    #[serde(rename_all = "camelCase")]
    Completion {
        invocation_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Keep-alive
    Ping,

    /// Connection is going away
    Close {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl HubFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// A chat message as the hub sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: MessageId,
    pub from_user_id: UserId,
    #[serde(default)]
    pub to_user_id: Option<UserId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub message_text: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Echo of the id the sender attached to its send call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<Uuid>,
}

impl ChatMessageDto {
    pub fn addressee(&self) -> Result<Addressee, ProtocolError> {
        match (self.to_user_id, self.group_id) {
            (Some(user), None) => Ok(Addressee::Direct(user)),
            (None, Some(group)) => Ok(Addressee::Group(group)),
            _ => Err(ProtocolError::InvalidAddressing),
        }
    }
}

/// Client -> server hub calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubInvocation {
    GetFriends,
    GetAllUsersExceptMe,
    GetPrivateMessages {
        friend_id: UserId,
    },
    SendPrivateMessage {
        friend_id: UserId,
        text: String,
        client_message_id: Uuid,
    },
    SendGroupMessage {
        group_id: GroupId,
        text: String,
        client_message_id: Uuid,
    },
    AddFriend {
        user_id: UserId,
    },
    RemoveFriend {
        user_id: UserId,
    },
    DeleteMessage {
        message_id: MessageId,
    },
    ClearPrivateHistory {
        friend_id: UserId,
    },
    ClearGroupHistory {
        group_id: GroupId,
    },
}

impl HubInvocation {
    pub fn method(&self) -> &'static str {
        match self {
            Self::GetFriends => HUB_GET_FRIENDS,
            Self::GetAllUsersExceptMe => HUB_GET_ALL_USERS_EXCEPT_ME,
            Self::GetPrivateMessages { .. } => HUB_GET_PRIVATE_MESSAGES,
            Self::SendPrivateMessage { .. } => HUB_SEND_PRIVATE_MESSAGE,
            Self::SendGroupMessage { .. } => HUB_SEND_GROUP_MESSAGE,
            Self::AddFriend { .. } => HUB_ADD_FRIEND,
            Self::RemoveFriend { .. } => HUB_REMOVE_FRIEND,
            Self::DeleteMessage { .. } => HUB_DELETE_MESSAGE,
            Self::ClearPrivateHistory { .. } => HUB_CLEAR_PRIVATE_HISTORY,
            Self::ClearGroupHistory { .. } => HUB_CLEAR_GROUP_HISTORY,
        }
    }

    /// Positional arguments in the order the hub method declares them.
    pub fn arguments(&self) -> Vec<Value> {
        match self {
            Self::GetFriends | Self::GetAllUsersExceptMe => Vec::new(),
            Self::GetPrivateMessages { friend_id } => vec![json!(friend_id)],
            Self::SendPrivateMessage {
                friend_id,
                text,
                client_message_id,
            } => vec![json!(friend_id), json!(text), json!(client_message_id)],
            Self::SendGroupMessage {
                group_id,
                text,
                client_message_id,
            } => vec![json!(group_id), json!(text), json!(client_message_id)],
            Self::AddFriend { user_id } | Self::RemoveFriend { user_id } => vec![json!(user_id)],
            Self::DeleteMessage { message_id } => vec![json!(message_id)],
            Self::ClearPrivateHistory { friend_id } => vec![json!(friend_id)],
            Self::ClearGroupHistory { group_id } => vec![json!(group_id)],
        }
    }

    pub fn into_frame(self, invocation_id: String) -> HubFrame {
        HubFrame::Invocation {
            invocation_id: Some(invocation_id),
            target: self.method().to_string(),
            arguments: self.arguments(),
        }
    }
}

/// Server -> client hub calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    PrivateMessage(ChatMessageDto),
    GroupMessage(ChatMessageDto),
}

impl ServerEvent {
    pub fn from_invocation(target: &str, arguments: Vec<Value>) -> Result<Self, ProtocolError> {
        let wrap: fn(ChatMessageDto) -> Self = match target {
            HUB_RECEIVE_PRIVATE_MESSAGE => Self::PrivateMessage,
            HUB_RECEIVE_GROUP_MESSAGE => Self::GroupMessage,
            other => return Err(ProtocolError::UnknownMethod(other.to_string())),
        };

        let got = arguments.len();
        let Some(payload) = arguments.into_iter().next().filter(|_| got == 1) else {
            return Err(ProtocolError::ArgumentCount {
                method: target.to_string(),
                expected: 1,
                got,
            });
        };

        Ok(wrap(serde_json::from_value(payload)?))
    }

    pub fn message(&self) -> &ChatMessageDto {
        match self {
            Self::PrivateMessage(m) | Self::GroupMessage(m) => m,
        }
    }

    pub fn into_message(self) -> ChatMessageDto {
        match self {
            Self::PrivateMessage(m) | Self::GroupMessage(m) => m,
        }
    }
}

/// Backend timestamps. RFC 3339 when an offset is present, otherwise a naive
/// date-time taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dto_json() -> Value {
        json!({
            "id": 11,
            "fromUserId": 2,
            "toUserId": 1,
            "groupId": null,
            "messageText": "hi2",
            "createdAt": "2025-03-01T10:15:00.123"
        })
    }

    #[test]
    fn test_invocation_frame_shape() {
        let id = Uuid::new_v4();
        let frame = HubInvocation::SendPrivateMessage {
            friend_id: UserId(5),
            text: "привет".into(),
            client_message_id: id,
        }
        .into_frame("3".into());

        let value: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "invocation");
        assert_eq!(value["invocationId"], "3");
        assert_eq!(value["target"], "SendPrivateMessage");
        assert_eq!(value["arguments"], json!([5, "привет", id.to_string()]));
    }

    #[test]
    fn test_argumentless_invocation() {
        let frame = HubInvocation::GetFriends.into_frame("1".into());
        assert_eq!(
            frame,
            HubFrame::Invocation {
                invocation_id: Some("1".into()),
                target: "GetFriends".into(),
                arguments: vec![],
            }
        );
    }

    #[test]
    fn test_completion_parse() {
        let frame = HubFrame::from_json(r#"{"type":"completion","invocationId":"9","error":"denied"}"#)
            .unwrap();
        assert_eq!(
            frame,
            HubFrame::Completion {
                invocation_id: "9".into(),
                result: None,
                error: Some("denied".into()),
            }
        );
    }

    #[test]
    fn test_server_event_from_invocation() {
        let event =
            ServerEvent::from_invocation(HUB_RECEIVE_PRIVATE_MESSAGE, vec![dto_json()]).unwrap();
        let msg = event.message();
        assert_eq!(msg.id, MessageId(11));
        assert_eq!(msg.addressee().unwrap(), Addressee::Direct(UserId(1)));
        assert_eq!(
            msg.created_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_server_event_rejects_unknown_and_bad_arity() {
        assert!(matches!(
            ServerEvent::from_invocation("Shutdown", vec![]),
            Err(ProtocolError::UnknownMethod(_))
        ));
        assert!(matches!(
            ServerEvent::from_invocation(HUB_RECEIVE_GROUP_MESSAGE, vec![]),
            Err(ProtocolError::ArgumentCount { got: 0, .. })
        ));
    }

    #[test]
    fn test_addressing_must_be_exclusive() {
        let mut both: ChatMessageDto = serde_json::from_value(dto_json()).unwrap();
        both.group_id = Some(GroupId(4));
        assert!(matches!(both.addressee(), Err(ProtocolError::InvalidAddressing)));

        let mut neither = both.clone();
        neither.group_id = None;
        neither.to_user_id = None;
        assert!(matches!(neither.addressee(), Err(ProtocolError::InvalidAddressing)));
    }

    #[test]
    fn test_timestamp_with_offset() {
        let parsed = timestamp::parse("2025-03-01T13:15:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap());
        assert!(timestamp::parse("yesterday").is_none());
    }
}
