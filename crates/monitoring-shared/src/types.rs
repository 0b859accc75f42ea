use serde::{Deserialize, Serialize};

// Backend user primary key
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat message id. Server-assigned once confirmed; provisional messages
/// carry a locally generated placeholder until then.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a message is addressed to. A message is either direct or
/// group-addressed, never both and never neither.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Addressee {
    Direct(UserId),
    Group(GroupId),
}

/// A conversation as seen from the current user: the partner of a direct
/// conversation, or the group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conversation {
    Direct(UserId),
    Group(GroupId),
}

impl Conversation {
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// The addressee a new message in this conversation is sent to.
    pub fn addressee(&self) -> Addressee {
        match *self {
            Self::Direct(user) => Addressee::Direct(user),
            Self::Group(group) => Addressee::Group(group),
        }
    }
}

impl std::fmt::Display for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(user) => write!(f, "user:{user}"),
            Self::Group(group) => write!(f, "group:{group}"),
        }
    }
}

/// A user reference as returned by the chat hub (friends, all users, blocked).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub user_id: UserId,
    pub user_name: String,
}
