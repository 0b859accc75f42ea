use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Token is not a three-part JWT")]
    MalformedToken,

    #[error("Token payload is not valid base64")]
    InvalidEncoding,

    #[error("Token payload is not a JSON object")]
    InvalidPayload,

    #[error("Token has no user id claim")]
    MissingUserId,
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Message must address exactly one of a user or a group")]
    InvalidAddressing,

    #[error("Unknown hub method: {0}")]
    UnknownMethod(String),

    #[error("Hub method {method} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Malformed hub payload: {0}")]
    Payload(#[from] serde_json::Error),
}
