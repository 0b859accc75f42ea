//! Current-user identity derived from the bearer token.
//!
//! The token is decoded, not validated: the backend is the only party that
//! checks signatures. The client only needs the numeric user id to tell its
//! own messages apart from everyone else's.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::CLAIM_NAME_IDENTIFIER;
use crate::error::IdentityError;
use crate::types::UserId;

/// Who is using this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub user_name: String,
}

impl Identity {
    /// Build the identity from a stored token and display name.
    pub fn from_token(token: &str, user_name: impl Into<String>) -> Result<Self, IdentityError> {
        Ok(Self {
            user_id: user_id_from_token(token)?,
            user_name: user_name.into(),
        })
    }
}

/// Extract the `nameidentifier` claim from a JWT payload.
///
/// The claim is emitted as a string by the backend but plain numbers are
/// accepted too.
pub fn user_id_from_token(token: &str) -> Result<UserId, IdentityError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(IdentityError::MalformedToken),
    };

    // Some issuers pad the segment, URL_SAFE_NO_PAD rejects that.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| IdentityError::InvalidEncoding)?;

    let claims: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| IdentityError::InvalidPayload)?;
    let claims = claims.as_object().ok_or(IdentityError::InvalidPayload)?;

    let id = match claims.get(CLAIM_NAME_IDENTIFIER) {
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        _ => None,
    };

    id.map(UserId).ok_or(IdentityError::MissingUserId)
}
