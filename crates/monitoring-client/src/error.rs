use thiserror::Error;

use monitoring_api::{ApiError, HubError, SessionError};
use monitoring_shared::error::IdentityError;
use monitoring_store::StoreError;

use crate::routes::Route;

/// Errors surfaced by pages and the chat widget.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session token; the page cannot load.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid session token: {0}")]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backend answered `success = false`.
    #[error("{0}")]
    Rejected(String),

    /// Input was refused before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Where the UI should go instead of showing the error, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::NotAuthenticated | Self::Identity(_) => Some(Route::Login),
            Self::Api(e) if e.is_auth() => Some(Route::Login),
            _ => None,
        }
    }

    /// Text suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Unauthorized(message))
            | Self::Api(ApiError::Status { message, .. })
            | Self::Hub(HubError::Server(message))
            | Self::Rejected(message)
            | Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
