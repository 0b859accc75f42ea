use thiserror::Error;
use uuid::Uuid;

use monitoring_shared::error::ProtocolError;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A pushed or fetched message could not be turned into a store message.
    #[error("Invalid message: {0}")]
    Protocol(#[from] ProtocolError),

    /// No provisional message carries this correlation id.
    #[error("No provisional message with correlation {0}")]
    UnknownCorrelation(Uuid),

    /// Retry was requested for a message that has not failed.
    #[error("Message {0} is not in a failed state")]
    NotFailed(Uuid),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
