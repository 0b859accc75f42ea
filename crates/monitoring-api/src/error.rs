use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the request functions.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 from the backend. The credential is missing, expired, or wrong.
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Whether the caller should send the user back to the login screen.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Errors of the persisted credential store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not determine application data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors of hub calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub method threw; the message is the server's.
    #[error("Hub call failed: {0}")]
    Server(String),

    #[error("Hub connection closed")]
    Disconnected,

    #[error("Unexpected hub result: {0}")]
    InvalidResult(String),
}
