//! Error type for the dashboard client

use thiserror::Error;

/// Errors surfaced by the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with an error status; `message` is its `message` field
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable response
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// A task action was attempted without a session
    #[error("Not signed in")]
    NotAuthenticated,

    /// Reading or writing the session file failed
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The session file could not be encoded or decoded
    #[error("Session format error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }
}

/// Type alias for client results
pub type ClientResult<T> = Result<T, ClientError>;
