use echo_common::{ModelError, PostId};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single outbound call, with its cause.
///
/// Only the sync client and the realtime listener see this type; everything
/// above them receives [`SyncFailure`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Parse failed: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Realtime channel error: {0}")]
    Realtime(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Realtime(err.to_string())
    }
}

/// Opaque failure signal crossing the sync client boundary.
///
/// The cause has already been logged when this is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("feed sync request failed")]
pub struct SyncFailure;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error(transparent)]
    InvalidReaction(#[from] ModelError),

    #[error(transparent)]
    Sync(#[from] SyncFailure),
}

pub type StoreResult<T> = Result<T, StoreError>;
