//! Transport-level errors and their mapping onto [`SyncError`].

use rollcall_core::SyncError;
use thiserror::Error;

/// What a [`Backend`](crate::Backend) call can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The service did not recognize the viewer's credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service refused the request with an in-band message.
    #[error("{0}")]
    Rejected(String),

    /// Connection failure, timeout, or unexpected HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the service said the viewer is not signed in.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }
}

impl From<BackendError> for SyncError {
    /// Mapping for mutations and list reads. Single-event reads map
    /// `NotFound` themselves since they know the id.
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthenticated(message)
            | BackendError::NotFound(message)
            | BackendError::Rejected(message) => Self::ApplicationRejected(message),
            BackendError::Transport(reason) => Self::Unreachable(reason),
            BackendError::Decode(reason) => Self::Unreachable(format!("unexpected response: {reason}")),
        }
    }
}

/// Push channel establishment errors.
#[derive(Error, Debug)]
pub enum PushError {
    /// The WebSocket handshake failed.
    #[error("push connection failed: {0}")]
    Connection(String),
}
