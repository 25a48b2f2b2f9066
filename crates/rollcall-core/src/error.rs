//! Outcome taxonomy for reads and mutations.
//!
//! Every failure a caller can observe falls in one of four classes. Only
//! [`SyncError::Unreachable`] is worth retrying; the others describe a state
//! of the world that retrying will not change.

use rollcall_proto::EventId;
use thiserror::Error;

use crate::Access;

/// Errors surfaced to the caller of a sync operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Local precondition failed. No request was sent.
    #[error("not authenticated: {0}")]
    NotAuthenticated(Access),

    /// Authoritative read found no such event. The caller should navigate
    /// away rather than render an empty detail view.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// The service refused the request on a business rule (already joined,
    /// restricted event, guest mutation). Message is shown verbatim.
    #[error("{0}")]
    ApplicationRejected(String),

    /// Transport failure or timeout.
    #[error("service unreachable: {0}")]
    Unreachable(String),
}

impl SyncError {
    /// Returns true if the same request may succeed when issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(SyncError::Unreachable("connection refused".into()).is_retryable());

        assert!(!SyncError::NotAuthenticated(Access::Member).is_retryable());
        assert!(!SyncError::NotFound(EventId::new("e1")).is_retryable());
        assert!(!SyncError::ApplicationRejected("Event is full".into()).is_retryable());
    }

    #[test]
    fn rejection_message_is_verbatim() {
        let err = SyncError::ApplicationRejected("You have already joined this event".into());
        assert_eq!(err.to_string(), "You have already joined this event");
    }
}
