//! Mutation coordinator.
//!
//! Issues join and create commands. The engine is written only after a
//! positive acknowledgement, so a failed command leaves no trace and there is
//! nothing to roll back.

use std::time::Duration;

use rollcall_core::{Access, AttendanceEngine, DeliveryPolicy, SyncError};
use rollcall_proto::{Event, EventDraft, EventId};

use crate::{
    BackendError, SessionGate, SnapshotLoader,
    backend::{Backend, bounded},
};

/// Sends mutating commands and folds their acknowledgements into the engine.
pub struct MutationCoordinator<B> {
    backend: B,
    timeout: Option<Duration>,
}

impl<B: Backend> MutationCoordinator<B> {
    /// Coordinator over `backend`, bounding each call by `timeout`.
    pub fn new(backend: B, timeout: Option<Duration>) -> Self {
        Self { backend, timeout }
    }

    /// Join `event_id` and record the acknowledged count.
    ///
    /// Returns the attendee count the service reported.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotAuthenticated`] if the session is signed out. No
    ///   request is sent.
    /// - [`SyncError::ApplicationRejected`] with the service's message (already
    ///   joined, restricted event, no such event). If the service no longer
    ///   recognizes the viewer the session is also cleared.
    /// - [`SyncError::Unreachable`] on transport failure or timeout.
    pub async fn join<P: DeliveryPolicy>(
        &self,
        gate: &mut SessionGate<B>,
        engine: &mut AttendanceEngine<P>,
        event_id: &EventId,
    ) -> Result<u64, SyncError> {
        gate.require(Access::Member)?;

        let count = bounded(self.timeout, self.backend.join(event_id))
            .await
            .map_err(|e| rejected(gate, e))?;

        engine.apply_optimistic_join(event_id, count);
        tracing::info!(%event_id, count, "joined event");
        Ok(count)
    }

    /// Create an event, then reload the full list.
    ///
    /// The acknowledgement carries no identifier, so the new event is looked
    /// up in the reloaded list by its user-entered fields. `Ok(None)` means
    /// the create succeeded but the reload failed or did not show it.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotAuthenticated`] if signed out or signed in as guest.
    ///   No request is sent.
    /// - [`SyncError::ApplicationRejected`] with the service's message.
    /// - [`SyncError::Unreachable`] on transport failure or timeout.
    pub async fn create<P: DeliveryPolicy>(
        &self,
        gate: &mut SessionGate<B>,
        loader: &SnapshotLoader<B>,
        engine: &mut AttendanceEngine<P>,
        draft: &EventDraft,
    ) -> Result<Option<Event>, SyncError> {
        gate.require(Access::Regular)?;

        bounded(self.timeout, self.backend.create(draft)).await.map_err(|e| rejected(gate, e))?;
        tracing::info!(title = %draft.title, "event created");

        match loader.load_all(gate).await {
            Ok(entries) => {
                engine.replace_all(entries);
                Ok(engine.events().filter(|(e, _)| draft.matches(e)).last().map(|(e, _)| e.clone()))
            },
            Err(e) => {
                tracing::warn!(error = %e, "reload after create failed");
                Ok(None)
            },
        }
    }
}

/// Map a failed command, clearing the session if the service disowned it.
fn rejected<B: Backend>(gate: &mut SessionGate<B>, err: BackendError) -> SyncError {
    gate.screen(err).into()
}
