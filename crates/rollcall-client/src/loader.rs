//! Snapshot loader.
//!
//! Authoritative reads from the backing service. Event identity is primary:
//! a failed list or detail read is an error. Counts and attendee lists are
//! supplementary: their failure degrades to zero and empty.
//!
//! Every read takes the [`SessionGate`]: a read the service answers with
//! "unauthenticated" clears the session, whatever else happens to the result.

use std::time::Duration;

use rollcall_core::{AttendanceState, SyncError};
use rollcall_proto::{Attendee, Event, EventId};

use crate::{
    BackendError, SessionGate,
    backend::{Backend, bounded},
};

/// Fetches snapshots of events and attendance.
pub struct SnapshotLoader<B> {
    backend: B,
    timeout: Option<Duration>,
}

impl<B: Backend> SnapshotLoader<B> {
    /// Loader over `backend`, bounding each call by `timeout`.
    pub fn new(backend: B, timeout: Option<Duration>) -> Self {
        Self { backend, timeout }
    }

    /// All events in server order with their attendee counts.
    ///
    /// Counts come from one batch call. If it fails, every count is zero and
    /// the list is still returned. The list read carries no per-viewer data,
    /// so every joined flag is false.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Unreachable`] if the event list cannot be fetched.
    /// - [`SyncError::ApplicationRejected`] if the service refuses it.
    pub async fn load_all(
        &self,
        gate: &mut SessionGate<B>,
    ) -> Result<Vec<(Event, AttendanceState)>, SyncError> {
        let events =
            bounded(self.timeout, self.backend.list_events()).await.map_err(|e| gate.screen(e))?;

        let counts = match bounded(self.timeout, self.backend.attendee_counts()).await {
            Ok(counts) => counts,
            Err(e) => {
                let e = gate.screen(e);
                tracing::warn!(error = %e, "attendee counts unavailable, showing zero");
                Default::default()
            },
        };

        tracing::debug!(events = events.len(), "event list loaded");
        Ok(events
            .into_iter()
            .map(|event| {
                let count = counts.get(&event.id).copied().unwrap_or(0);
                (event, AttendanceState::new(count, false))
            })
            .collect())
    }

    /// One event with its count and the viewer's join flag.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotFound`] if the service reports the event absent or
    ///   answers with an in-band error. The caller should navigate away.
    /// - [`SyncError::ApplicationRejected`] if the viewer is no longer signed
    ///   in. The gate's session is cleared.
    /// - [`SyncError::Unreachable`] on transport failure.
    pub async fn load_one(
        &self,
        gate: &mut SessionGate<B>,
        event_id: &EventId,
    ) -> Result<(Event, AttendanceState), SyncError> {
        match bounded(self.timeout, self.backend.event_detail(event_id)).await {
            Ok(detail) => {
                Ok((detail.event, AttendanceState::new(detail.attendee_count, detail.has_joined)))
            },
            Err(BackendError::NotFound(reason) | BackendError::Rejected(reason)) => {
                tracing::debug!(%event_id, %reason, "event detail unavailable");
                Err(SyncError::NotFound(event_id.clone()))
            },
            Err(e) => Err(gate.screen(e).into()),
        }
    }

    /// Attendee list for the detail view. Empty on any failure.
    pub async fn load_attendees(&self, gate: &mut SessionGate<B>, event_id: &EventId) -> Vec<Attendee> {
        match bounded(self.timeout, self.backend.attendees(event_id)).await {
            Ok(attendees) => attendees,
            Err(e) => {
                let e = gate.screen(e);
                tracing::warn!(%event_id, error = %e, "attendee list unavailable");
                Vec::new()
            },
        }
    }
}
