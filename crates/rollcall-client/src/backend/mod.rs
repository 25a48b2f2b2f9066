//! Backing service abstraction.
//!
//! Every component above this layer talks to the service through [`Backend`],
//! so the same loader, gate and coordinator code runs against the real HTTP
//! service, an in-process simulation, and a fault-injecting wrapper.

mod chaotic;
mod http;
mod memory;

use std::{future::Future, time::Duration};

pub use chaotic::{ChaoticBackend, Operation};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
use rollcall_proto::{
    Attendee, Event, EventDraft, EventId,
    reply::{AttendeeCounts, EventDetail},
};

use crate::BackendError;

/// Request/response surface of the backing event service.
///
/// Must be Clone + Send + Sync. Clones share credentials: a clone acts as the
/// same signed-in viewer, the way a cloned browser cookie jar would.
pub trait Backend: Clone + Send + Sync + 'static {
    /// `GET /events`: events in server order, without counts.
    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>, BackendError>> + Send;

    /// `GET /events/attendees`: attendee count per event.
    fn attendee_counts(&self) -> impl Future<Output = Result<AttendeeCounts, BackendError>> + Send;

    /// `GET /events/{id}`: one event with its count and the viewer's join flag.
    fn event_detail(
        &self,
        event_id: &EventId,
    ) -> impl Future<Output = Result<EventDetail, BackendError>> + Send;

    /// `GET /events/{id}/attendees`.
    fn attendees(
        &self,
        event_id: &EventId,
    ) -> impl Future<Output = Result<Vec<Attendee>, BackendError>> + Send;

    /// `POST /events/join`. Returns the acknowledged attendee count.
    fn join(&self, event_id: &EventId) -> impl Future<Output = Result<u64, BackendError>> + Send;

    /// `POST /events/create`.
    fn create(&self, draft: &EventDraft) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// `GET /user`. `None` when the service reports no name.
    fn current_user(&self) -> impl Future<Output = Result<Option<String>, BackendError>> + Send;

    /// `POST /login`.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// `POST /register`.
    fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// `POST /logout`.
    fn logout(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Run `call` under an optional deadline. Expiry is a transport failure.
pub(crate) async fn bounded<T>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| BackendError::Transport(format!("timed out after {}ms", limit.as_millis())))?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn bounded_call_times_out() {
        let hung = std::future::pending::<Result<(), BackendError>>();
        let result = bounded(Some(Duration::from_secs(10)), hung).await;
        assert!(matches!(result, Err(BackendError::Transport(reason)) if reason.contains("timed out")));
    }

    #[tokio::test]
    async fn unbounded_call_passes_result_through() {
        let result = bounded(None, async { Ok::<_, BackendError>(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
