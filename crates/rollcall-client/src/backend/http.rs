//! HTTP backend.
//!
//! Talks JSON to the real service with reqwest. Credentials are the session
//! cookie the service sets on login; the client keeps its own cookie jar so
//! every later call carries it.

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use rollcall_proto::{
    Attendee, Event, EventDraft, EventId, Reply,
    reply::{
        AttendeeCounts, AttendeeList, ErrorBody, EventDetail, JoinRequest, LoginRequest,
        RegisterRequest, StatusReply, UserReply, status,
    },
};
use serde::{Serialize, de::DeserializeOwned};

use super::Backend;
use crate::{BackendError, ClientConfig};

/// [`Backend`] over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpBackend {
    /// Backend for the service described by `config`.
    ///
    /// # Errors
    ///
    /// [`BackendError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| BackendError::Transport(format!("client setup failed: {e}")))?;

        Ok(Self { client, config: Arc::new(config.clone()) })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<StatusReply, BackendError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read(response).await
    }
}

/// Decode a response body, classifying failures.
///
/// A 2xx body may still be `{"Error": ..}`; that is a rejection. Non-2xx
/// statuses are classified by code, with the body's `Error` text as the
/// message when present.
async fn read<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| BackendError::Transport(e.to_string()))?;

    if status.is_success() {
        let reply: Reply<T> =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))?;
        return reply.into_result().map_err(BackendError::Rejected);
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_owned());

    match status {
        StatusCode::UNAUTHORIZED => Err(BackendError::Unauthenticated(message)),
        StatusCode::NOT_FOUND => Err(BackendError::NotFound(message)),
        s if s.is_client_error() => Err(BackendError::Rejected(message)),
        s => Err(BackendError::Transport(format!("HTTP {}: {message}", s.as_u16()))),
    }
}

/// Accept `reply` only if it carries the `expected` acknowledgement.
fn acknowledged(reply: &StatusReply, expected: &str) -> Result<(), BackendError> {
    if reply.is(expected) { Ok(()) } else { Err(BackendError::Rejected(reply.status.clone())) }
}

impl Backend for HttpBackend {
    async fn list_events(&self) -> Result<Vec<Event>, BackendError> {
        self.get("/events").await
    }

    async fn attendee_counts(&self) -> Result<AttendeeCounts, BackendError> {
        self.get("/events/attendees").await
    }

    async fn event_detail(&self, event_id: &EventId) -> Result<EventDetail, BackendError> {
        self.get(&format!("/events/{event_id}")).await
    }

    async fn attendees(&self, event_id: &EventId) -> Result<Vec<Attendee>, BackendError> {
        let list: AttendeeList = self.get(&format!("/events/{event_id}/attendees")).await?;
        Ok(list.attendees)
    }

    async fn join(&self, event_id: &EventId) -> Result<u64, BackendError> {
        let reply = self.post("/events/join", &JoinRequest { event_id }).await?;
        acknowledged(&reply, status::JOINED)?;
        reply
            .attendee_count
            .ok_or_else(|| BackendError::Decode("join acknowledged without attendeeCount".into()))
    }

    async fn create(&self, draft: &EventDraft) -> Result<(), BackendError> {
        let reply = self.post("/events/create", draft).await?;
        acknowledged(&reply, status::CREATED)
    }

    async fn current_user(&self) -> Result<Option<String>, BackendError> {
        let user: UserReply = self.get("/user").await?;
        Ok(user.name)
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let reply = self.post("/login", &LoginRequest { email, password }).await?;
        acknowledged(&reply, status::SUCCESS)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), BackendError> {
        let reply = self.post("/register", &RegisterRequest { name, email, password }).await?;
        acknowledged(&reply, status::SUCCESS)
    }

    async fn logout(&self) -> Result<(), BackendError> {
        let reply = self.post("/logout", &serde_json::json!({})).await?;
        acknowledged(&reply, status::LOGGED_OUT)
    }
}
