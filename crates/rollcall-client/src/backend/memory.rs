use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use rollcall_core::{GUEST_EMAIL, GUEST_NAME, GUEST_PASSWORD};
use rollcall_proto::{
    AttendanceUpdate, Attendee, Event, EventDraft, EventId, PushMessage,
    reply::{AttendeeCounts, EventDetail},
};
use tokio::sync::mpsc::{self, error::TrySendError};

use super::Backend;
use crate::BackendError;

/// Frames buffered per subscriber before new ones are dropped.
const SUBSCRIBER_CAPACITY: usize = 64;

/// In-process simulation of the backing service.
///
/// Holds accounts, events and attendee lists behind one `Arc<Mutex<>>`, and
/// fans push frames out to every subscriber the way the real service
/// broadcasts over its WebSocket. A handle also carries a signed-in viewer.
/// Clones share that viewer; [`MemoryBackend::connect_viewer`] gives a second
/// viewer of the same service.
///
/// Uses `lock().expect()`, which panics if the mutex is poisoned. Acceptable
/// for simulation code.
#[derive(Clone)]
pub struct MemoryBackend {
    service: Arc<Mutex<Service>>,
    viewer: Arc<Mutex<Option<String>>>,
}

struct Account {
    name: String,
    email: String,
    password: String,
}

struct Service {
    accounts: Vec<Account>,
    /// Events in creation order.
    events: Vec<Event>,
    /// Display names of attendees per event.
    attendees: HashMap<EventId, Vec<String>>,
    next_id: u64,
    subscribers: Vec<mpsc::Sender<String>>,
    /// Simulated outage: every call fails with a transport error.
    unreachable: bool,
    /// Calls received, including failed ones.
    requests: usize,
}

impl Service {
    fn event(&self, event_id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == event_id)
    }

    fn count(&self, event_id: &EventId) -> u64 {
        self.attendees.get(event_id).map_or(0, |names| names.len() as u64)
    }

    /// Deliver `frame` to every live subscriber. Full buffers drop the frame.
    fn broadcast(&mut self, frame: &str) {
        self.subscribers.retain(|tx| match tx.try_send(frame.to_owned()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("push subscriber lagging, frame dropped");
                true
            },
            Err(TrySendError::Closed(_)) => false,
        });
    }
}

/// Whether a signed-in viewer may see restricted events.
fn is_regular(viewer: Option<&str>) -> bool {
    viewer.is_some_and(|name| name != GUEST_NAME)
}

impl MemoryBackend {
    /// Service with only the guest account and no events.
    pub fn new() -> Self {
        let service = Service {
            accounts: vec![Account {
                name: GUEST_NAME.to_owned(),
                email: GUEST_EMAIL.to_owned(),
                password: GUEST_PASSWORD.to_owned(),
            }],
            events: Vec::new(),
            attendees: HashMap::new(),
            next_id: 1,
            subscribers: Vec::new(),
            unreachable: false,
            requests: 0,
        };

        Self { service: Arc::new(Mutex::new(service)), viewer: Arc::new(Mutex::new(None)) }
    }

    /// Another handle on the same service with its own, signed-out viewer.
    pub fn connect_viewer(&self) -> Self {
        Self { service: Arc::clone(&self.service), viewer: Arc::new(Mutex::new(None)) }
    }

    /// Register an account directly.
    pub fn add_account(&self, name: &str, email: &str, password: &str) {
        self.lock().accounts.push(Account {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        });
    }

    /// Store `event` with `attendees` already joined, replacing any event with
    /// the same id. Ids assigned by later creates skip past numeric ids seen
    /// here. No push frame is sent.
    pub fn insert_event<I, S>(&self, event: Event, attendees: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut service = self.lock();
        if let Ok(numeric) = event.id.as_str().parse::<u64>() {
            service.next_id = service.next_id.max(numeric + 1);
        }
        let names = attendees.into_iter().map(Into::into).collect();
        service.attendees.insert(event.id.clone(), names);
        match service.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => service.events.push(event),
        }
    }

    /// Delete an event server-side. Clients only notice on their next full load.
    pub fn remove_event(&self, event_id: &EventId) {
        let mut service = self.lock();
        service.events.retain(|e| &e.id != event_id);
        service.attendees.remove(event_id);
    }

    /// Current attendee count as the service sees it.
    pub fn attendee_count(&self, event_id: &EventId) -> u64 {
        self.lock().count(event_id)
    }

    /// New push subscription. Frames are raw JSON text.
    pub fn subscribe(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.lock().subscribers.push(tx);
        rx
    }

    /// Send an arbitrary frame to every subscriber.
    pub fn broadcast(&self, frame: &str) {
        self.lock().broadcast(frame);
    }

    /// Simulate an outage (or its end).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Number of calls received so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, Service> {
        self.service.lock().expect("Mutex poisoned")
    }

    #[allow(clippy::expect_used)]
    fn viewer(&self) -> Option<String> {
        self.viewer.lock().expect("Mutex poisoned").clone()
    }

    #[allow(clippy::expect_used)]
    fn set_viewer(&self, name: Option<String>) {
        *self.viewer.lock().expect("Mutex poisoned") = name;
    }

    /// Count the request and fail it if the service is down.
    fn enter(&self) -> Result<MutexGuard<'_, Service>, BackendError> {
        let mut service = self.lock();
        service.requests += 1;
        if service.unreachable {
            return Err(BackendError::Transport("connection refused".into()));
        }
        Ok(service)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    async fn list_events(&self) -> Result<Vec<Event>, BackendError> {
        let viewer = self.viewer();
        let service = self.enter()?;
        let regular = is_regular(viewer.as_deref());
        Ok(service.events.iter().filter(|e| regular || !e.is_for_logged_in_only).cloned().collect())
    }

    async fn attendee_counts(&self) -> Result<AttendeeCounts, BackendError> {
        let service = self.enter()?;
        Ok(service.events.iter().map(|e| (e.id.clone(), service.count(&e.id))).collect())
    }

    async fn event_detail(&self, event_id: &EventId) -> Result<EventDetail, BackendError> {
        let viewer = self.viewer();
        let service = self.enter()?;
        let event = service
            .event(event_id)
            .ok_or_else(|| BackendError::NotFound("Event not found".into()))?;

        if event.is_for_logged_in_only && !is_regular(viewer.as_deref()) {
            return Err(BackendError::Rejected("This event is only for logged in users".into()));
        }

        let has_joined = viewer.as_ref().is_some_and(|name| {
            service.attendees.get(event_id).is_some_and(|names| names.contains(name))
        });

        Ok(EventDetail { event: event.clone(), attendee_count: service.count(event_id), has_joined })
    }

    async fn attendees(&self, event_id: &EventId) -> Result<Vec<Attendee>, BackendError> {
        let service = self.enter()?;
        if service.event(event_id).is_none() {
            return Err(BackendError::NotFound("Event not found".into()));
        }

        let names = service.attendees.get(event_id).map(Vec::as_slice).unwrap_or_default();
        Ok(names.iter().map(|name| Attendee { user_name: name.clone() }).collect())
    }

    async fn join(&self, event_id: &EventId) -> Result<u64, BackendError> {
        let viewer = self.viewer();
        let mut service = self.enter()?;
        let Some(name) = viewer else {
            return Err(BackendError::Unauthenticated("You must be logged in to join events".into()));
        };

        let event = service
            .event(event_id)
            .ok_or_else(|| BackendError::NotFound("Event not found".into()))?;
        if event.is_for_logged_in_only && name == GUEST_NAME {
            return Err(BackendError::Rejected("This event is only for logged in users".into()));
        }

        let names = service.attendees.entry(event_id.clone()).or_default();
        if names.contains(&name) {
            return Err(BackendError::Rejected("You have already joined this event".into()));
        }
        names.push(name);

        let count = service.count(event_id);
        let frame = PushMessage::UpdateAttendees(AttendanceUpdate {
            event_id: event_id.clone(),
            count,
            seq: None,
        })
        .encode();
        service.broadcast(&frame);

        Ok(count)
    }

    async fn create(&self, draft: &EventDraft) -> Result<(), BackendError> {
        let viewer = self.viewer();
        let mut service = self.enter()?;
        let Some(creator_name) = viewer else {
            return Err(BackendError::Unauthenticated("You must be logged in to create events".into()));
        };
        if creator_name == GUEST_NAME {
            return Err(BackendError::Rejected("Guests cannot create events".into()));
        }

        let id = EventId::new(service.next_id.to_string());
        service.next_id += 1;
        service.attendees.insert(id.clone(), Vec::new());
        service.events.push(Event {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            date: draft.date,
            time: draft.time.clone(),
            location: draft.location.clone(),
            category: draft.category.clone(),
            creator_name,
            image_url: Some(draft.image_url.clone()).filter(|url| !url.is_empty()),
            is_for_logged_in_only: draft.is_for_logged_in_only,
        });

        Ok(())
    }

    async fn current_user(&self) -> Result<Option<String>, BackendError> {
        let viewer = self.viewer();
        let _service = self.enter()?;
        match viewer {
            Some(name) => Ok(Some(name)),
            None => Err(BackendError::Unauthenticated("Not logged in".into())),
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let name = {
            let service = self.enter()?;
            service
                .accounts
                .iter()
                .find(|a| a.email == email && a.password == password)
                .map(|a| a.name.clone())
                .ok_or_else(|| BackendError::Rejected("Invalid email or password".into()))?
        };

        self.set_viewer(Some(name));
        Ok(())
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), BackendError> {
        let mut service = self.enter()?;
        if service.accounts.iter().any(|a| a.email == email) {
            return Err(BackendError::Rejected("Email already registered".into()));
        }

        service.accounts.push(Account {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        });
        Ok(())
    }

    async fn logout(&self) -> Result<(), BackendError> {
        drop(self.enter()?);
        self.set_viewer(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            time: "10:00".into(),
            location: "Park".into(),
            category: "Outdoors".into(),
            image_url: String::new(),
            is_for_logged_in_only: false,
        }
    }

    #[tokio::test]
    async fn join_broadcasts_new_count_to_every_viewer() {
        let alice = MemoryBackend::new();
        alice.add_account("Alice", "alice@example.com", "pw");
        alice.login("alice@example.com", "pw").await.unwrap();
        alice.create(&draft("Picnic")).await.unwrap();
        let id = alice.list_events().await.unwrap()[0].id.clone();

        let mut frames = alice.connect_viewer().subscribe();
        assert_eq!(alice.join(&id).await, Ok(1));

        let frame = frames.recv().await.unwrap();
        assert_eq!(
            PushMessage::decode(&frame).unwrap(),
            PushMessage::UpdateAttendees(AttendanceUpdate { event_id: id, count: 1, seq: None })
        );
    }

    #[tokio::test]
    async fn second_join_is_rejected() {
        let backend = MemoryBackend::new();
        backend.login(GUEST_EMAIL, GUEST_PASSWORD).await.unwrap();
        backend.insert_event(
            Event {
                id: EventId::new("e1"),
                title: "Quiz".into(),
                description: String::new(),
                date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                time: "20:00".into(),
                location: "Pub".into(),
                category: "Social".into(),
                creator_name: "Alice".into(),
                image_url: None,
                is_for_logged_in_only: false,
            },
            ["Bob"],
        );

        assert_eq!(backend.join(&EventId::new("e1")).await, Ok(2));
        assert_eq!(
            backend.join(&EventId::new("e1")).await,
            Err(BackendError::Rejected("You have already joined this event".into()))
        );
    }

    #[tokio::test]
    async fn guest_cannot_create() {
        let backend = MemoryBackend::new();
        backend.login(GUEST_EMAIL, GUEST_PASSWORD).await.unwrap();
        assert_eq!(
            backend.create(&draft("Nope")).await,
            Err(BackendError::Rejected("Guests cannot create events".into()))
        );
    }

    #[tokio::test]
    async fn viewers_have_separate_credentials() {
        let first = MemoryBackend::new();
        let second = first.connect_viewer();
        first.login(GUEST_EMAIL, GUEST_PASSWORD).await.unwrap();

        assert_eq!(first.current_user().await, Ok(Some(GUEST_NAME.to_owned())));
        assert!(second.current_user().await.unwrap_err().is_unauthenticated());
        assert_eq!(first.clone().current_user().await, Ok(Some(GUEST_NAME.to_owned())));
    }

    #[tokio::test]
    async fn outage_fails_every_call_and_is_counted() {
        let backend = MemoryBackend::new();
        backend.set_unreachable(true);

        assert!(matches!(backend.list_events().await, Err(BackendError::Transport(_))));
        assert_eq!(backend.request_count(), 1);
    }
}
