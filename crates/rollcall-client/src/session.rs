//! Viewing session lifecycle.
//!
//! [`ViewingSession`] is the single owner of everything one viewer needs:
//! gate, loader, coordinator, engine and push channel. Every operation takes
//! `&mut self`, so at most one handler touches the engine at a time and each
//! runs to completion between suspension points. No locks are involved.
//!
//! Dropping an operation's future before it completes discards its result:
//! engine writes happen only after the last await of each operation.
//! [`ViewingSession::close`] consumes the session, so no write can follow it.

use rollcall_core::{
    AttendanceChange, AttendanceEngine, AttendanceState, DeliveryPolicy, LastDeliveredWins,
    Session, SyncError,
};
use rollcall_proto::{AttendanceUpdate, Attendee, Event, EventDraft, EventId};
use tokio::sync::watch;

use crate::{
    Backend, ClientConfig, MutationCoordinator, PushChannel, PushError, SessionGate,
    SnapshotLoader, push::decode_frame,
};

/// One viewer's synchronized view of the event service.
///
/// # Type Parameters
///
/// - `B`: backing service transport
/// - `P`: push delta admission policy
pub struct ViewingSession<B, P = LastDeliveredWins> {
    gate: SessionGate<B>,
    loader: SnapshotLoader<B>,
    coordinator: MutationCoordinator<B>,
    engine: AttendanceEngine<P>,
    push: Option<PushChannel>,
    /// Engine revision, published after every change.
    revision: watch::Sender<u64>,
}

impl<B: Backend> ViewingSession<B> {
    /// Session with last-delivered-wins push semantics.
    pub fn new(backend: B, config: &ClientConfig) -> Self {
        Self::with_policy(backend, config, LastDeliveredWins)
    }
}

impl<B: Backend, P: DeliveryPolicy> ViewingSession<B, P> {
    /// Session with a custom push admission policy.
    pub fn with_policy(backend: B, config: &ClientConfig, policy: P) -> Self {
        let timeout = config.request_timeout;
        let (revision, _) = watch::channel(0);
        Self {
            gate: SessionGate::new(backend.clone(), timeout),
            loader: SnapshotLoader::new(backend.clone(), timeout),
            coordinator: MutationCoordinator::new(backend, timeout),
            engine: AttendanceEngine::with_policy(policy),
            push: None,
            revision,
        }
    }

    /// Attach a push source, replacing and stopping any previous one.
    pub fn attach_push(&mut self, channel: PushChannel) {
        if let Some(mut previous) = self.push.replace(channel) {
            previous.stop();
        }
    }

    /// Connect the push channel at `url`.
    ///
    /// # Errors
    ///
    /// [`PushError::Connection`] if the handshake fails. The session keeps
    /// working without live updates.
    pub async fn connect_push(&mut self, url: &str) -> Result<(), PushError> {
        let channel = PushChannel::connect(url).await?;
        self.attach_push(channel);
        Ok(())
    }

    /// Watch engine revisions. The value changes whenever attendance or the
    /// event list changes; read the new state through [`engine`](Self::engine).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Canonical attendance state.
    pub fn engine(&self) -> &AttendanceEngine<P> {
        &self.engine
    }

    /// Last-known viewer session.
    pub fn session(&self) -> &Session {
        self.gate.session()
    }

    /// Refresh the viewer's identity, then load the full event list.
    ///
    /// A signed-out viewer still gets the public list; check
    /// [`Session::requires_login`] to decide whether to prompt.
    ///
    /// # Errors
    ///
    /// [`SyncError::Unreachable`] if the list cannot be loaded. The engine
    /// keeps its prior state. If the service answers that the viewer is not
    /// signed in, [`session`](Self::session) is cleared as well.
    pub async fn activate(&mut self) -> Result<(), SyncError> {
        self.gate.refresh().await;
        self.reload().await
    }

    /// Replace the engine with a fresh full snapshot.
    ///
    /// # Errors
    ///
    /// As [`activate`](Self::activate).
    pub async fn reload(&mut self) -> Result<(), SyncError> {
        let entries = self.loader.load_all(&mut self.gate).await?;
        self.engine.replace_all(entries);
        self.publish();
        Ok(())
    }

    /// Load one event and overwrite its attendance.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotFound`]: navigate away.
    /// - [`SyncError::Unreachable`] on transport failure.
    pub async fn open_event(&mut self, event_id: &EventId) -> Result<(Event, AttendanceState), SyncError> {
        let (event, state) = self.loader.load_one(&mut self.gate, event_id).await?;
        self.engine.upsert_event(event.clone(), state);
        self.publish();
        Ok((event, self.engine.get(event_id).unwrap_or(state)))
    }

    /// Attendee list of one event. Empty if it cannot be loaded.
    ///
    /// Like every read, clears the session if the service no longer
    /// recognizes the viewer.
    pub async fn attendees(&mut self, event_id: &EventId) -> Vec<Attendee> {
        self.loader.load_attendees(&mut self.gate, event_id).await
    }

    /// Join an event. See [`MutationCoordinator::join`].
    ///
    /// # Errors
    ///
    /// As [`MutationCoordinator::join`].
    pub async fn join(&mut self, event_id: &EventId) -> Result<u64, SyncError> {
        let result = self.coordinator.join(&mut self.gate, &mut self.engine, event_id).await;
        self.publish();
        result
    }

    /// Create an event and reload the list. See
    /// [`MutationCoordinator::create`].
    ///
    /// # Errors
    ///
    /// As [`MutationCoordinator::create`].
    pub async fn create(&mut self, draft: &EventDraft) -> Result<Option<Event>, SyncError> {
        let result =
            self.coordinator.create(&mut self.gate, &self.loader, &mut self.engine, draft).await;
        self.publish();
        result
    }

    /// Sign in. Call [`reload`](Self::reload) afterwards to see restricted
    /// events.
    ///
    /// # Errors
    ///
    /// As [`SessionGate::login`].
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, SyncError> {
        self.gate.login(email, password).await
    }

    /// Sign in as the shared guest.
    ///
    /// # Errors
    ///
    /// As [`SessionGate::login_as_guest`].
    pub async fn login_as_guest(&mut self) -> Result<&Session, SyncError> {
        self.gate.login_as_guest().await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// As [`SessionGate::register`].
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<(), SyncError> {
        self.gate.register(name, email, password).await
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// As [`SessionGate::logout`].
    pub async fn logout(&mut self) -> Result<(), SyncError> {
        self.gate.logout().await
    }

    /// Wait for the next attendance update on the push channel and apply it.
    ///
    /// Returns the update, whether or not the policy admitted it. `None` if
    /// there is no channel or it has closed.
    pub async fn next_push(&mut self) -> Option<AttendanceUpdate> {
        let update = self.push.as_mut()?.recv().await?;
        self.apply_update(&update);
        Some(update)
    }

    /// Decode and apply one raw push frame. Malformed frames are dropped.
    pub fn handle_push_frame(&mut self, frame: &str) -> Option<AttendanceChange> {
        let update = decode_frame(frame)?;
        self.apply_update(&update)
    }

    /// Tear down: stop the push channel and drop all state.
    pub fn close(mut self) {
        if let Some(mut channel) = self.push.take() {
            channel.stop();
        }
        self.engine.clear();
        tracing::info!("viewing session closed");
    }

    fn apply_update(&mut self, update: &AttendanceUpdate) -> Option<AttendanceChange> {
        let change = self.engine.apply_push_update(update);
        if change.is_some() {
            self.publish();
        }
        change
    }

    fn publish(&self) {
        let revision = self.engine.revision();
        self.revision.send_if_modified(|current| {
            let changed = *current != revision;
            *current = revision;
            changed
        });
    }
}
