//! Fault injection for backend calls.
//!
//! Delegates to another backend but fails a configurable share of calls with
//! a transport error. Used to check that partial failures degrade the way the
//! loader and coordinator promise (zero counts, empty attendee lists, typed
//! errors) and never corrupt the engine.

use std::sync::{Arc, Mutex};

use rollcall_proto::{
    Attendee, Event, EventDraft, EventId,
    reply::{AttendeeCounts, EventDetail},
};

use super::Backend;
use crate::BackendError;

/// Backend calls, for scoping fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`Backend::list_events`].
    ListEvents,
    /// [`Backend::attendee_counts`].
    AttendeeCounts,
    /// [`Backend::event_detail`].
    EventDetail,
    /// [`Backend::attendees`].
    Attendees,
    /// [`Backend::join`].
    Join,
    /// [`Backend::create`].
    Create,
    /// [`Backend::current_user`].
    CurrentUser,
    /// [`Backend::login`].
    Login,
    /// [`Backend::register`].
    Register,
    /// [`Backend::logout`].
    Logout,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Self; 10] = [
        Self::ListEvents,
        Self::AttendeeCounts,
        Self::EventDetail,
        Self::Attendees,
        Self::Join,
        Self::Create,
        Self::CurrentUser,
        Self::Login,
        Self::Register,
        Self::Logout,
    ];
}

/// Backend wrapper that randomly injects transport failures.
///
/// Clones draw from the same dice and share one failure count, so a gate,
/// loader and coordinator built from clones see a single failure sequence.
#[derive(Clone)]
pub struct ChaoticBackend<B: Backend> {
    inner: B,
    /// Share of targeted calls that fail
    failure_rate: f64,
    targets: Arc<[Operation]>,
    /// Shared across clones
    rng: Arc<Mutex<ChaoticRng>>,
    injected: Arc<Mutex<usize>>,
}

/// Seeded dice: the same seed fails the same calls.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[allow(clippy::cast_precision_loss)]
    fn next(&mut self) -> f64 {
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<B: Backend> ChaoticBackend<B> {
    /// Fail any operation with probability `failure_rate`.
    ///
    /// # Panics
    ///
    /// If `failure_rate` lies outside `0.0..=1.0`.
    pub fn new(inner: B, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// As [`new`](Self::new), failing the calls `seed` picks.
    ///
    /// # Panics
    ///
    /// If `failure_rate` lies outside `0.0..=1.0`.
    pub fn with_seed(inner: B, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            targets: Arc::from(Operation::ALL),
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            injected: Arc::new(Mutex::new(0)),
        }
    }

    /// Restrict injection to `targets`; other calls always pass through.
    #[must_use]
    pub fn only(mut self, targets: impl IntoIterator<Item = Operation>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of failures injected so far.
    #[allow(clippy::expect_used)]
    pub fn injected_failures(&self) -> usize {
        *self.injected.lock().expect("injected mutex poisoned")
    }

    /// Fail `op` if the dice say so.
    fn gate(&self, op: Operation) -> Result<(), BackendError> {
        if !self.targets.contains(&op) {
            return Ok(());
        }

        #[allow(clippy::expect_used)]
        let roll = self.rng.lock().expect("ChaoticRng mutex poisoned").next();
        if roll >= self.failure_rate {
            return Ok(());
        }

        #[allow(clippy::expect_used)]
        let mut injected = self.injected.lock().expect("injected mutex poisoned");
        *injected += 1;
        tracing::debug!(?op, "injecting backend failure");
        Err(BackendError::Transport("chaotic failure injection".to_owned()))
    }
}

impl<B: Backend> Backend for ChaoticBackend<B> {
    async fn list_events(&self) -> Result<Vec<Event>, BackendError> {
        self.gate(Operation::ListEvents)?;
        self.inner.list_events().await
    }

    async fn attendee_counts(&self) -> Result<AttendeeCounts, BackendError> {
        self.gate(Operation::AttendeeCounts)?;
        self.inner.attendee_counts().await
    }

    async fn event_detail(&self, event_id: &EventId) -> Result<EventDetail, BackendError> {
        self.gate(Operation::EventDetail)?;
        self.inner.event_detail(event_id).await
    }

    async fn attendees(&self, event_id: &EventId) -> Result<Vec<Attendee>, BackendError> {
        self.gate(Operation::Attendees)?;
        self.inner.attendees(event_id).await
    }

    async fn join(&self, event_id: &EventId) -> Result<u64, BackendError> {
        self.gate(Operation::Join)?;
        self.inner.join(event_id).await
    }

    async fn create(&self, draft: &EventDraft) -> Result<(), BackendError> {
        self.gate(Operation::Create)?;
        self.inner.create(draft).await
    }

    async fn current_user(&self) -> Result<Option<String>, BackendError> {
        self.gate(Operation::CurrentUser)?;
        self.inner.current_user().await
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), BackendError> {
        self.gate(Operation::Login)?;
        self.inner.login(email, password).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), BackendError> {
        self.gate(Operation::Register)?;
        self.inner.register(name, email, password).await
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.gate(Operation::Logout)?;
        self.inner.logout().await
    }
}
