//! Session gate.
//!
//! Keeps the last-known [`Session`] and refreshes it from the service. The
//! gate only disables local affordances; the service re-checks credentials on
//! every mutating call, and a rejection there clears the session here.

use std::time::Duration;

use rollcall_core::{Access, GUEST_EMAIL, GUEST_PASSWORD, Session, SyncError};

use crate::{
    BackendError,
    backend::{Backend, bounded},
};

/// Viewer identity, refreshed from the backing service.
pub struct SessionGate<B> {
    backend: B,
    session: Session,
    timeout: Option<Duration>,
}

impl<B: Backend> SessionGate<B> {
    /// Gate with an anonymous session. Call [`refresh`](Self::refresh) before
    /// relying on it.
    pub fn new(backend: B, timeout: Option<Duration>) -> Self {
        Self { backend, session: Session::anonymous(), timeout }
    }

    /// Last-known session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Ask the service who the viewer is.
    ///
    /// Any failure, including the service being unreachable, yields an
    /// anonymous session; check [`Session::requires_login`] afterwards.
    pub async fn refresh(&mut self) -> &Session {
        self.session = match bounded(self.timeout, self.backend.current_user()).await {
            Ok(name) => Session::from_identity(name.as_deref()),
            Err(BackendError::Unauthenticated(_)) => Session::anonymous(),
            Err(e) => {
                tracing::warn!(error = %e, "identity check failed, treating viewer as signed out");
                Session::anonymous()
            },
        };

        tracing::debug!(
            authenticated = self.session.is_authenticated(),
            guest = self.session.is_guest(),
            "session refreshed"
        );
        &self.session
    }

    /// Fail fast if the session does not allow `access`.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotAuthenticated`].
    pub fn require(&self, access: Access) -> Result<(), SyncError> {
        self.session.require(access)
    }

    /// Sign in, then refresh the identity.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ApplicationRejected`] with the service's message on bad
    ///   credentials.
    /// - [`SyncError::Unreachable`] on transport failure.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, SyncError> {
        bounded(self.timeout, self.backend.login(email, password)).await?;
        tracing::info!("signed in");
        Ok(self.refresh().await)
    }

    /// Sign in with the shared guest account.
    ///
    /// # Errors
    ///
    /// As [`login`](Self::login).
    pub async fn login_as_guest(&mut self) -> Result<&Session, SyncError> {
        self.login(GUEST_EMAIL, GUEST_PASSWORD).await
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ApplicationRejected`] if the service refuses it.
    /// - [`SyncError::Unreachable`] on transport failure.
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<(), SyncError> {
        bounded(self.timeout, self.backend.register(name, email, password)).await?;
        tracing::info!(%name, "account registered");
        Ok(())
    }

    /// Sign out. The session is cleared only once the service acknowledges.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ApplicationRejected`] if the service refuses it.
    /// - [`SyncError::Unreachable`] on transport failure.
    pub async fn logout(&mut self) -> Result<(), SyncError> {
        bounded(self.timeout, self.backend.logout()).await?;
        self.session.clear();
        tracing::info!("signed out");
        Ok(())
    }

    /// The service reported the viewer unauthenticated mid-session.
    pub fn invalidate(&mut self) {
        if self.session.is_authenticated() {
            tracing::info!("service no longer recognizes the viewer, session cleared");
        }
        self.session.clear();
    }

    /// Clear the session if `err` says the service no longer recognizes the
    /// viewer. Returns `err` unchanged.
    pub fn screen(&mut self, err: BackendError) -> BackendError {
        if err.is_unauthenticated() {
            self.invalidate();
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use rollcall_core::GUEST_NAME;

    use super::*;
    use crate::MemoryBackend;

    #[tokio::test]
    async fn refresh_without_login_is_anonymous() {
        let mut gate = SessionGate::new(MemoryBackend::new(), None);
        assert!(gate.refresh().await.requires_login());
    }

    #[tokio::test]
    async fn guest_login_yields_guest_session() {
        let mut gate = SessionGate::new(MemoryBackend::new(), None);
        let session = gate.login_as_guest().await.unwrap();

        assert!(session.is_guest());
        assert_eq!(session.name(), GUEST_NAME);
        assert!(gate.require(Access::Member).is_ok());
        assert_eq!(gate.require(Access::Regular), Err(SyncError::NotAuthenticated(Access::Regular)));
    }

    #[tokio::test]
    async fn bad_credentials_surface_service_message() {
        let mut gate = SessionGate::new(MemoryBackend::new(), None);
        let err = gate.login("nobody@example.com", "x").await.unwrap_err();

        assert_eq!(err, SyncError::ApplicationRejected("Invalid email or password".into()));
        assert!(gate.session().requires_login());
    }

    #[tokio::test]
    async fn unreachable_service_reads_as_signed_out() {
        let backend = MemoryBackend::new();
        let mut gate = SessionGate::new(backend.clone(), None);
        gate.login_as_guest().await.unwrap();

        backend.set_unreachable(true);
        assert!(gate.refresh().await.requires_login());
    }

    #[tokio::test]
    async fn failed_logout_keeps_session() {
        let backend = MemoryBackend::new();
        let mut gate = SessionGate::new(backend.clone(), None);
        gate.login_as_guest().await.unwrap();

        backend.set_unreachable(true);
        assert!(matches!(gate.logout().await, Err(SyncError::Unreachable(_))));
        assert!(gate.session().is_authenticated());

        backend.set_unreachable(false);
        gate.logout().await.unwrap();
        assert!(gate.session().requires_login());
    }

    #[tokio::test]
    async fn register_then_login() {
        let mut gate = SessionGate::new(MemoryBackend::new(), None);
        gate.register("Dana", "dana@example.com", "pw").await.unwrap();
        assert!(gate.session().requires_login());

        let session = gate.login("dana@example.com", "pw").await.unwrap();
        assert_eq!(session.name(), "Dana");
        assert!(!session.is_guest());
    }
}
