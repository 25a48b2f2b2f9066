//! Viewer session.
//!
//! The session is advisory: it lets the client refuse a mutation locally
//! before a round trip, but the service re-checks credentials on every call.

use std::fmt;

use crate::SyncError;

/// Display name the service assigns to the shared guest account.
pub const GUEST_NAME: &str = "Guest";

/// Login email of the shared guest account.
pub const GUEST_EMAIL: &str = "guest@example.com";

/// Password of the shared guest account.
pub const GUEST_PASSWORD: &str = "guest";

/// Access level an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Any authenticated viewer, guests included. Required to join.
    Member,
    /// Authenticated and not a guest. Required to create events.
    Regular,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => f.write_str("you must be logged in"),
            Self::Regular => f.write_str("you must be logged in with a regular account"),
        }
    }
}

/// Last-known identity of the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    authenticated: bool,
    guest: bool,
    name: String,
}

impl Session {
    /// No one signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for the identity the service reported.
    ///
    /// A missing or empty name means no one is signed in.
    pub fn from_identity(name: Option<&str>) -> Self {
        match name {
            Some(name) if !name.is_empty() => {
                Self { authenticated: true, guest: name == GUEST_NAME, name: name.to_owned() }
            },
            _ => Self::anonymous(),
        }
    }

    /// Whether the service recognized the viewer.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether the viewer is the restricted guest identity.
    pub fn is_guest(&self) -> bool {
        self.guest
    }

    /// Display name. Empty when anonymous.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the caller should send the viewer to the login boundary.
    pub fn requires_login(&self) -> bool {
        !self.authenticated
    }

    /// Whether this session satisfies `access`.
    pub fn can(&self, access: Access) -> bool {
        match access {
            Access::Member => self.authenticated,
            Access::Regular => self.authenticated && !self.guest,
        }
    }

    /// Check `access` before issuing a mutation.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotAuthenticated`] if the session does not satisfy it.
    pub fn require(&self, access: Access) -> Result<(), SyncError> {
        if self.can(access) { Ok(()) } else { Err(SyncError::NotAuthenticated(access)) }
    }

    /// Forget the identity (logout, or the service reported unauthenticated).
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_identity_is_authenticated_member() {
        let session = Session::from_identity(Some("Alice"));

        assert!(session.is_authenticated());
        assert!(!session.is_guest());
        assert_eq!(session.name(), "Alice");
        assert!(session.can(Access::Member));
        assert!(session.can(Access::Regular));
    }

    #[test]
    fn guest_may_join_but_not_create() {
        let session = Session::from_identity(Some(GUEST_NAME));

        assert!(session.is_guest());
        assert_eq!(session.require(Access::Member), Ok(()));
        assert_eq!(session.require(Access::Regular), Err(SyncError::NotAuthenticated(Access::Regular)));
    }

    #[test]
    fn missing_or_empty_name_is_anonymous() {
        for name in [None, Some("")] {
            let session = Session::from_identity(name);
            assert!(session.requires_login());
            assert!(!session.is_guest());
            assert_eq!(session.name(), "");
            assert_eq!(session.require(Access::Member), Err(SyncError::NotAuthenticated(Access::Member)));
        }
    }

    #[test]
    fn clear_resets_to_anonymous() {
        let mut session = Session::from_identity(Some("Alice"));
        session.clear();
        assert_eq!(session, Session::anonymous());
    }
}
