//! Client
//!
//! I/O layer for rollcall: talks to the backing event service, listens on the
//! push channel, and feeds both into the Sans-IO
//! [`AttendanceEngine`](rollcall_core::AttendanceEngine).
//!
//! # Architecture
//!
//! ```text
//! SnapshotLoader ──► AttendanceEngine ◄── PushChannel
//!                          ▲
//!    SessionGate ──► MutationCoordinator ──► Backend
//! ```
//!
//! [`ViewingSession`] owns one of each and is the only thing callers need.
//! The [`Backend`] trait separates the components from the transport, so the
//! same code runs over HTTP ([`HttpBackend`]), in-process ([`MemoryBackend`]),
//! and under fault injection ([`ChaoticBackend`]).
//!
//! # Components
//!
//! - [`ViewingSession`]: lifecycle owner, serializes all engine writes
//! - [`SessionGate`]: viewer identity and login/logout
//! - [`SnapshotLoader`]: authoritative reads with graceful degradation
//! - [`MutationCoordinator`]: join and create
//! - [`PushChannel`]: WebSocket attendance updates
//! - [`ClientConfig`]: endpoints and request timeout

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backend;
mod config;
mod coordinator;
mod error;
mod gate;
mod loader;
mod push;
mod session;

pub use backend::{Backend, ChaoticBackend, HttpBackend, MemoryBackend, Operation};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_PUSH_URL, DEFAULT_REQUEST_TIMEOUT};
pub use coordinator::MutationCoordinator;
pub use error::{BackendError, PushError};
pub use gate::SessionGate;
pub use loader::SnapshotLoader;
pub use push::{ConnectionState, PushChannel, decode_frame};
pub use session::ViewingSession;
