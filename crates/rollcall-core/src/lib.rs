//! Core
//!
//! Sans-IO attendance synchronization for rollcall. Holds the canonical view
//! of which events exist, how many people attend each, and whether the viewer
//! has joined, and merges three input streams into it: authoritative
//! snapshots, push deltas, and confirmed join acknowledgements.
//!
//! # Architecture
//!
//! Nothing in this crate performs I/O or awaits. Callers feed decoded inputs
//! into [`AttendanceEngine`] and read state back. Because every write takes
//! `&mut self`, writes are serialized by ownership alone and the engine needs
//! no locking.
//!
//! # Components
//!
//! - [`AttendanceEngine`]: canonical `EventId -> AttendanceState` map
//! - [`DeliveryPolicy`]: admission check for push deltas
//! - [`Session`]: viewer identity and the [`Access`] rules gating mutations
//! - [`SyncError`]: outcome taxonomy surfaced to callers

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod attendance;
mod engine;
mod error;
mod policy;
mod session;

pub use attendance::{AttendanceChange, AttendanceState, ChangeSource};
pub use engine::AttendanceEngine;
pub use error::SyncError;
pub use policy::{DeliveryPolicy, LastDeliveredWins, MonotonicSequence};
pub use rollcall_proto::{AttendanceUpdate, Event, EventDraft, EventId};
pub use session::{Access, GUEST_EMAIL, GUEST_NAME, GUEST_PASSWORD, Session};
