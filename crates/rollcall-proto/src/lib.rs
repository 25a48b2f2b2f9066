//! Wire types for rollcall.
//!
//! JSON bodies exchanged with the backing event service and the frames
//! delivered over the push channel. This crate is pure data: it decodes and
//! encodes, and never performs I/O.
//!
//! # Components
//!
//! - [`Event`], [`EventDraft`], [`Attendee`]: resources returned or accepted by
//!   the service.
//! - [`Reply`]: response envelope that is either a payload or `{"Error": ..}`.
//! - [`PushMessage`]: typed push-channel frames.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
pub mod push;
pub mod reply;

pub use error::ProtoError;
pub use event::{Attendee, Event, EventDraft, EventId};
pub use push::{AttendanceUpdate, PushMessage};
pub use reply::Reply;
