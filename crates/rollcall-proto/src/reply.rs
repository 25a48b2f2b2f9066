//! Request and response bodies of the backing service.
//!
//! The service signals application-level failure in-band: a `200 OK` whose
//! body is `{"Error": "..."}` instead of the expected payload. [`Reply`]
//! captures that shape so callers can decode once and branch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Attendee, Event, EventId, event::flag};

/// Acknowledgement strings the service puts in `Status`.
pub mod status {
    /// `POST /events/join` succeeded.
    pub const JOINED: &str = "Successfully joined the event";
    /// `POST /events/create` succeeded.
    pub const CREATED: &str = "Event created successfully!";
    /// `POST /login` or `POST /register` succeeded.
    pub const SUCCESS: &str = "Success";
    /// `POST /logout` succeeded.
    pub const LOGGED_OUT: &str = "Logged out successfully";
}

/// A payload, or the service's in-band error message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Reply<T> {
    /// `{"Error": message}`.
    Error {
        /// Human-readable reason, shown to the viewer verbatim.
        #[serde(rename = "Error")]
        message: String,
    },
    /// Expected payload.
    Ok(T),
}

impl<T> Reply<T> {
    /// Payload, or the error message.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Error { message } => Err(message),
        }
    }
}

/// Body of a non-2xx response, when the service bothered to send one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// Reason text.
    #[serde(rename = "Error")]
    pub error: String,
}

/// `GET /events/attendees`: event id to attendee count.
pub type AttendeeCounts = HashMap<EventId, u64>;

/// `GET /events/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventDetail {
    /// The event.
    pub event: Event,
    /// Current attendee count.
    #[serde(rename = "attendeeCount", default)]
    pub attendee_count: u64,
    /// Whether the requesting viewer is attending.
    #[serde(rename = "hasJoined", default, deserialize_with = "flag")]
    pub has_joined: bool,
}

/// `GET /events/{id}/attendees`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendeeList {
    /// Attendees in server order.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// Acknowledgement of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusReply {
    /// One of the [`status`] strings on success.
    #[serde(rename = "Status")]
    pub status: String,
    /// New attendee count, present on join acknowledgements.
    #[serde(rename = "attendeeCount", default)]
    pub attendee_count: Option<u64>,
}

impl StatusReply {
    /// Whether `status` equals the expected acknowledgement.
    pub fn is(&self, expected: &str) -> bool {
        self.status == expected
    }
}

/// `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserReply {
    /// Display name; absent when no one is signed in.
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /events/join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRequest<'a> {
    /// Event to join.
    #[serde(rename = "eventId")]
    pub event_id: &'a EventId,
}

/// `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest<'a> {
    /// Display name.
    pub name: &'a str,
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_wins_over_payload() {
        let reply: Reply<StatusReply> =
            serde_json::from_str(r#"{"Error":"You have already joined this event"}"#).unwrap();
        assert_eq!(reply.into_result(), Err("You have already joined this event".to_string()));
    }

    #[test]
    fn join_ack_carries_count() {
        let reply: Reply<StatusReply> = serde_json::from_str(
            r#"{"Status":"Successfully joined the event","attendeeCount":6}"#,
        )
        .unwrap();
        let ack = reply.into_result().unwrap();
        assert!(ack.is(status::JOINED));
        assert_eq!(ack.attendee_count, Some(6));
    }

    #[test]
    fn counts_accept_string_keys() {
        let reply: Reply<AttendeeCounts> = serde_json::from_str(r#"{"1":3,"2":0}"#).unwrap();
        let counts = reply.into_result().unwrap();
        assert_eq!(counts.get(&EventId::new("1")), Some(&3));
        assert_eq!(counts.get(&EventId::new("2")), Some(&0));
    }

    #[test]
    fn counts_error_is_not_a_count_map() {
        let reply: Reply<AttendeeCounts> =
            serde_json::from_str(r#"{"Error":"Database error"}"#).unwrap();
        assert!(reply.into_result().is_err());
    }

    #[test]
    fn user_without_name() {
        let user: UserReply = serde_json::from_str("{}").unwrap();
        assert_eq!(user.name, None);
    }

    #[test]
    fn join_request_shape() {
        let id = EventId::new("42");
        let json = serde_json::to_value(JoinRequest { event_id: &id }).unwrap();
        assert_eq!(json, serde_json::json!({ "eventId": "42" }));
    }
}
