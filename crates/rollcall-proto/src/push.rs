//! Push-channel frames.
//!
//! The service broadcasts one JSON text frame per attendance change to every
//! connected client, including the one whose action caused it:
//!
//! ```text
//! {"type": "updateAttendees", "eventId": "42", "count": 6}
//! ```
//!
//! Frames carry no sequence number today. An optional `seq` is accepted so a
//! future service version can add one without breaking older clients.
//!
//! # Invariants
//!
//! Decoding never panics. Anything that is not a well-formed frame of a known
//! kind yields an error, which the channel treats as "drop this frame".

use serde::{Deserialize, Serialize};

use crate::{EventId, ProtoError};

/// Tag of the attendance frame.
pub const UPDATE_ATTENDEES: &str = "updateAttendees";

/// Aggregate attendance for one event, as pushed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    /// Event whose count changed.
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    /// New attendee count.
    pub count: u64,
    /// Monotonic per-event sequence number, if the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

/// All push frames this client understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// An event's attendee count changed.
    UpdateAttendees(AttendanceUpdate),
}

impl PushMessage {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// - [`ProtoError::Malformed`] if the text is not JSON or a known kind has
    ///   the wrong shape.
    /// - [`ProtoError::MissingKind`] if there is no string `type` field.
    /// - [`ProtoError::UnknownKind`] for any other `type`.
    pub fn decode(text: &str) -> Result<Self, ProtoError> {
        let mut value: serde_json::Value = serde_json::from_str(text)?;

        let kind = match value.get("type").and_then(serde_json::Value::as_str) {
            Some(kind) => kind.to_owned(),
            None => return Err(ProtoError::MissingKind),
        };

        match kind.as_str() {
            UPDATE_ATTENDEES => {
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("type");
                }
                let update = serde_json::from_value(value)?;
                Ok(Self::UpdateAttendees(update))
            },
            _ => Err(ProtoError::UnknownKind(kind)),
        }
    }

    /// Encode as a text frame.
    pub fn encode(&self) -> String {
        match self {
            Self::UpdateAttendees(update) => {
                let mut value = serde_json::json!({
                    "type": UPDATE_ATTENDEES,
                    "eventId": update.event_id,
                    "count": update.count,
                });
                if let (Some(seq), Some(obj)) = (update.seq, value.as_object_mut()) {
                    obj.insert("seq".into(), seq.into());
                }
                value.to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_update_with_numeric_id() {
        let msg = PushMessage::decode(r#"{"type":"updateAttendees","eventId":3,"count":5}"#)
            .unwrap();
        assert_eq!(
            msg,
            PushMessage::UpdateAttendees(AttendanceUpdate {
                event_id: EventId::new("3"),
                count: 5,
                seq: None,
            })
        );
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(PushMessage::decode("not JSON"), Err(ProtoError::Malformed(_))));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            PushMessage::decode(r#"{"type":"other"}"#),
            Err(ProtoError::UnknownKind("other".into()))
        );
    }

    #[test]
    fn rejects_missing_or_non_string_kind() {
        assert_eq!(PushMessage::decode(r#"{"count":1}"#), Err(ProtoError::MissingKind));
        assert_eq!(PushMessage::decode(r#"{"type":7}"#), Err(ProtoError::MissingKind));
        assert_eq!(PushMessage::decode("[1,2]"), Err(ProtoError::MissingKind));
    }

    #[test]
    fn rejects_negative_count() {
        let frame = r#"{"type":"updateAttendees","eventId":"e1","count":-1}"#;
        assert!(matches!(PushMessage::decode(frame), Err(ProtoError::Malformed(_))));
    }

    #[test]
    fn encode_keeps_sequence_when_present() {
        let msg = PushMessage::UpdateAttendees(AttendanceUpdate {
            event_id: EventId::new("e1"),
            count: 2,
            seq: Some(9),
        });
        assert_eq!(PushMessage::decode(&msg.encode()), Ok(msg));
    }
}
