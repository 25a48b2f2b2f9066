//! Event resources.
//!
//! The service stores events in a relational table, so identifiers arrive as
//! JSON integers from some endpoints and as strings from others, and boolean
//! columns may arrive as `0`/`1`. Decoding normalizes both.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Opaque, server-assigned event identifier.
///
/// Stable for the lifetime of the event. Decodes from either a JSON string or
/// a JSON integer; always encodes as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(String);

impl EventId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for EventId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl de::Visitor<'_> for IdVisitor {
            type Value = EventId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an event id as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EventId, E> {
                Ok(EventId::new(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<EventId, E> {
                Ok(EventId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<EventId, E> {
                Ok(EventId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<EventId, E> {
                Ok(EventId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// A scheduled event as listed by the service.
///
/// Immutable once loaded. Attendance is tracked separately by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Server-assigned identifier.
    #[serde(alias = "_id")]
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Calendar date the event takes place on.
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    /// Local wall-clock start time, as entered by the creator.
    #[serde(default)]
    pub time: String,
    /// Venue.
    #[serde(default)]
    pub location: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Display name of the creating user.
    #[serde(rename = "creator_name", alias = "creatorName", default)]
    pub creator_name: String,
    /// Optional banner image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Visible to and joinable by authenticated, non-guest viewers only.
    #[serde(default, deserialize_with = "flag")]
    pub is_for_logged_in_only: bool,
}

/// Payload for creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Calendar date.
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    /// Local wall-clock start time (`HH:MM`).
    pub time: String,
    /// Venue.
    pub location: String,
    /// Category label.
    pub category: String,
    /// Banner image URL, empty if none.
    #[serde(default)]
    pub image_url: String,
    /// Restrict to authenticated, non-guest viewers.
    #[serde(default)]
    pub is_for_logged_in_only: bool,
}

impl EventDraft {
    /// Whether a listed event looks like the one this draft produced.
    ///
    /// The create acknowledgement carries no identifier, so the new event is
    /// located in a fresh listing by its user-entered fields.
    pub fn matches(&self, event: &Event) -> bool {
        event.title == self.title
            && event.date == self.date
            && event.time == self.time
            && event.location == self.location
            && event.category == self.category
    }
}

/// One entry of an event's attendee list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Display name of the attending user.
    #[serde(alias = "userName")]
    pub user_name: String,
}

/// Accepts `true`/`false` or the integer `0`/`1` a SQL boolean column yields.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
    }
}

/// `YYYY-MM-DD` on the wire. Timestamps are accepted and truncated to their
/// date part, since some service versions serialize DATE columns that way.
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d";

    pub(super) fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        let day = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(day, FORMAT)
            .map_err(|e| de::Error::custom(format!("invalid date {raw:?}: {e}")))
    }
}
