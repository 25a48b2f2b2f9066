//! Per-event attendance state.

use rollcall_proto::EventId;

/// The two mutable fields layered onto each event.
///
/// # Invariants
///
/// - `viewer_has_joined` implies `attendee_count >= 1`. Constructors floor the
///   count to maintain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttendanceState {
    /// Number of attendees.
    pub attendee_count: u64,
    /// Whether the current viewer is one of them.
    pub viewer_has_joined: bool,
}

impl AttendanceState {
    /// State with the invariant enforced.
    pub fn new(attendee_count: u64, viewer_has_joined: bool) -> Self {
        let attendee_count = if viewer_has_joined { attendee_count.max(1) } else { attendee_count };
        Self { attendee_count, viewer_has_joined }
    }

    /// Copy with the count replaced, keeping the joined flag.
    pub(crate) fn with_count(self, attendee_count: u64) -> Self {
        Self::new(attendee_count, self.viewer_has_joined)
    }
}

/// Which input stream produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// Authoritative read (full or single-event).
    Snapshot,
    /// Push-channel delta.
    Push,
    /// Confirmed join acknowledgement.
    Join,
}

/// A write that altered one event's attendance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceChange {
    /// Affected event.
    pub event_id: EventId,
    /// State before the write. `None` if the event was untracked.
    pub before: Option<AttendanceState>,
    /// State after the write.
    pub after: AttendanceState,
    /// Input stream that caused it.
    pub source: ChangeSource,
}
