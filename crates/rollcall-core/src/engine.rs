//! Attendance reconciliation engine.
//!
//! The [`AttendanceEngine`] exclusively owns the canonical map from event id
//! to [`AttendanceState`], plus the server-ordered catalogue of events the
//! list view renders. Other components submit inputs; none mutate the map
//! directly.
//!
//! # Write rules
//!
//! - Full snapshot ([`replace_all`](AttendanceEngine::replace_all)) replaces
//!   the whole map. Events the server no longer returns disappear.
//! - Single snapshot ([`apply_snapshot`](AttendanceEngine::apply_snapshot),
//!   [`upsert_event`](AttendanceEngine::upsert_event)) overwrites both fields.
//! - Push delta ([`apply_push_delta`](AttendanceEngine::apply_push_delta))
//!   overwrites the count only. Last delivered wins unless the
//!   [`DeliveryPolicy`] says otherwise.
//! - Join acknowledgement
//!   ([`apply_optimistic_join`](AttendanceEngine::apply_optimistic_join))
//!   sets the joined flag and the count the server returned.
//!
//! The engine never decrements on its own initiative. Counts move only when
//! the server supplies a value, and a smaller value is written as delivered.

use std::collections::HashMap;

use rollcall_proto::{AttendanceUpdate, Event, EventId};

use crate::{
    AttendanceChange, AttendanceState, ChangeSource,
    policy::{DeliveryPolicy, LastDeliveredWins},
};

/// Canonical attendance state for one viewing session.
#[derive(Debug, Clone)]
pub struct AttendanceEngine<P = LastDeliveredWins> {
    /// Attendance per tracked event.
    attendance: HashMap<EventId, AttendanceState>,
    /// Events in server order. Every entry has an attendance record.
    catalogue: Vec<Event>,
    /// Push delta admission.
    policy: P,
    /// Bumped on every write that changes observable state.
    revision: u64,
}

impl AttendanceEngine<LastDeliveredWins> {
    /// Empty engine with last-delivered-wins push semantics.
    pub fn new() -> Self {
        Self::with_policy(LastDeliveredWins)
    }
}

impl Default for AttendanceEngine<LastDeliveredWins> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DeliveryPolicy> AttendanceEngine<P> {
    /// Empty engine with a custom push admission policy.
    pub fn with_policy(policy: P) -> Self {
        Self { attendance: HashMap::new(), catalogue: Vec::new(), policy, revision: 0 }
    }

    /// Replace the entire map with a full snapshot.
    ///
    /// Entries for events absent from `entries` are dropped. If an id repeats,
    /// the last entry wins and keeps the first entry's position.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (Event, AttendanceState)>) {
        self.attendance.clear();
        self.catalogue.clear();
        self.policy.reset();

        for (event, state) in entries {
            let state = AttendanceState::new(state.attendee_count, state.viewer_has_joined);
            self.attendance.insert(event.id.clone(), state);
            self.place(event);
        }

        self.revision += 1;
        tracing::debug!(events = self.catalogue.len(), revision = self.revision, "full snapshot applied");
    }

    /// Insert or refresh one event from a single-event snapshot.
    pub fn upsert_event(&mut self, event: Event, state: AttendanceState) -> Option<AttendanceChange> {
        let id = event.id.clone();
        let catalogue_changed = self.place(event);
        let change = self.write(&id, state, ChangeSource::Snapshot);

        if change.is_none() && catalogue_changed {
            self.revision += 1;
        }
        change
    }

    /// Overwrite both fields from an authoritative read.
    pub fn apply_snapshot(
        &mut self,
        event_id: &EventId,
        attendee_count: u64,
        viewer_has_joined: bool,
    ) -> Option<AttendanceChange> {
        let state = AttendanceState::new(attendee_count, viewer_has_joined);
        self.write(event_id, state, ChangeSource::Snapshot)
    }

    /// Overwrite the count from a push delta without sequence information.
    ///
    /// The joined flag is untouched: the push channel only carries aggregates.
    pub fn apply_push_delta(&mut self, event_id: &EventId, count: u64) -> Option<AttendanceChange> {
        self.admit_push(event_id, count, None)
    }

    /// Overwrite the count from a decoded push frame, consulting the policy
    /// with the frame's sequence number.
    pub fn apply_push_update(&mut self, update: &AttendanceUpdate) -> Option<AttendanceChange> {
        self.admit_push(&update.event_id, update.count, update.seq)
    }

    /// Record a confirmed join with the count the server acknowledged.
    ///
    /// Only called after a positive acknowledgement, so there is nothing to
    /// roll back. Using the server's count rather than incrementing avoids
    /// double counting when the push for the same join races the response.
    pub fn apply_optimistic_join(
        &mut self,
        event_id: &EventId,
        server_count: u64,
    ) -> Option<AttendanceChange> {
        let state = AttendanceState::new(server_count, true);
        self.write(event_id, state, ChangeSource::Join)
    }

    /// Attendance for `event_id`. `None` if untracked.
    pub fn get(&self, event_id: &EventId) -> Option<AttendanceState> {
        self.attendance.get(event_id).copied()
    }

    /// Catalogue entry for `event_id`. `None` if not listed.
    pub fn event(&self, event_id: &EventId) -> Option<&Event> {
        self.catalogue.iter().find(|e| &e.id == event_id)
    }

    /// Listed events with their attendance, in server order.
    pub fn events(&self) -> impl Iterator<Item = (&Event, AttendanceState)> {
        self.catalogue
            .iter()
            .map(|e| (e, self.attendance.get(&e.id).copied().unwrap_or_default()))
    }

    /// Number of events with attendance records.
    pub fn len(&self) -> usize {
        self.attendance.len()
    }

    /// Whether no attendance is tracked.
    pub fn is_empty(&self) -> bool {
        self.attendance.is_empty()
    }

    /// Monotonic counter of state-changing writes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Push admission policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Drop all state. Used at session teardown.
    pub fn clear(&mut self) {
        self.replace_all(std::iter::empty());
    }

    fn admit_push(
        &mut self,
        event_id: &EventId,
        count: u64,
        seq: Option<u64>,
    ) -> Option<AttendanceChange> {
        if !self.policy.admit(event_id, seq) {
            tracing::debug!(%event_id, count, ?seq, "push delta not admitted by policy");
            return None;
        }

        let state = self
            .attendance
            .get(event_id)
            .map_or_else(|| AttendanceState::new(count, false), |s| s.with_count(count));
        self.write(event_id, state, ChangeSource::Push)
    }

    /// Unconditional overwrite. Reports a change only if the value differs.
    fn write(
        &mut self,
        event_id: &EventId,
        after: AttendanceState,
        source: ChangeSource,
    ) -> Option<AttendanceChange> {
        let before = self.attendance.insert(event_id.clone(), after);
        if before == Some(after) {
            return None;
        }

        self.revision += 1;
        tracing::trace!(%event_id, ?before, ?after, ?source, "attendance written");
        Some(AttendanceChange { event_id: event_id.clone(), before, after, source })
    }

    /// Put `event` into the catalogue, replacing an entry with the same id in
    /// place or appending. Returns whether the catalogue changed.
    fn place(&mut self, event: Event) -> bool {
        match self.catalogue.iter_mut().find(|e| e.id == event.id) {
            Some(existing) if *existing == event => false,
            Some(existing) => {
                *existing = event;
                true
            },
            None => {
                self.catalogue.push(event);
                true
            },
        }
    }
}
