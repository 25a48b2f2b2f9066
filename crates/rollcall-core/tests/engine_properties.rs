//! Property-based tests for the attendance engine.
//!
//! Tests verify that the engine's write rules and invariants hold under
//! arbitrary interleavings of snapshots, push deltas, and joins.

use chrono::NaiveDate;
use proptest::prelude::*;
use rollcall_core::{AttendanceEngine, AttendanceState, Event, EventId};
use rollcall_proto::PushMessage;

/// One input to the engine.
#[derive(Debug, Clone)]
enum Input {
    FullSnapshot(Vec<(u8, u64, bool)>),
    Snapshot { id: u8, count: u64, joined: bool },
    Push { id: u8, count: u64 },
    Join { id: u8, count: u64 },
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        1 => prop::collection::vec((0u8..6, 0u64..50, any::<bool>()), 0..6)
            .prop_map(Input::FullSnapshot),
        2 => (0u8..6, 0u64..50, any::<bool>())
            .prop_map(|(id, count, joined)| Input::Snapshot { id, count, joined }),
        4 => (0u8..6, 0u64..50).prop_map(|(id, count)| Input::Push { id, count }),
        2 => (0u8..6, 0u64..50).prop_map(|(id, count)| Input::Join { id, count }),
    ]
}

/// Frames the push channel must drop.
fn malformed_frame_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "x[^\\n]{0,30}",
        (0u8..6, 0u64..50).prop_map(|(id, count)| format!(r#"{{"eventId":"e{id}","count":{count}}}"#)),
        ("[a-z]{1,10}", 0u8..6)
            .prop_map(|(kind, id)| format!(r#"{{"type":"{kind}","eventId":"e{id}","count":1}}"#)),
        (0u8..6).prop_map(|id| format!(r#"{{"type":"updateAttendees","eventId":"e{id}","count":"many"}}"#)),
        (0u8..6).prop_map(|id| format!(r#"{{"type":"updateAttendees","eventId":"e{id}"}}"#)),
    ]
}

fn event_id(n: u8) -> EventId {
    EventId::new(format!("e{n}"))
}

fn event(n: u8) -> Event {
    Event {
        id: event_id(n),
        title: format!("Event {n}"),
        description: String::new(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        time: "12:00".into(),
        location: "Hall".into(),
        category: "Social".into(),
        creator_name: "Alice".into(),
        image_url: None,
        is_for_logged_in_only: false,
    }
}

fn apply(engine: &mut AttendanceEngine, input: &Input) {
    match input {
        Input::FullSnapshot(entries) => {
            engine.replace_all(
                entries.iter().map(|&(id, count, joined)| (event(id), AttendanceState::new(count, joined))),
            );
        },
        Input::Snapshot { id, count, joined } => {
            engine.apply_snapshot(&event_id(*id), *count, *joined);
        },
        Input::Push { id, count } => {
            engine.apply_push_delta(&event_id(*id), *count);
        },
        Input::Join { id, count } => {
            engine.apply_optimistic_join(&event_id(*id), *count);
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a joined viewer is always counted among the attendees.
    #[test]
    fn prop_joined_implies_positive_count(inputs in prop::collection::vec(input_strategy(), 0..40)) {
        let mut engine = AttendanceEngine::new();
        for input in &inputs {
            apply(&mut engine, input);
            for id in 0..6 {
                if let Some(state) = engine.get(&event_id(id)) {
                    prop_assert!(!state.viewer_has_joined || state.attendee_count >= 1);
                }
            }
        }
    }

    /// Property: after a single-event snapshot both fields equal the snapshot.
    #[test]
    fn prop_snapshot_overwrites_both_fields(
        inputs in prop::collection::vec(input_strategy(), 0..20),
        id in 0u8..6,
        count in 1u64..50,
        joined in any::<bool>(),
    ) {
        let mut engine = AttendanceEngine::new();
        for input in &inputs {
            apply(&mut engine, input);
        }

        engine.apply_snapshot(&event_id(id), count, joined);
        prop_assert_eq!(engine.get(&event_id(id)), Some(AttendanceState::new(count, joined)));
    }

    /// Property: a full snapshot leaves exactly the returned events tracked.
    #[test]
    fn prop_full_snapshot_replaces_map(
        inputs in prop::collection::vec(input_strategy(), 0..20),
        entries in prop::collection::vec((0u8..6, 0u64..50, any::<bool>()), 0..6),
    ) {
        let mut engine = AttendanceEngine::new();
        for input in &inputs {
            apply(&mut engine, input);
        }

        apply(&mut engine, &Input::FullSnapshot(entries.clone()));

        for id in 0..6 {
            let expected = entries
                .iter()
                .rev()
                .find(|(e, _, _)| *e == id)
                .map(|&(_, count, joined)| AttendanceState::new(count, joined));
            prop_assert_eq!(engine.get(&event_id(id)), expected);
        }
    }

    /// Property: the last delivered push delta determines the count and never
    /// touches the joined flag.
    #[test]
    fn prop_last_push_wins(
        inputs in prop::collection::vec(input_strategy(), 0..20),
        id in 0u8..6,
        deltas in prop::collection::vec(0u64..50, 1..10),
    ) {
        let mut engine = AttendanceEngine::new();
        for input in &inputs {
            apply(&mut engine, input);
        }
        let joined_before = engine.get(&event_id(id)).is_some_and(|s| s.viewer_has_joined);

        for count in &deltas {
            engine.apply_push_delta(&event_id(id), *count);
        }

        let last = *deltas.last().unwrap();
        let state = engine.get(&event_id(id)).unwrap();
        prop_assert_eq!(state.viewer_has_joined, joined_before);
        prop_assert_eq!(state, AttendanceState::new(last, joined_before));
    }

    /// Property: frames that fail to decode never reach the engine, so the map
    /// is left exactly as it was.
    #[test]
    fn prop_malformed_frames_leave_state_unchanged(
        inputs in prop::collection::vec(input_strategy(), 0..20),
        frames in prop::collection::vec(malformed_frame_strategy(), 0..10),
    ) {
        let mut engine = AttendanceEngine::new();
        for input in &inputs {
            apply(&mut engine, input);
        }
        let before: Vec<_> = (0..6).map(|id| engine.get(&event_id(id))).collect();
        let revision = engine.revision();

        for frame in &frames {
            let decoded = PushMessage::decode(frame);
            prop_assert!(decoded.is_err(), "decoded {:?}", frame);
            if let Ok(PushMessage::UpdateAttendees(update)) = decoded {
                engine.apply_push_update(&update);
            }
        }

        let after: Vec<_> = (0..6).map(|id| engine.get(&event_id(id))).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(engine.revision(), revision);
    }

    /// Property: revisions only move forward.
    #[test]
    fn prop_revision_is_monotonic(inputs in prop::collection::vec(input_strategy(), 0..40)) {
        let mut engine = AttendanceEngine::new();
        let mut last = engine.revision();
        for input in &inputs {
            apply(&mut engine, input);
            prop_assert!(engine.revision() >= last);
            last = engine.revision();
        }
    }
}
