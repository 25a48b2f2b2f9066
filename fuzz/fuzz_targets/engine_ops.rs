//! Fuzz target for the attendance engine
//!
//! # Strategy
//!
//! - Interleave full snapshots, single-event snapshots, sequenced and
//!   unsequenced push deltas, and confirmed joins over a small id space
//! - Counts span zero, small values and u64::MAX
//!
//! # Invariants
//!
//! - A joined viewer never sees a zero count
//! - A push never changes the joined flag
//! - A full snapshot tracks exactly the ids it listed
//! - The revision never decreases, and moves exactly when a write changes state

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use rollcall_core::{
    AttendanceEngine, AttendanceState, AttendanceUpdate, Event, EventId, MonotonicSequence,
};

#[derive(Debug, Clone, Arbitrary)]
enum EngineOp {
    FullSnapshot(Vec<(u8, Count)>),
    Snapshot { id: u8, count: Count, joined: bool },
    Push { id: u8, count: Count, seq: Option<u8> },
    Join { id: u8, count: Count },
}

#[derive(Debug, Clone, Arbitrary)]
enum Count {
    Zero,
    Small(u8),
    Max,
}

impl Count {
    fn value(&self) -> u64 {
        match self {
            Count::Zero => 0,
            Count::Small(n) => u64::from(*n),
            Count::Max => u64::MAX,
        }
    }
}

fn event_id(id: u8) -> EventId {
    EventId::new((id % 8).to_string())
}

fn event(id: &EventId) -> Event {
    Event {
        id: id.clone(),
        title: format!("event {id}"),
        description: String::new(),
        date: NaiveDate::MIN,
        time: String::new(),
        location: String::new(),
        category: String::new(),
        creator_name: String::new(),
        image_url: None,
        is_for_logged_in_only: false,
    }
}

fuzz_target!(|ops: Vec<EngineOp>| {
    let mut engine = AttendanceEngine::with_policy(MonotonicSequence::new());

    for op in ops {
        let revision = engine.revision();

        let change = match op {
            EngineOp::FullSnapshot(entries) => {
                let ids: HashSet<EventId> = entries.iter().map(|(id, _)| event_id(*id)).collect();
                engine.replace_all(entries.iter().map(|(id, count)| {
                    let id = event_id(*id);
                    (event(&id), AttendanceState::new(count.value(), false))
                }));
                assert_eq!(engine.len(), ids.len());
                assert!(engine.revision() > revision);
                continue;
            },
            EngineOp::Snapshot { id, count, joined } => {
                engine.apply_snapshot(&event_id(id), count.value(), joined)
            },
            EngineOp::Push { id, count, seq } => {
                let target = event_id(id);
                let before = engine.get(&target).unwrap_or_default();
                let update = AttendanceUpdate {
                    event_id: target.clone(),
                    count: count.value(),
                    seq: seq.map(u64::from),
                };
                let change = engine.apply_push_update(&update);
                let after = engine.get(&target).unwrap_or_default();
                assert_eq!(before.viewer_has_joined, after.viewer_has_joined);
                change
            },
            EngineOp::Join { id, count } => {
                engine.apply_optimistic_join(&event_id(id), count.value())
            },
        };

        assert_eq!(engine.revision() > revision, change.is_some());
        assert!(engine.revision() >= revision);

        for id in 0..8 {
            if let Some(state) = engine.get(&event_id(id)) {
                assert!(!state.viewer_has_joined || state.attendee_count >= 1);
            }
        }
    }
});
